use crate::{
    db::backend::{QueryBackend, QueryPlan, UpdatePlan, UpdateValue},
    error::InternalError,
    test_support::eval::{Row, eval},
    traits::{EntityKind, FieldValues},
    value::Value,
};
use std::collections::BTreeMap;

///
/// MemoryBackend
///
/// Table-per-entity row store that records every statement it receives.
/// Transactions snapshot all tables and restore them on error.
///

#[derive(Debug, Default)]
pub(crate) struct MemoryBackend {
    tables: BTreeMap<String, Vec<Row>>,
    max_batch: usize,
    cast_case: bool,
    fail_on_update: Option<usize>,
    updates: Vec<UpdatePlan>,
    deletes: Vec<QueryPlan>,
    transactions: Vec<usize>,
}

impl MemoryBackend {
    pub(crate) fn new(max_batch: usize) -> Self {
        Self {
            max_batch,
            ..Self::default()
        }
    }

    pub(crate) const fn with_cast_case(mut self) -> Self {
        self.cast_case = true;
        self
    }

    /// Fail the `n`th update statement (1-based).
    pub(crate) const fn fail_on_update(mut self, n: usize) -> Self {
        self.fail_on_update = Some(n);
        self
    }

    pub(crate) fn insert<E: EntityKind + FieldValues>(&mut self, entity: &E) {
        let row = E::MODEL
            .fields
            .iter()
            .filter(|f| f.is_concrete())
            .map(|f| {
                (
                    f.name.to_string(),
                    entity.get_value(f.name).unwrap_or(Value::Null),
                )
            })
            .collect();

        self.tables.entry(E::PATH.to_string()).or_default().push(row);
    }

    pub(crate) fn rows(&self, entity: &str) -> &[Row] {
        self.tables.get(entity).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn updates(&self) -> &[UpdatePlan] {
        &self.updates
    }

    pub(crate) fn deletes(&self) -> &[QueryPlan] {
        &self.deletes
    }

    /// Statements executed per committed or rolled-back transaction.
    pub(crate) fn transactions(&self) -> &[usize] {
        &self.transactions
    }

    fn statement_count(&self) -> usize {
        self.updates.len() + self.deletes.len()
    }
}

impl QueryBackend for MemoryBackend {
    fn bulk_batch_size(&self, _field_count: usize, _row_count: usize) -> usize {
        self.max_batch
    }

    fn requires_casted_case_in_updates(&self) -> bool {
        self.cast_case
    }

    fn atomic(
        &mut self,
        f: &mut dyn FnMut(&mut Self) -> Result<u64, InternalError>,
    ) -> Result<u64, InternalError> {
        let snapshot = self.tables.clone();
        let before = self.statement_count();

        let result = f(self);
        if result.is_err() {
            self.tables = snapshot;
        }
        self.transactions.push(self.statement_count() - before);

        result
    }

    fn update(&mut self, plan: &UpdatePlan) -> Result<u64, InternalError> {
        self.updates.push(plan.clone());
        if self.fail_on_update == Some(self.updates.len()) {
            return Err(InternalError::executor_internal("injected update failure"));
        }

        let rows = self.tables.entry(plan.entity.clone()).or_default();
        let mut touched = 0;

        for row in rows.iter_mut().filter(|row| eval(&plan.filter, row)) {
            let values: Vec<(String, Value)> = plan
                .assignments
                .iter()
                .map(|assignment| {
                    let value = match &assignment.value {
                        UpdateValue::Value(value) => value.clone(),
                        UpdateValue::Case(case) => case
                            .whens
                            .iter()
                            .find(|when| eval(&when.condition, row))
                            .map_or(Value::Null, |when| when.then.clone()),
                    };
                    (assignment.field.clone(), value)
                })
                .collect();

            row.extend(values);
            touched += 1;
        }

        Ok(touched)
    }

    fn delete(&mut self, plan: &QueryPlan) -> Result<u64, InternalError> {
        self.deletes.push(plan.clone());

        let rows = self.tables.entry(plan.entity.clone()).or_default();
        let before = rows.len();
        rows.retain(|row| {
            !plan
                .predicate
                .as_ref()
                .is_none_or(|predicate| eval(predicate, row))
        });

        Ok((before - rows.len()) as u64)
    }
}
