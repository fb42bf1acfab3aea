use crate::{
    db::{
        backend::{Assignment, CaseExpr, QueryBackend, UpdatePlan, UpdateValue, When},
        entity::EntityDescriptor,
        identity::EntityIdentityExt,
        query::{
            RewriteContext,
            predicate::{FieldPath, Predicate, rewrite_predicate},
        },
        registry::EntityRegistry,
    },
    error::{CompositeKeyError, InternalError},
    model::field::EntityFieldModel,
    obs::sink::{ExecKind, MetricsEvent, Span, record},
    traits::{EntityKind, FieldValues},
    value::Value,
};
use serde::Serialize;

///
/// BulkUpdateReport
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BulkUpdateReport {
    pub batches: u64,
    pub rows: u64,
}

///
/// Write `fields` of every entity back to storage.
///
/// Rows are split into batches no larger than the backend allows (and no
/// larger than `batch_size` or the configured cap). Each batch is a single
/// update statement that sets every field through a CASE keyed on the full
/// primary key of each row, filtered by key membership. Each batch runs in
/// its own transaction.
///
/// Every plan is built before the first statement executes, so validation
/// failures never leave a partial update behind.
///
pub fn bulk_update<E, B>(
    backend: &mut B,
    registry: &EntityRegistry,
    entities: &[E],
    fields: &[&str],
    batch_size: Option<usize>,
) -> Result<BulkUpdateReport, InternalError>
where
    E: EntityKind + FieldValues,
    B: QueryBackend,
{
    if batch_size == Some(0) {
        return Err(CompositeKeyError::InvalidBatchSize.into());
    }
    if fields.is_empty() {
        return Err(CompositeKeyError::EmptyUpdateFields.into());
    }

    let desc = registry.descriptor::<E>()?;
    for entity in entities {
        if entity.pk(&desc)?.is_none() {
            return Err(CompositeKeyError::IllegalState {
                entity: desc.path().to_string(),
                reason: "all objects passed to bulk update must have a primary key set".to_string(),
            }
            .into());
        }
    }
    let fields = fields
        .iter()
        .map(|name| resolve_update_field(&desc, name))
        .collect::<Result<Vec<_>, _>>()?;

    if entities.is_empty() {
        return Ok(BulkUpdateReport::default());
    }

    // two key references per row: one in the CASE, one in the filter
    let params_per_row = 2 * desc.pkeys().len() + fields.len();
    let backend_max = backend.bulk_batch_size(params_per_row, entities.len()).max(1);
    let size = [Some(backend_max), batch_size, registry.config().max_batch_size]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(backend_max);

    let builder = BatchUpdateBuilder {
        ctx: RewriteContext::new(registry, &desc),
        fields,
        cast: backend.requires_casted_case_in_updates(),
    };
    let plans = entities
        .chunks(size)
        .map(|batch| builder.build(batch))
        .collect::<Result<Vec<_>, _>>()?;

    let mut span = Span::new(ExecKind::BulkUpdate, desc.path());
    let mut report = BulkUpdateReport::default();

    for plan in &plans {
        let rows = backend.atomic(&mut |b: &mut B| b.update(plan))?;

        report.batches += 1;
        report.rows += rows;
        span.set_rows(report.rows);
        record(MetricsEvent::BatchExecuted {
            entity_path: desc.path(),
            rows,
        });
    }

    tracing::debug!(
        entity = desc.path(),
        batches = report.batches,
        rows = report.rows,
        batch_size = size,
        "cpkdb.bulk_update"
    );

    Ok(report)
}

///
/// BatchUpdateBuilder
/// Builds the update statement for one batch of rows.
///

struct BatchUpdateBuilder<'a> {
    ctx: RewriteContext<'a>,
    fields: Vec<&'static EntityFieldModel>,
    cast: bool,
}

impl BatchUpdateBuilder<'_> {
    fn build<E>(&self, batch: &[E]) -> Result<UpdatePlan, InternalError>
    where
        E: EntityKind + FieldValues,
    {
        let desc = self.ctx.entity();

        let conditions = batch
            .iter()
            .map(|entity| entity.pk_predicate(desc))
            .collect::<Result<Vec<_>, _>>()?;
        let keys = batch
            .iter()
            .map(|entity| entity.pk_operand(desc))
            .collect();

        let assignments = self
            .fields
            .iter()
            .map(|field| Assignment {
                field: field.name.to_string(),
                value: UpdateValue::Case(CaseExpr {
                    whens: batch
                        .iter()
                        .zip(&conditions)
                        .map(|(entity, condition)| When {
                            condition: condition.clone(),
                            then: entity.get_value(field.name).unwrap_or(Value::Null),
                        })
                        .collect(),
                    cast: self.cast.then_some(field.kind),
                }),
            })
            .collect();

        let filter = rewrite_predicate(&self.ctx, &Predicate::in_(FieldPath::pk(), keys))?;

        Ok(UpdatePlan {
            entity: desc.path().to_string(),
            filter,
            assignments,
        })
    }
}

/// Resolve an assignable field: concrete, and not part of the primary key.
pub(crate) fn resolve_update_field(
    desc: &EntityDescriptor,
    name: &str,
) -> Result<&'static EntityFieldModel, InternalError> {
    let model = desc.model();
    let field = model.field(name).ok_or_else(|| CompositeKeyError::UnknownField {
        entity: model.path.to_string(),
        field: name.to_string(),
    })?;

    if !field.is_concrete() {
        return Err(CompositeKeyError::NonConcreteField {
            field: name.to_string(),
        }
        .into());
    }
    if field.primary_key {
        return Err(CompositeKeyError::PrimaryKeyField {
            field: name.to_string(),
        }
        .into());
    }

    Ok(field)
}
