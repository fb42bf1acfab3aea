use crate::{
    db::query::{order::OrderSpec, predicate::ast::Predicate},
    error::InternalError,
    model::field::EntityFieldKind,
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// QueryBackend
///
/// Statement execution seam. Every plan handed to a backend is fully
/// rewritten: no key alias, ad-hoc group or relation key reference survives
/// except the tuple `In` form produced for root-level key membership.
///

pub trait QueryBackend {
    /// Largest number of rows one statement may carry for `field_count`
    /// parameters per row.
    fn bulk_batch_size(&self, field_count: usize, row_count: usize) -> usize;

    /// Whether CASE expressions in updates must be cast to the column kind.
    fn requires_casted_case_in_updates(&self) -> bool {
        false
    }

    /// Run `f` in one transaction; an error rolls back everything `f` did.
    fn atomic(
        &mut self,
        f: &mut dyn FnMut(&mut Self) -> Result<u64, InternalError>,
    ) -> Result<u64, InternalError>;

    /// Execute one update statement, returning rows affected.
    fn update(&mut self, plan: &UpdatePlan) -> Result<u64, InternalError>;

    /// Delete the selected rows and their dependents, returning rows removed.
    fn delete(&mut self, plan: &QueryPlan) -> Result<u64, InternalError>;
}

///
/// QueryPlan
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryPlan {
    pub entity: String,
    pub predicate: Option<Predicate>,
    pub order: OrderSpec,
}

///
/// UpdatePlan
/// One update statement over the rows matching `filter`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UpdatePlan {
    pub entity: String,
    pub filter: Predicate,
    pub assignments: Vec<Assignment>,
}

///
/// Assignment
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Assignment {
    pub field: String,
    pub value: UpdateValue,
}

///
/// UpdateValue
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum UpdateValue {
    Value(Value),
    Case(CaseExpr),
}

///
/// CaseExpr
///
/// Per-row conditional value. Rows matching no branch receive null, the
/// same as a SQL CASE without ELSE.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CaseExpr {
    pub whens: Vec<When>,
    /// Cast the result to this kind, for backends that cannot infer it.
    pub cast: Option<EntityFieldKind>,
}

///
/// When
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct When {
    pub condition: Predicate,
    pub then: Value,
}
