//! Query builder over one entity. Every filter and ordering passes through
//! the key rewrite before it is stored, so plans never carry key aliases.

pub mod context;
pub mod order;
pub mod predicate;

use crate::{
    db::{
        backend::{Assignment, QueryBackend, QueryPlan, UpdatePlan, UpdateValue},
        bulk::resolve_update_field,
        entity::EntityDescriptor,
        registry::EntityRegistry,
    },
    error::InternalError,
    obs::sink::{ExecKind, Span},
    traits::EntityKind,
    value::Value,
};
use std::{marker::PhantomData, sync::Arc};

// re-exports
pub use context::RewriteContext;
pub use order::{OrderDirection, OrderSpec, rewrite_ordering};
pub use predicate::{FieldPath, Predicate, rewrite_predicate};

///
/// Query
///
/// Accumulates a rewritten predicate and ordering for `E`. Rewrite errors
/// are returned from the call that introduced the offending lookup.
///

pub struct Query<'r, E: EntityKind> {
    registry: &'r EntityRegistry,
    descriptor: Arc<EntityDescriptor>,
    predicate: Option<Predicate>,
    order: OrderSpec,
    _marker: PhantomData<fn() -> E>,
}

impl<'r, E: EntityKind> Query<'r, E> {
    /// Start an unfiltered query; `E` must be registered.
    pub fn new(registry: &'r EntityRegistry) -> Result<Self, InternalError> {
        Ok(Self {
            registry,
            descriptor: registry.descriptor::<E>()?,
            predicate: None,
            order: OrderSpec::new(),
            _marker: PhantomData,
        })
    }

    fn context(&self) -> RewriteContext<'_> {
        RewriteContext::new(self.registry, &self.descriptor)
    }

    /// AND a predicate onto the current filter.
    pub fn filter(mut self, predicate: Predicate) -> Result<Self, InternalError> {
        let rewritten = rewrite_predicate(&self.context(), &predicate)?;

        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing & rewritten,
            None => rewritten,
        });

        Ok(self)
    }

    /// Append sort keys after any already present.
    pub fn order_by(mut self, spec: OrderSpec) -> Result<Self, InternalError> {
        let rewritten = rewrite_ordering(&self.context(), &spec)?;
        self.order.fields.extend(rewritten.fields);

        Ok(self)
    }

    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    #[must_use]
    pub const fn order(&self) -> &OrderSpec {
        &self.order
    }

    #[must_use]
    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn plan(&self) -> QueryPlan {
        QueryPlan {
            entity: self.descriptor.path().to_string(),
            predicate: self.predicate.clone(),
            order: self.order.clone(),
        }
    }

    /// Delete every matching row, cascading through the backend.
    pub fn delete<B: QueryBackend>(self, backend: &mut B) -> Result<u64, InternalError> {
        let mut span = Span::new(ExecKind::Delete, self.descriptor.path());
        let plan = self.plan();

        let rows = backend.delete(&plan)?;
        span.set_rows(rows);
        tracing::debug!(entity = %plan.entity, rows, "cpkdb.delete");

        Ok(rows)
    }

    /// Set `values` on every matching row.
    ///
    /// Only concrete, non-key fields may be assigned.
    pub fn update<B: QueryBackend>(
        self,
        backend: &mut B,
        values: Vec<(&str, Value)>,
    ) -> Result<u64, InternalError> {
        let assignments = values
            .into_iter()
            .map(|(name, value)| {
                let field = resolve_update_field(&self.descriptor, name)?;
                Ok(Assignment {
                    field: field.name.to_string(),
                    value: UpdateValue::Value(value),
                })
            })
            .collect::<Result<Vec<_>, InternalError>>()?;

        let plan = UpdatePlan {
            entity: self.descriptor.path().to_string(),
            filter: self.predicate.unwrap_or(Predicate::True),
            assignments,
        };

        backend.update(&plan)
    }
}
