use crate::{
    db::query::{
        context::RewriteContext,
        predicate::path::{FieldPath, PathTarget},
    },
    error::InternalError,
    obs::sink::{MetricsEvent, record},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum OrderDirection {
    #[default]
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

///
/// OrderSpec
/// Ordered list of sort keys; earlier entries take precedence.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderSpec {
    pub fields: Vec<(FieldPath, OrderDirection)>,
}

impl OrderSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn asc(mut self, path: impl Into<FieldPath>) -> Self {
        self.fields.push((path.into(), OrderDirection::Asc));
        self
    }

    #[must_use]
    pub fn desc(mut self, path: impl Into<FieldPath>) -> Self {
        self.fields.push((path.into(), OrderDirection::Desc));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Expand key references in an ordering into their constituents.
///
/// A multi-column key sorts by each constituent in canonical order, all with
/// the direction of the original item. Other items are kept in place.
pub fn rewrite_ordering(
    ctx: &RewriteContext<'_>,
    spec: &OrderSpec,
) -> Result<OrderSpec, InternalError> {
    let mut fields = Vec::with_capacity(spec.fields.len());
    let mut expanded = 0;

    for (path, direction) in &spec.fields {
        match ctx.resolve(path)? {
            None => fields.push((path.clone(), *direction)),
            Some(key) => {
                expanded += 1;
                fields.extend(key.fields().iter().map(|field| {
                    (
                        path.with_target(PathTarget::Field(field.name.to_string())),
                        *direction,
                    )
                }));
            }
        }
    }

    if expanded > 0 {
        record(MetricsEvent::OrderingRewritten {
            entity_path: ctx.entity().path(),
            items_expanded: expanded,
        });
    }

    Ok(OrderSpec { fields })
}
