//! Core runtime for cpkdb: composite primary keys on top of a single-column
//! query layer. Key descriptors, predicate and ordering rewrites, and the
//! key-aware delete and bulk update paths.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod key;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or backends are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            identity::EntityIdentityExt,
            query::{FieldPath, OrderDirection, OrderSpec, Predicate},
        },
        key::CachedKey,
        model::{
            entity::EntityModel,
            field::{EntityFieldKind, EntityFieldModel},
        },
        traits::{EntityKind, FieldValues, Path},
        value::Value,
    };
}
