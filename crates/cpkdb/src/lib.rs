//! ## Crate layout
//! - `core`: key descriptors, predicate and ordering rewrites, registry,
//!   delete and bulk update, and observability.
//! - `error`: the public error taxonomy.
//!
//! The `prelude` module holds the vocabulary needed to declare entities and
//! build queries over them.

pub use cpkdb_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

pub use core::{
    config::CompositeKeyConfig,
    db::{
        BulkUpdateReport, EntityRegistry, Query, QueryBackend, bulk_update, delete_entity,
        query::predicate::expand_tuple_in,
    },
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        db::{EntityIdentityExt as _, EntityRegistry, Query},
        key::CachedKey,
        model::{
            entity::EntityModel,
            field::{EntityFieldKind, EntityFieldModel},
        },
        prelude::{FieldPath, OrderDirection, OrderSpec, Predicate},
        traits::{EntityKind, FieldValues, Path},
        value::Value,
    };
}
