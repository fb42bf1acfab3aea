//! Entity descriptors, key-aware query rewriting, and the write paths
//! (delete, bulk update) that depend on them.

pub mod backend;
pub mod bulk;
pub mod delete;
pub mod entity;
pub mod identity;
pub mod query;
pub mod registry;

// re-exports
pub use backend::{
    Assignment, CaseExpr, QueryBackend, QueryPlan, UpdatePlan, UpdateValue, When,
};
pub use bulk::{BulkUpdateReport, bulk_update};
pub use delete::delete_entity;
pub use entity::{EntityDescriptor, KeyShape, ModelCheck};
pub use identity::EntityIdentityExt;
pub use query::Query;
pub use registry::EntityRegistry;
