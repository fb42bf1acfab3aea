//! Runtime data model definitions.
//!
//! Types in `model` are the static declarations an entity type hands to the
//! registry: which fields exist, how they are stored, and which of them
//! participate in the primary key.
//!
//! In general:
//! - `model` defines *what is declared*
//! - `db::entity` defines *what runs* (the augmented descriptor)
pub mod entity;
pub mod field;
