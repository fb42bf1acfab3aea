use crate::{error::InternalError, key::CachedKey, model::entity::EntityModel, value::Value};

// ============================================================================
// FOUNDATIONAL KINDS
// ============================================================================
//
// These traits define *where* something lives in the system,
// not what data it contains.
//

///
/// Path
/// Fully-qualified schema path.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// EntityKind
///
/// A declared entity type. `MODEL` is read once at registration; the
/// registry turns it into an immutable `EntityDescriptor`.
///

pub trait EntityKind: Path + 'static {
    const MODEL: &'static EntityModel;
}

// ============================================================================
// ENTITY VALUES
// ============================================================================

///
/// FieldValues
///
/// Dynamic field access used by key encoding, deletion and bulk update.
///
/// Implementations must invalidate `key_cache_mut()` whenever `set_value`
/// writes a primary-key constituent.
///

pub trait FieldValues {
    fn get_value(&self, field: &str) -> Option<Value>;

    fn set_value(&mut self, field: &str, value: Value) -> Result<(), InternalError>;

    fn key_cache(&self) -> &CachedKey;

    fn key_cache_mut(&mut self) -> &mut CachedKey;
}
