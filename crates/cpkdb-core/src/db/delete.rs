use crate::{
    db::{
        backend::QueryBackend,
        identity::EntityIdentityExt,
        query::{FieldPath, Predicate, Query},
        registry::EntityRegistry,
    },
    error::{CompositeKeyError, InternalError},
    traits::{EntityKind, FieldValues},
};

///
/// Delete one entity instance and everything that cascades from it.
///
/// The row is selected by equality on the logical key, which the rewrite
/// turns into a conjunction over every key constituent for composite keys.
/// Fails with `IllegalState` while the key is not fully set; nothing reaches
/// the backend in that case.
///
pub fn delete_entity<E, B>(
    backend: &mut B,
    registry: &EntityRegistry,
    entity: &E,
) -> Result<u64, InternalError>
where
    E: EntityKind + FieldValues,
    B: QueryBackend,
{
    let desc = registry.descriptor::<E>()?;
    if entity.pk(&desc)?.is_none() {
        return Err(CompositeKeyError::IllegalState {
            entity: desc.path().to_string(),
            reason: "cannot be deleted because its primary key is not set".to_string(),
        }
        .into());
    }

    Query::<E>::new(registry)?
        .filter(Predicate::eq(FieldPath::pk(), entity.pk_operand(&desc)))?
        .delete(backend)
}
