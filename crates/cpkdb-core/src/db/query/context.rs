use crate::{
    db::{entity::EntityDescriptor, query::predicate::path::FieldPath, registry::EntityRegistry},
    error::InternalError,
    key::{CompositeKeyDescriptor, KeyRef},
};

///
/// RewriteContext
///
/// The root entity a query is built over, plus the registry used to follow
/// relation hops. Shared by predicate and ordering rewrites.
///

#[derive(Clone, Copy, Debug)]
pub struct RewriteContext<'a> {
    registry: &'a EntityRegistry,
    entity: &'a EntityDescriptor,
}

impl<'a> RewriteContext<'a> {
    #[must_use]
    pub const fn new(registry: &'a EntityRegistry, entity: &'a EntityDescriptor) -> Self {
        Self { registry, entity }
    }

    #[must_use]
    pub const fn entity(&self) -> &'a EntityDescriptor {
        self.entity
    }

    #[must_use]
    pub const fn registry(&self) -> &'a EntityRegistry {
        self.registry
    }

    #[must_use]
    pub fn separator(&self) -> &'a str {
        self.entity.codec().separator()
    }

    /// Resolve the key-shaped tail of `path`, if it has one.
    ///
    /// Root-level references resolve against the root descriptor; anything
    /// behind a relation resolves against the related entity's own fields.
    pub(crate) fn resolve(&self, path: &FieldPath) -> Result<Option<KeyRef<'a>>, InternalError> {
        let Some(target) = path.key_target() else {
            return Ok(None);
        };

        if path.relations().is_empty() {
            return self.entity.resolve_key(target).map(Some);
        }

        let related = self.registry.walk(self.entity, path.relations())?;
        CompositeKeyDescriptor::resolve_relative(related.model(), target, self.separator()).map(Some)
    }
}
