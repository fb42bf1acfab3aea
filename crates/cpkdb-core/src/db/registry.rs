use crate::{
    config::CompositeKeyConfig,
    db::{
        entity::EntityDescriptor,
        query::{Query, predicate::path::FieldPath},
    },
    error::{CompositeKeyError, InternalError},
    model::entity::EntityModel,
    obs::sink::{MetricsEvent, record},
    traits::EntityKind,
};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

type EntityMap = HashMap<&'static str, Arc<EntityDescriptor>>;

///
/// EntityRegistry
///
/// Process-wide table of entity descriptors keyed by entity path.
///
/// Registration is idempotent and safe to race: the first writer builds the
/// descriptor, later callers get the same `Arc`. Descriptors never change
/// after they are inserted, so readers share them without further locking.
///

#[derive(Debug)]
pub struct EntityRegistry {
    config: CompositeKeyConfig,
    entities: RwLock<EntityMap>,
}

impl EntityRegistry {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CompositeKeyConfig::default(),
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty registry with a validated configuration.
    pub fn with_config(config: CompositeKeyConfig) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            config,
            entities: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &CompositeKeyConfig {
        &self.config
    }

    /// Register `E` and return its descriptor.
    pub fn register<E: EntityKind>(&self) -> Result<Arc<EntityDescriptor>, InternalError> {
        self.register_model(E::MODEL)
    }

    /// Register a model and return its descriptor.
    pub fn register_model(
        &self,
        model: &'static EntityModel,
    ) -> Result<Arc<EntityDescriptor>, InternalError> {
        if let Some(desc) = self.read()?.get(model.path) {
            return Ok(Arc::clone(desc));
        }

        let mut entities = self.write()?;
        if let Some(desc) = entities.get(model.path) {
            return Ok(Arc::clone(desc));
        }

        let desc = Arc::new(EntityDescriptor::augment(model, self.config.codec())?);
        entities.insert(model.path, Arc::clone(&desc));
        drop(entities);

        let composite = desc.has_composite_key();
        tracing::debug!(
            entity = model.path,
            composite,
            key = %desc.key_ref().label(),
            "cpkdb.register"
        );
        record(MetricsEvent::EntityRegistered {
            entity_path: model.path,
            composite,
        });

        Ok(desc)
    }

    /// Look up a registered entity by path.
    pub fn get(&self, path: &str) -> Result<Arc<EntityDescriptor>, InternalError> {
        self.read()?.get(path).cloned().ok_or_else(|| {
            CompositeKeyError::UnknownEntity {
                entity: path.to_string(),
            }
            .into()
        })
    }

    /// Descriptor for `E`, which must already be registered.
    pub fn descriptor<E: EntityKind>(&self) -> Result<Arc<EntityDescriptor>, InternalError> {
        self.get(E::PATH)
    }

    #[must_use]
    pub fn is_registered(&self, path: &str) -> bool {
        self.read().is_ok_and(|entities| entities.contains_key(path))
    }

    /// Follow relation segments from `from`, returning the entity reached.
    pub fn walk(
        &self,
        from: &EntityDescriptor,
        relations: &[String],
    ) -> Result<Arc<EntityDescriptor>, InternalError> {
        let mut current = self.get(from.path())?;

        for segment in relations {
            let model = current.model();
            let field = model.field(segment).ok_or_else(|| CompositeKeyError::UnknownField {
                entity: model.path.to_string(),
                field: segment.clone(),
            })?;
            let relation = field.relation.ok_or_else(|| CompositeKeyError::NotARelation {
                entity: model.path.to_string(),
                field: segment.clone(),
            })?;

            current = self.get(relation.target)?;
        }

        Ok(current)
    }

    /// Parse a textual path using the configured separator and key alias.
    #[must_use]
    pub fn parse_path(&self, path: &str) -> FieldPath {
        FieldPath::parse(path, &self.config.separator, &self.config.pk_alias)
    }

    /// Spell `path` with the configured separator and alias.
    #[must_use]
    pub fn format_path(&self, path: &FieldPath) -> String {
        path.render(&self.config.separator, &self.config.pk_alias)
    }

    /// Start a query over `E`.
    pub fn query<E: EntityKind>(&self) -> Result<Query<'_, E>, InternalError> {
        Query::new(self)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, EntityMap>, InternalError> {
        self.entities
            .read()
            .map_err(|_| InternalError::executor_internal("entity registry lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EntityMap>, InternalError> {
        self.entities
            .write()
            .map_err(|_| InternalError::executor_internal("entity registry lock poisoned"))
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorClass,
        obs::sink::{MetricsSink, with_metrics_sink},
        test_support::fixtures::{Album, CompanyBranch, Musician, registry},
        traits::Path,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingSink {
        registered: Mutex<Vec<&'static str>>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, event: MetricsEvent) {
            if let MetricsEvent::EntityRegistered { entity_path, .. } = event {
                self.registered.lock().expect("lock").push(entity_path);
            }
        }
    }

    #[test]
    fn register_is_idempotent() {
        let registry = EntityRegistry::new();
        let sink = CountingSink::default();

        let (first, second) = with_metrics_sink(&sink, || {
            let first = registry.register::<Album>().expect("first");
            let second = registry.register::<Album>().expect("second");
            (first, second)
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*sink.registered.lock().expect("lock"), vec![Album::PATH]);
    }

    #[test]
    fn concurrent_registration_yields_one_descriptor() {
        let registry = EntityRegistry::new();

        let descriptors: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.register::<CompanyBranch>().expect("register")))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("join"))
                .collect()
        });

        for desc in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], desc));
        }
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let registry = EntityRegistry::new();

        let err = registry.descriptor::<Musician>().expect_err("unregistered");

        assert_eq!(err.class, ErrorClass::NotFound);
        assert!(!registry.is_registered(Musician::PATH));
    }

    #[test]
    fn walk_follows_foreign_references() {
        let registry = registry();
        let album = registry.descriptor::<Album>().expect("album");

        let reached = registry
            .walk(&album, &["artist".to_string()])
            .expect("walk");
        assert_eq!(reached.path(), Musician::PATH);

        let err = registry
            .walk(&album, &["name".to_string()])
            .expect_err("not a relation");
        assert!(matches!(
            err.composite_key(),
            Some(CompositeKeyError::NotARelation { .. })
        ));
    }

    #[test]
    fn parse_path_uses_configured_alias_and_separator() {
        let config = CompositeKeyConfig {
            separator: "|".to_string(),
            pk_alias: "key".to_string(),
            max_batch_size: None,
        };
        let registry = EntityRegistry::with_config(config).expect("config");

        assert_eq!(registry.parse_path("artist.key"), FieldPath::pk().through("artist"));
        assert_eq!(
            registry.format_path(&FieldPath::pk().through("artist")),
            "artist.key"
        );
        assert_eq!(
            registry.format_path(&FieldPath::combined(["company_id", "country_code"])),
            "company_id|country_code"
        );
        assert_eq!(
            registry.parse_path("company_id|country_code"),
            FieldPath::combined(["company_id", "country_code"])
        );
        assert_eq!(registry.parse_path("pk"), FieldPath::field("pk"));
    }
}
