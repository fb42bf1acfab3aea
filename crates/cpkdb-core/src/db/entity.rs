use crate::{
    error::{CompositeKeyError, InternalError},
    key::{CompositeKeyDescriptor, KeyCodec, KeyRef, composite::KeyTarget},
    model::{entity::EntityModel, field::EntityFieldModel},
};
use std::borrow::Cow;

///
/// KeyShape
///
/// Key capability chosen once per entity type when it is registered.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyShape {
    Simple(&'static EntityFieldModel),
    Composite(CompositeKeyDescriptor),
}

///
/// ModelCheck
/// Diagnostic produced by `EntityDescriptor::checks`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModelCheck {
    MultiplePrimaryKeys { entity: &'static str, count: usize },
}

///
/// EntityDescriptor
///
/// Immutable, registry-owned view of one entity: its model, its key shape,
/// and the codec used for its tokens. Built once by `augment`.
///

#[derive(Debug)]
pub struct EntityDescriptor {
    model: &'static EntityModel,
    key: KeyShape,
    pkeys: Vec<&'static EntityFieldModel>,
    codec: KeyCodec,
    single_pk_check: bool,
}

impl EntityDescriptor {
    /// Derive the key shape from the fields declared as primary key.
    ///
    /// One constituent keeps the simple single-key behavior; two or more
    /// produce a composite descriptor over them in declaration order.
    pub fn augment(model: &'static EntityModel, codec: KeyCodec) -> Result<Self, InternalError> {
        let pkeys: Vec<_> = model.primary_keys().collect();

        let key = match pkeys.as_slice() {
            [] => {
                return Err(CompositeKeyError::MissingPrimaryKey {
                    entity: model.path.to_string(),
                }
                .into());
            }
            [single] => KeyShape::Simple(*single),
            _ => KeyShape::Composite(CompositeKeyDescriptor::new(
                pkeys.clone(),
                codec.separator(),
            )?),
        };
        let single_pk_check = matches!(key, KeyShape::Simple(_));

        Ok(Self {
            model,
            key,
            pkeys,
            codec,
            single_pk_check,
        })
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.model.path
    }

    #[must_use]
    pub const fn key(&self) -> &KeyShape {
        &self.key
    }

    /// Primary-key constituents in canonical order.
    #[must_use]
    pub fn pkeys(&self) -> &[&'static EntityFieldModel] {
        &self.pkeys
    }

    #[must_use]
    pub const fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    #[must_use]
    pub const fn has_composite_key(&self) -> bool {
        matches!(self.key, KeyShape::Composite(_))
    }

    #[must_use]
    pub const fn composite(&self) -> Option<&CompositeKeyDescriptor> {
        match &self.key {
            KeyShape::Composite(desc) => Some(desc),
            KeyShape::Simple(_) => None,
        }
    }

    /// The declared key as a resolved reference.
    #[must_use]
    pub const fn key_ref(&self) -> KeyRef<'_> {
        match &self.key {
            KeyShape::Simple(field) => KeyRef::Field(*field),
            KeyShape::Composite(desc) => KeyRef::Composite(Cow::Borrowed(desc)),
        }
    }

    /// Resolve a key-shaped path tail against this entity's own fields.
    ///
    /// A combined group naming exactly the canonical constituents, in order,
    /// reuses the canonical descriptor; any other grouping is ad-hoc.
    pub fn resolve_key(&self, target: KeyTarget<'_>) -> Result<KeyRef<'_>, InternalError> {
        match target {
            KeyTarget::PrimaryKey => Ok(self.key_ref()),
            KeyTarget::Combined(names) => {
                let fresh =
                    CompositeKeyDescriptor::for_columns(self.model, names, self.codec.separator())?;

                match self.composite() {
                    Some(canonical) if canonical.same_fields(fresh.fields()) => {
                        Ok(KeyRef::Composite(Cow::Borrowed(canonical)))
                    }
                    _ => Ok(KeyRef::Composite(Cow::Owned(fresh))),
                }
            }
        }
    }

    /// Model diagnostics. The single-primary-key rule is suppressed for
    /// entities that declare a composite key.
    #[must_use]
    pub fn checks(&self) -> Vec<ModelCheck> {
        let mut issues = Vec::new();

        if self.single_pk_check && self.pkeys.len() != 1 {
            issues.push(ModelCheck::MultiplePrimaryKeys {
                entity: self.path(),
                count: self.pkeys.len(),
            });
        }

        issues
    }
}
