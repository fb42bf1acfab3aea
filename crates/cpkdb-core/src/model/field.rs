use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// EntityFieldModel
/// Runtime field metadata used by key resolution and rewriting.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntityFieldModel {
    /// Owning entity path.
    pub entity: &'static str,
    /// Field name as used in predicates.
    pub name: &'static str,
    /// Storage column; `None` means the column is named after the field.
    pub column: Option<&'static str>,
    /// Scalar storage kind.
    pub kind: EntityFieldKind,
    /// Declared as a primary-key constituent.
    pub primary_key: bool,
    /// Relation metadata for foreign references and relation collections.
    pub relation: Option<RelationModel>,
}

impl EntityFieldModel {
    #[must_use]
    pub const fn new(entity: &'static str, name: &'static str, kind: EntityFieldKind) -> Self {
        Self {
            entity,
            name,
            column: None,
            kind,
            primary_key: false,
            relation: None,
        }
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    /// Foreign reference to one row of `target`.
    #[must_use]
    pub const fn references(mut self, target: &'static str) -> Self {
        self.relation = Some(RelationModel {
            target,
            many: false,
        });
        self
    }

    /// Relation collection over `target` rows (not backed by a column).
    #[must_use]
    pub const fn many(mut self, target: &'static str) -> Self {
        self.relation = Some(RelationModel { target, many: true });
        self
    }

    /// Physical storage column.
    #[must_use]
    pub const fn column_name(&self) -> &'static str {
        match self.column {
            Some(column) => column,
            None => self.name,
        }
    }

    /// Whether the field is backed by a column on the owning row.
    #[must_use]
    pub const fn is_concrete(&self) -> bool {
        !matches!(self.relation, Some(RelationModel { many: true, .. }))
    }
}

///
/// EntityFieldKind
///
/// Scalar storage kind of a field. Foreign references use the kind of the
/// referenced key.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum EntityFieldKind {
    Bool,
    Int,
    Text,
    Uint,
}

///
/// RelationModel
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationModel {
    /// Path of the related entity.
    pub target: &'static str,
    /// Relation collection rather than a single foreign reference.
    pub many: bool,
}
