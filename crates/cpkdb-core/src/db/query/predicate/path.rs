use crate::key::{KeyCodec, composite::KeyTarget};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter between relation segments in textual paths.
pub const RELATION_SEP: char = '.';

///
/// PathTarget
///
/// What the last segment of a path refers to. `Combined` is an explicit
/// ad-hoc multi-column group; it is never recovered by string matching
/// during rewriting.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PathTarget {
    Field(String),
    PrimaryKey,
    Combined(Vec<String>),
}

///
/// FieldPath
///
/// Relation segments followed by a typed target, e.g. `artist.pk` or
/// `company.id,company_code`.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FieldPath {
    relations: Vec<String>,
    target: PathTarget,
}

impl FieldPath {
    #[must_use]
    pub const fn new(relations: Vec<String>, target: PathTarget) -> Self {
        Self { relations, target }
    }

    /// Plain column on the root entity.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::new(Vec::new(), PathTarget::Field(name.into()))
    }

    /// The logical primary key of the root entity.
    #[must_use]
    pub const fn pk() -> Self {
        Self::new(Vec::new(), PathTarget::PrimaryKey)
    }

    /// Ad-hoc multi-column group on the root entity.
    #[must_use]
    pub fn combined<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Vec::new(),
            PathTarget::Combined(names.into_iter().map(Into::into).collect()),
        )
    }

    /// Prefix this path with a relation hop.
    #[must_use]
    pub fn through(mut self, relation: impl Into<String>) -> Self {
        self.relations.insert(0, relation.into());
        self
    }

    /// Same relation prefix, different target.
    #[must_use]
    pub fn with_target(&self, target: PathTarget) -> Self {
        Self::new(self.relations.clone(), target)
    }

    /// Parse `a.b.c`, recognising `pk_alias` and `separator`-joined groups
    /// in the final segment.
    #[must_use]
    pub fn parse(path: &str, separator: &str, pk_alias: &str) -> Self {
        let mut segments: Vec<String> = path.split(RELATION_SEP).map(str::to_string).collect();
        let last = segments.pop().unwrap_or_default();

        let target = if last == pk_alias {
            PathTarget::PrimaryKey
        } else if last.contains(separator) {
            PathTarget::Combined(last.split(separator).map(str::to_string).collect())
        } else {
            PathTarget::Field(last)
        };

        Self::new(segments, target)
    }

    /// Inverse of `parse` for the same separator and alias.
    #[must_use]
    pub fn render(&self, separator: &str, pk_alias: &str) -> String {
        let mut out = String::new();
        for relation in &self.relations {
            out.push_str(relation);
            out.push(RELATION_SEP);
        }
        match &self.target {
            PathTarget::Field(name) => out.push_str(name),
            PathTarget::PrimaryKey => out.push_str(pk_alias),
            PathTarget::Combined(names) => out.push_str(&names.join(separator)),
        }

        out
    }

    #[must_use]
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    #[must_use]
    pub const fn target(&self) -> &PathTarget {
        &self.target
    }

    /// The key-shaped tail, if the target is not a plain field.
    #[must_use]
    pub fn key_target(&self) -> Option<KeyTarget<'_>> {
        match &self.target {
            PathTarget::Field(_) => None,
            PathTarget::PrimaryKey => Some(KeyTarget::PrimaryKey),
            PathTarget::Combined(names) => Some(KeyTarget::Combined(names)),
        }
    }
}

/// Parses with the default separator and the `pk` alias. A registry
/// configured with another separator or alias must parse through
/// `EntityRegistry::parse_path` instead.
impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path, KeyCodec::DEFAULT_SEPARATOR, "pk")
    }
}

/// Formats with the default separator and the `pk` alias; see
/// `FieldPath::render` for configured spellings.
impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(KeyCodec::DEFAULT_SEPARATOR, "pk"))
    }
}
