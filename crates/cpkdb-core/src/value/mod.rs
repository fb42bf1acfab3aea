#[cfg(test)]
mod tests;

use crate::model::field::EntityFieldKind;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// Value
/// can be used in WHERE statements and as key constituents
///
/// Null        → the field’s value is unset (i.e., SQL NULL).
/// Unit        → internal placeholder for RHS; not a real value.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// Ordered list of values.
    /// Used for tuples and many-cardinality operands; order is preserved.
    List(Vec<Self>),
    /// Ordered `(key, value)` pairs, looked up by key name.
    Map(Vec<(Self, Self)>),
    Null,
    Text(String),
    Uint(u64),
    Unit,
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from a list literal.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    /// Build a `Value::Map` from `(name, value)` pairs.
    pub fn from_named<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Self::Text(k.into()), v.into()))
                .collect(),
        )
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalars are the only values that may appear as key constituents.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::Text(_) | Self::Uint(_)
        )
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a map entry by text key.
    #[must_use]
    pub fn map_get(&self, name: &str) -> Option<&Self> {
        let Self::Map(entries) = self else {
            return None;
        };

        entries
            .iter()
            .find(|(k, _)| k.as_text() == Some(name))
            .map(|(_, v)| v)
    }

    ///
    /// KEY SEGMENTS
    ///

    /// String form used when this value is one segment of an encoded key.
    /// Returns `None` for non-scalar values.
    #[must_use]
    pub fn key_segment(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
            Self::Uint(v) => Some(v.to_string()),
            Self::List(_) | Self::Map(_) | Self::Null | Self::Unit => None,
        }
    }

    /// Parse one key segment into the scalar kind of its field.
    #[must_use]
    pub fn parse_segment(kind: EntityFieldKind, segment: &str) -> Option<Self> {
        match kind {
            EntityFieldKind::Bool => segment.parse().ok().map(Self::Bool),
            EntityFieldKind::Int => segment.parse().ok().map(Self::Int),
            EntityFieldKind::Text => Some(Self::Text(segment.to_string())),
            EntityFieldKind::Uint => segment.parse().ok().map(Self::Uint),
        }
    }

    ///
    /// COMPARISON
    ///

    /// Compare two scalars of the same family.
    /// Mixed signed/unsigned integers compare numerically.
    #[must_use]
    pub fn partial_cmp_scalar(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Uint(a), Self::Uint(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Uint(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Self::Uint(a), Self::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Null => f.write_str("NULL"),
            Self::Unit => f.write_str("()"),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Uint(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_value_from_tuple {
    ( $( $name:ident ),+ ) => {
        impl< $( $name: Into<Value> ),+ > From<( $( $name, )+ )> for Value {
            #[allow(non_snake_case)]
            fn from(( $( $name, )+ ): ( $( $name, )+ )) -> Self {
                Self::List(vec![ $( $name.into() ),+ ])
            }
        }
    };
}

impl_value_from_tuple!(A, B);
impl_value_from_tuple!(A, B, C);
impl_value_from_tuple!(A, B, C, D);
