use crate::{
    error::{CompositeKeyError, InternalError},
    key::coerce_segment,
    model::{
        entity::EntityModel,
        field::{EntityFieldKind, EntityFieldModel},
    },
    value::Value,
};
use std::borrow::Cow;

///
/// CompositeKeyDescriptor
///
/// Ordered group of at least two constituent fields treated as one logical
/// key. The field order is canonical: every encode, decode and predicate
/// decomposition uses it, and callers must supply values in it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompositeKeyDescriptor {
    entity: &'static str,
    fields: Vec<&'static EntityFieldModel>,
    name: String,
    column: String,
}

impl CompositeKeyDescriptor {
    pub fn new(
        fields: Vec<&'static EntityFieldModel>,
        separator: &str,
    ) -> Result<Self, InternalError> {
        let Some(first) = fields.first() else {
            return Err(CompositeKeyError::TooFewKeyColumns { found: 0 }.into());
        };
        if fields.len() < 2 {
            return Err(CompositeKeyError::TooFewKeyColumns { found: fields.len() }.into());
        }

        let entity = first.entity;
        let name = fields
            .iter()
            .map(|f| f.name)
            .collect::<Vec<_>>()
            .join(separator);
        let column = format!(
            "({})",
            fields
                .iter()
                .map(|f| f.column_name())
                .collect::<Vec<_>>()
                .join(",")
        );

        Ok(Self {
            entity,
            fields,
            name,
            column,
        })
    }

    /// Ad-hoc grouping of `names` (field names or storage columns) on `model`.
    pub fn for_columns(
        model: &EntityModel,
        names: &[String],
        separator: &str,
    ) -> Result<Self, InternalError> {
        let fields = names
            .iter()
            .map(|name| {
                model.field(name).ok_or_else(|| {
                    InternalError::from(CompositeKeyError::UnknownField {
                        entity: model.path.to_string(),
                        field: name.clone(),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(fields, separator)
    }

    /// Resolve a key reference against a related entity's own fields.
    ///
    /// Always builds a fresh key: the related entity's declared primary key
    /// for `KeyTarget::PrimaryKey`, or exactly the named columns for
    /// `KeyTarget::Combined`.
    pub fn resolve_relative(
        related: &EntityModel,
        target: KeyTarget<'_>,
        separator: &str,
    ) -> Result<KeyRef<'static>, InternalError> {
        match target {
            KeyTarget::PrimaryKey => {
                let pkeys: Vec<_> = related.primary_keys().collect();
                match pkeys.as_slice() {
                    [] => Err(CompositeKeyError::MissingPrimaryKey {
                        entity: related.path.to_string(),
                    }
                    .into()),
                    [single] => Ok(KeyRef::Field(*single)),
                    _ => Ok(KeyRef::Composite(Cow::Owned(Self::new(pkeys, separator)?))),
                }
            }
            KeyTarget::Combined(names) => Ok(KeyRef::Composite(Cow::Owned(Self::for_columns(
                related, names, separator,
            )?))),
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    #[must_use]
    pub fn fields(&self) -> &[&'static EntityFieldModel] {
        &self.fields
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Combined logical name, e.g. `company,country_code`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Combined physical column expression, e.g. `(company_id,country_code)`.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Constituent field names in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Same constituents in the same order.
    #[must_use]
    pub fn same_fields(&self, other: &[&'static EntityFieldModel]) -> bool {
        self.fields.len() == other.len()
            && self
                .fields
                .iter()
                .zip(other)
                .all(|(a, b)| a.entity == b.entity && a.name == b.name)
    }
}

///
/// KeyTarget
/// The key-shaped tail of a field path.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyTarget<'a> {
    PrimaryKey,
    Combined(&'a [String]),
}

///
/// KeyRef
///
/// A resolved key reference: either a single column, or a multi-column
/// group that must always be matched as a whole.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyRef<'a> {
    Field(&'static EntityFieldModel),
    Composite(Cow<'a, CompositeKeyDescriptor>),
}

impl KeyRef<'_> {
    #[must_use]
    pub fn fields(&self) -> &[&'static EntityFieldModel] {
        match self {
            Self::Field(field) => std::slice::from_ref(field),
            Self::Composite(desc) => desc.fields(),
        }
    }

    #[must_use]
    pub const fn is_multi_column(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Name used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Field(field) => field.name,
            Self::Composite(desc) => desc.name(),
        }
    }

    /// Split an operand into one value per constituent, in key order.
    ///
    /// Precedence: text is split on the separator, lists are positional,
    /// maps are looked up by constituent name (missing entries are null),
    /// and any other scalar is a single value.
    pub fn split_value(&self, value: &Value, separator: &str) -> Result<Vec<Value>, InternalError> {
        let fields = self.fields();

        let values = match value {
            Value::Text(token) => {
                let segments: Vec<&str> = token.split(separator).collect();
                if segments.len() != fields.len() {
                    return Err(self.count_mismatch(segments.len()));
                }
                return segments
                    .iter()
                    .zip(fields)
                    .map(|(segment, field)| coerce_segment(field, segment))
                    .collect();
            }
            Value::List(items) => items.clone(),
            Value::Map(_) => fields
                .iter()
                .map(|f| value.map_get(f.name).cloned().unwrap_or(Value::Null))
                .collect(),
            other => vec![other.clone()],
        };

        if values.len() != fields.len() {
            return Err(self.count_mismatch(values.len()));
        }

        values
            .into_iter()
            .zip(fields)
            .map(|(value, field)| coerce_value(field, value))
            .collect()
    }

    fn count_mismatch(&self, found: usize) -> InternalError {
        CompositeKeyError::ParameterCount {
            keys: self.label().to_string(),
            expected: self.fields().len(),
            found,
        }
        .into()
    }
}

// Text operands aimed at non-text columns are parsed into the column kind.
fn coerce_value(field: &EntityFieldModel, value: Value) -> Result<Value, InternalError> {
    match value {
        Value::Text(text) if field.kind != EntityFieldKind::Text => coerce_segment(field, &text),
        other => Ok(other),
    }
}
