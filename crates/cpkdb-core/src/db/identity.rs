use crate::{
    db::{
        entity::{EntityDescriptor, KeyShape},
        query::predicate::{ast::Predicate, path::FieldPath},
    },
    error::{CompositeKeyError, InternalError},
    traits::{EntityKind, FieldValues},
    value::Value,
};

///
/// EntityIdentityExt
///
/// Logical primary-key access for entity instances. Implemented for every
/// `EntityKind + FieldValues`; the descriptor decides whether the key is a
/// single field or an encoded composite token.
///

pub trait EntityIdentityExt: EntityKind + FieldValues {
    /// Key constituent values in canonical order; unset fields are null.
    fn pkvals(&self, desc: &EntityDescriptor) -> Vec<Value> {
        desc.pkeys()
            .iter()
            .map(|f| self.get_value(f.name).unwrap_or(Value::Null))
            .collect()
    }

    /// The logical key, or `None` while any constituent is unset.
    ///
    /// Composite keys are returned as their encoded text token, memoized on
    /// the instance and re-encoded whenever a constituent value differs from
    /// the one it was built from.
    fn pk(&self, desc: &EntityDescriptor) -> Result<Option<Value>, InternalError> {
        ensure_descriptor::<Self>(desc)?;

        match desc.key() {
            KeyShape::Simple(field) => Ok(self.get_value(field.name).filter(|v| !v.is_null())),
            KeyShape::Composite(_) => {
                let token = self
                    .key_cache()
                    .get_or_encode(&self.pkvals(desc), |values| desc.codec().encode(values))?;

                Ok(token.map(Value::Text))
            }
        }
    }

    /// Assign the logical key.
    ///
    /// Composite keys accept an encoded token, a positional list, or a map
    /// keyed by constituent name. Values are validated before any field is
    /// written.
    fn set_pk(&mut self, desc: &EntityDescriptor, value: Value) -> Result<(), InternalError> {
        ensure_descriptor::<Self>(desc)?;

        let key = desc.key_ref();
        let values = match desc.key() {
            KeyShape::Simple(_) => vec![value],
            KeyShape::Composite(_) => key.split_value(&value, desc.codec().separator())?,
        };

        for (field, value) in key.fields().iter().zip(values) {
            self.set_value(field.name, value)?;
        }
        self.key_cache_mut().invalidate();

        Ok(())
    }

    /// Operand for an equality or membership test on the logical key: the
    /// raw value for a single-field key, the positional tuple otherwise.
    fn pk_operand(&self, desc: &EntityDescriptor) -> Value {
        let mut values = self.pkvals(desc);
        match desc.key() {
            KeyShape::Simple(_) if values.len() == 1 => values.remove(0),
            _ => Value::List(values),
        }
    }

    /// `(field, value)` pairs that identify this row, in canonical order.
    fn pk_lookups(&self, desc: &EntityDescriptor) -> Vec<(&'static str, Value)> {
        desc.pkeys()
            .iter()
            .map(|f| f.name)
            .zip(self.pkvals(desc))
            .collect()
    }

    /// Equality predicate selecting exactly this row.
    ///
    /// Fails with `IllegalState` while any key constituent is unset.
    fn pk_predicate(&self, desc: &EntityDescriptor) -> Result<Predicate, InternalError> {
        ensure_descriptor::<Self>(desc)?;

        let lookups = self.pk_lookups(desc);
        if let Some((field, _)) = lookups.iter().find(|(_, v)| v.is_null()) {
            return Err(CompositeKeyError::IllegalState {
                entity: desc.path().to_string(),
                reason: format!("primary key field '{field}' is not set"),
            }
            .into());
        }

        let mut leaves: Vec<Predicate> = lookups
            .into_iter()
            .map(|(field, value)| Predicate::eq(FieldPath::field(field), value))
            .collect();

        Ok(if leaves.len() == 1 {
            leaves.remove(0)
        } else {
            Predicate::And(leaves)
        })
    }
}

impl<E: EntityKind + FieldValues> EntityIdentityExt for E {}

fn ensure_descriptor<E: EntityKind + ?Sized>(desc: &EntityDescriptor) -> Result<(), InternalError> {
    if desc.path() == E::PATH {
        Ok(())
    } else {
        Err(InternalError::query_invariant(format!(
            "descriptor for '{}' used with entity '{}'",
            desc.path(),
            E::PATH
        )))
    }
}
