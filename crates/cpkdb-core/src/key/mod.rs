pub mod composite;

use crate::{
    error::{CompositeKeyError, InternalError},
    model::field::EntityFieldModel,
    value::Value,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

// re-exports
pub use composite::{CompositeKeyDescriptor, KeyRef};

///
/// KeyCodec
///
/// Joins an ordered sequence of scalar key values into one token and splits
/// it back. The separator is reserved: a constituent whose string form
/// contains it will not survive a round trip. That is a documented
/// limitation of the token format, not something the codec repairs.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyCodec {
    separator: String,
}

impl KeyCodec {
    /// Separator used when none is configured.
    pub const DEFAULT_SEPARATOR: &'static str = ",";

    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Encode key values in descriptor order.
    ///
    /// Returns `Ok(None)` when any value is null: an entity whose key is not
    /// fully set has no identity, and a partial token would be wrong.
    pub fn encode(&self, values: &[Value]) -> Result<Option<String>, InternalError> {
        if values.iter().any(Value::is_null) {
            return Ok(None);
        }

        let mut segments = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            let segment = value
                .key_segment()
                .ok_or_else(|| CompositeKeyError::NonScalarKeyValue {
                    field: format!("#{i}"),
                })?;
            segments.push(segment);
        }

        Ok(Some(segments.join(&self.separator)))
    }

    /// Split a token into exactly `arity` segments.
    pub fn decode(&self, token: &str, arity: usize) -> Result<Vec<String>, InternalError> {
        let segments: Vec<String> = token.split(self.separator.as_str()).map(str::to_string).collect();

        if segments.len() != arity {
            return Err(CompositeKeyError::MalformedKey {
                token: token.to_string(),
                expected: arity,
                found: segments.len(),
            }
            .into());
        }

        Ok(segments)
    }

    /// Decode a token and coerce each segment into its field's scalar kind.
    pub fn decode_values(
        &self,
        token: &str,
        fields: &[&'static EntityFieldModel],
    ) -> Result<Vec<Value>, InternalError> {
        self.decode(token, fields.len())?
            .iter()
            .zip(fields)
            .map(|(segment, field)| coerce_segment(field, segment))
            .collect()
    }
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEPARATOR)
    }
}

/// Convert one text segment into the scalar kind of `field`.
pub fn coerce_segment(field: &EntityFieldModel, segment: &str) -> Result<Value, InternalError> {
    Value::parse_segment(field.kind, segment).ok_or_else(|| {
        CompositeKeyError::InvalidKeySegment {
            field: field.name.to_string(),
            segment: segment.to_string(),
        }
        .into()
    })
}

///
/// CachedKey
///
/// Memoized encoded token owned by an entity instance, stored together with
/// the constituent values it was encoded from. A lookup with different values
/// re-encodes, so direct field writes never surface an outdated token.
/// Never participates in equality.
///

#[derive(Debug, Default)]
pub struct CachedKey(Mutex<Option<EncodedKey>>);

#[derive(Clone, Debug)]
struct EncodedKey {
    values: Vec<Value>,
    token: String,
}

impl CachedKey {
    #[must_use]
    pub const fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// The last remembered token, if any.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.slot().as_ref().map(|encoded| encoded.token.clone())
    }

    /// Return the token for `values`, encoding (and remembering a defined
    /// result) unless the cached entry was built from the same values.
    pub fn get_or_encode(
        &self,
        values: &[Value],
        encode: impl FnOnce(&[Value]) -> Result<Option<String>, InternalError>,
    ) -> Result<Option<String>, InternalError> {
        let mut slot = self.slot();
        if let Some(encoded) = slot.as_ref().filter(|encoded| encoded.values == values) {
            return Ok(Some(encoded.token.clone()));
        }

        let token = encode(values)?;
        *slot = token.as_ref().map(|token| EncodedKey {
            values: values.to_vec(),
            token: token.clone(),
        });

        Ok(token)
    }

    pub fn invalidate(&mut self) {
        self.0
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn slot(&self) -> MutexGuard<'_, Option<EncodedKey>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for CachedKey {
    fn clone(&self) -> Self {
        Self(Mutex::new(self.slot().clone()))
    }
}

impl PartialEq for CachedKey {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for CachedKey {}
