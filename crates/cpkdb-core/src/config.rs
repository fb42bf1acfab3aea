//! Configuration for key encoding and batching (`cpkdb.toml`).

use crate::{error::InternalError, key::KeyCodec};
use serde::{Deserialize, Serialize};
use std::path::Path;

///
/// CompositeKeyConfig
///
/// ```toml
/// separator = ","
/// pk_alias = "pk"
/// max_batch_size = 500
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeKeyConfig {
    /// Reserved separator for encoded tokens and combined column names.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Field name that refers to the logical primary key.
    #[serde(default = "default_pk_alias")]
    pub pk_alias: String,

    /// Upper bound applied on top of the backend's own batch limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<usize>,
}

fn default_separator() -> String {
    KeyCodec::DEFAULT_SEPARATOR.to_string()
}

fn default_pk_alias() -> String {
    "pk".to_string()
}

impl Default for CompositeKeyConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            pk_alias: default_pk_alias(),
            max_batch_size: None,
        }
    }
}

impl CompositeKeyConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, InternalError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            InternalError::config_unsupported(format!("cannot read {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, InternalError> {
        let config: Self = toml::from_str(s)
            .map_err(|e| InternalError::config_unsupported(format!("invalid config: {e}")))?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that would make paths or tokens ambiguous.
    pub fn validate(&self) -> Result<(), InternalError> {
        if self.separator.is_empty() {
            return Err(InternalError::config_unsupported(
                "separator must not be empty",
            ));
        }
        if self.separator.contains('.') {
            return Err(InternalError::config_unsupported(
                "separator must not contain the relation delimiter '.'",
            ));
        }
        if self.pk_alias.is_empty() || self.pk_alias.contains(self.separator.as_str()) {
            return Err(InternalError::config_unsupported(format!(
                "invalid pk alias '{}'",
                self.pk_alias
            )));
        }
        if self.max_batch_size == Some(0) {
            return Err(InternalError::config_unsupported(
                "max_batch_size must be positive",
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn codec(&self) -> KeyCodec {
        KeyCodec::new(self.separator.clone())
    }
}
