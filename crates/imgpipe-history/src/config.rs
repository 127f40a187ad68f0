//! Session configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config:
//!
//! ```yaml
//! enum_resolution: schema      # or trial_match
//! pretty_export: true
//! slow_operation_ms: 500
//! ```

use crate::codec::EnumResolution;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Tunables for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How imported enum names are resolved.
    pub enum_resolution: EnumResolution,
    /// Indent exported JSON.
    pub pretty_export: bool,
    /// Previews slower than this are logged as warnings.
    pub slow_operation_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enum_resolution: EnumResolution::Schema,
            pretty_export: true,
            slow_operation_ms: 500,
        }
    }
}

impl SessionConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), ?config, "Loaded session config");
        Ok(config)
    }
}
