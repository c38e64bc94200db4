// SPDX-License-Identifier: Apache-2.0

//! YAML defaults file for the shmbus tool.
//!
//! Resolution is flag-over-file: command-line flags win, then the file,
//! then built-in defaults. The key has no built-in default; it must
//! come from one of the first two.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use shmbus_core::SegmentKey;

/// Slot counts above this would ask for segments no kernel grants.
const MAX_SLOTS: u64 = 1 << 31;

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawConfig {
    key: Option<i32>,
    #[serde(default = "default_slots")]
    slots: u64,
    #[serde(default = "default_schema")]
    schema: String,
}

fn default_slots() -> u64 {
    1024
}

fn default_schema() -> String {
    "line-v1".to_string()
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            key: None,
            slots: default_slots(),
            schema: default_schema(),
        }
    }
}

/// Validated tool configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub key: SegmentKey,
    pub slots: u64,
    pub schema: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Missing required field: key (set it in the config file or pass --key)")]
    MissingKey,

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration loader with flag-over-file resolution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the effective configuration. A missing file is not an
    /// error here; flags and built-in defaults cover it.
    pub fn resolve(
        path: &str,
        key: Option<i32>,
        slots: Option<u64>,
        schema: Option<String>,
    ) -> Result<BusConfig, ConfigError> {
        let raw = if Path::new(path).exists() {
            Self::parse_file(path)?
        } else {
            tracing::debug!(path = %path, "No config file, using built-in defaults");
            RawConfig::default()
        };

        let key = key.or(raw.key).ok_or(ConfigError::MissingKey)?;
        let slots = slots.unwrap_or(raw.slots);
        let schema = schema.unwrap_or(raw.schema);

        Self::validate(key, slots, schema)
    }

    /// Load and validate a configuration file, erroring when it is
    /// missing or incomplete.
    pub fn load_file(path: impl AsRef<Path>) -> Result<BusConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = Self::parse_file(path)?;
        let key = raw.key.ok_or(ConfigError::MissingKey)?;
        Self::validate(key, raw.slots, raw.schema)
    }

    fn parse_file(path: impl AsRef<Path>) -> Result<RawConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            context: "reading config file",
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            message: format!("YAML parse error: {}", e),
        })
    }

    /// Validate raw values and convert to validated types.
    fn validate(key: i32, slots: u64, schema: String) -> Result<BusConfig, ConfigError> {
        let key = SegmentKey::new(key).map_err(|e| ConfigError::InvalidField {
            field: "key",
            value: key.to_string(),
            reason: e.to_string(),
        })?;

        if slots == 0 || slots > MAX_SLOTS {
            return Err(ConfigError::InvalidField {
                field: "slots",
                value: slots.to_string(),
                reason: format!("slot count must be between 1 and {}", MAX_SLOTS),
            });
        }

        if schema.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "schema",
                value: schema,
                reason: "schema tag cannot be empty".to_string(),
            });
        }

        Ok(BusConfig { key, slots, schema })
    }
}
