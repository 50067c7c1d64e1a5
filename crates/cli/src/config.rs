//! CLI configuration
//!
//! Loaded from a TOML file passed with `--config`. Every key is optional:
//!
//! ```toml
//! [codec]
//! max_depth = 64
//! intern_strings = true
//!
//! [records]
//! on_error = "abort"   # or "skip"
//! separator = "|"
//! ```

use crate::error::CliError;
use recwire_codec::CodecConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// What to do with a record that fails to decode or encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the record and keep going
    #[default]
    Skip,
    /// Stop at the first bad record
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordsConfig {
    pub on_error: ErrorPolicy,
    /// Separator between key and record in keyed lines
    pub separator: char,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        RecordsConfig {
            on_error: ErrorPolicy::default(),
            separator: '\t',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub codec: CodecConfig,
    pub records: RecordsConfig,
}

impl CliConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Read the config file at `path`, or the defaults when there is none
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content).map_err(CliError::Config)
    }
}
