// Path: crates/types/src/config/mod.rs

//! Configuration of the validation engine.
//!
//! Every field has a serde default, so an empty TOML document yields a working
//! configuration and operators only spell out what they change.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Newest protocol version this engine understands.
pub const LATEST_PROTOCOL_VERSION: u32 = 1;

/// Errors loading a [`ValidationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this structure.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values are inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Limits and switches that shape validation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Newest accepted protocol version.
    #[serde(default = "default_latest_version")]
    pub latest_version: u32,
    /// Oldest accepted protocol version.
    #[serde(default = "default_minimal_version")]
    pub minimal_version: u32,
    /// Maximum number of enabled keys an identity may hold.
    #[serde(default = "default_max_public_keys")]
    pub max_public_keys: usize,
    /// Maximum nesting depth of a raw data contract.
    #[serde(default = "default_max_schema_depth")]
    pub max_schema_depth: usize,
    /// Maximum number of unique indices per document type.
    #[serde(default = "default_unique_indices_limit")]
    pub unique_indices_limit: usize,
    /// Largest `maxLength` an indexed string property may declare.
    #[serde(default = "default_max_indexed_string_length")]
    pub max_indexed_string_length: u64,
    /// Largest `maxItems` an indexed byte array property may declare.
    #[serde(default = "default_max_indexed_byte_array_length")]
    pub max_indexed_byte_array_length: u64,
    /// Skip every check that needs chain state, for fee and size estimation.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_latest_version() -> u32 {
    LATEST_PROTOCOL_VERSION
}
fn default_minimal_version() -> u32 {
    1
}
fn default_max_public_keys() -> usize {
    10
}
fn default_max_schema_depth() -> usize {
    500
}
fn default_unique_indices_limit() -> usize {
    3
}
fn default_max_indexed_string_length() -> u64 {
    63
}
fn default_max_indexed_byte_array_length() -> u64 {
    255
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            latest_version: default_latest_version(),
            minimal_version: default_minimal_version(),
            max_public_keys: default_max_public_keys(),
            max_schema_depth: default_max_schema_depth(),
            unique_indices_limit: default_unique_indices_limit(),
            max_indexed_string_length: default_max_indexed_string_length(),
            max_indexed_byte_array_length: default_max_indexed_byte_array_length(),
            dry_run: false,
        }
    }
}

impl ValidationConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// A copy of this configuration with dry run switched on.
    pub fn dry_run(&self) -> Self {
        Self {
            dry_run: true,
            ..self.clone()
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.minimal_version > self.latest_version {
            return Err(ConfigError::Invalid(format!(
                "minimal_version {} is greater than latest_version {}",
                self.minimal_version, self.latest_version
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ValidationConfig::from_toml_str("").unwrap();
        assert_eq!(config, ValidationConfig::default());
        assert_eq!(config.max_public_keys, 10);
        assert!(!config.dry_run);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ValidationConfig::from_toml_str(
            r#"
            latest_version = 3
            max_public_keys = 4
            dry_run = true
            "#,
        )
        .unwrap();
        assert_eq!(config.latest_version, 3);
        assert_eq!(config.max_public_keys, 4);
        assert!(config.dry_run);
        assert_eq!(config.unique_indices_limit, 3);
    }

    #[test]
    fn inverted_version_window_is_rejected() {
        let err = ValidationConfig::from_toml_str("minimal_version = 5\nlatest_version = 2")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ValidationConfig::load("/nonexistent/validation.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
