//! Configuration and manifest loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::manifest::Manifest;
use crate::config::schema::LayoutConfig;
use crate::config::validation::{validate_config, validate_manifest, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid manifest: {0}")]
    Manifest(String),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LayoutConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<LayoutConfig, ConfigError> {
    let config: LayoutConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a component manifest from a TOML file.
pub fn load_manifest(path: &Path) -> Result<Manifest, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_manifest(&content)
}

pub fn parse_manifest(content: &str) -> Result<Manifest, ConfigError> {
    let manifest: Manifest = toml::from_str(content)?;
    validate_manifest(&manifest).map_err(ConfigError::Validation)?;
    Ok(manifest)
}
