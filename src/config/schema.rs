//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files. Every
//! field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::routing::{DEFAULT_LAYOUT, PRIMARY_VIEW};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    /// Layout container settings.
    pub container: ContainerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Layout container settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Layout used when no component in the chain declares one.
    pub default_layout: String,

    /// View slot holding each route's main component.
    pub primary_view: String,

    /// Buffered layout events per subscriber before old ones are dropped.
    pub event_capacity: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_layout: DEFAULT_LAYOUT.to_string(),
            primary_view: PRIMARY_VIEW.to_string(),
            event_capacity: 16,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
