//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LayoutConfig (validated, immutable)
//!
//! manifest file (TOML)
//!     → loader.rs → validation.rs (reference checks)
//!     → manifest.rs build (id graph → Arc graph, cycle check, route chains)
//!     → ComponentRegistry
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod manifest;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_manifest, parse_config, parse_manifest, ConfigError};
pub use manifest::{ComponentRegistry, Manifest};
pub use schema::{ContainerConfig, LayoutConfig, LogFormat, ObservabilityConfig};
