//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity of manifests (ids refer to known components)
//! - Validate value ranges and names

use std::collections::HashSet;
use std::fmt;

use crate::config::manifest::{Manifest, RouteConfig};
use crate::config::schema::LayoutConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration or manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration, collecting every problem.
pub fn validate_config(config: &LayoutConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.container.default_layout.trim().is_empty() {
        errors.push(ValidationError::new("container.default_layout", "must not be empty"));
    }
    if config.container.primary_view.trim().is_empty() {
        errors.push(ValidationError::new("container.primary_view", "must not be empty"));
    }
    if config.container.event_capacity == 0 {
        errors.push(ValidationError::new("container.event_capacity", "must be greater than 0"));
    }
    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate manifest references. Cycles are detected when the graph is built.
pub fn validate_manifest(manifest: &Manifest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (id, component) in &manifest.components {
        if let Some(parent) = &component.extends {
            if !manifest.components.contains_key(parent) {
                errors.push(ValidationError::new(
                    format!("components.{}.extends", id),
                    format!("unknown component `{}`", parent),
                ));
            }
        }
        for mixin in &component.mixins {
            if !manifest.components.contains_key(mixin) {
                errors.push(ValidationError::new(
                    format!("components.{}.mixins", id),
                    format!("unknown component `{}`", mixin),
                ));
            }
        }
    }

    for (id, lazy) in &manifest.lazy {
        if manifest.components.contains_key(id) {
            errors.push(ValidationError::new(
                format!("lazy.{}", id),
                "id is already used by a concrete component",
            ));
        }
        if !manifest.components.contains_key(&lazy.component) {
            errors.push(ValidationError::new(
                format!("lazy.{}.component", id),
                format!("unknown component `{}`", lazy.component),
            ));
        }
    }

    for (name, layout) in &manifest.layouts {
        if name.is_empty() {
            errors.push(ValidationError::new("layouts", "layout name must not be empty"));
        }
        if let Some(component) = &layout.component {
            if !manifest.components.contains_key(component) {
                errors.push(ValidationError::new(
                    format!("layouts.{}.component", name),
                    format!("unknown component `{}`", component),
                ));
            }
        }
    }

    let mut paths = HashSet::new();
    validate_routes(manifest, &manifest.routes, "routes", &mut paths, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_routes<'a>(
    manifest: &Manifest,
    routes: &'a [RouteConfig],
    field: &str,
    paths: &mut HashSet<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    for (i, route) in routes.iter().enumerate() {
        let here = format!("{}[{}]", field, i);
        if !paths.insert(route.path.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.path", here),
                format!("duplicate path `{}`", route.path),
            ));
        }
        for (slot, component) in route.slots() {
            if !manifest.components.contains_key(component) && !manifest.lazy.contains_key(component) {
                errors.push(ValidationError::new(
                    format!("{}.{}", here, slot),
                    format!("unknown component `{}`", component),
                ));
            }
        }
        validate_routes(manifest, &route.children, &format!("{}.children", here), paths, errors);
    }
}
