//! Error definitions for layout resolution and navigation.
//!
//! Every failure reaches the router through the guard's `proceed` callback.
//! Errors are `Clone` because a single in-flight layout resolution is shared by
//! every caller waiting on it.

use thiserror::Error;

/// A rejection produced by a caller-supplied loader or layout resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadFailure {
    message: String,
}

impl LoadFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the loader rejected with.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for LoadFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for LoadFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Errors that abort a navigation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// A `layout` declaration is neither a name nor a `{name, props}` object.
    #[error("Malformed layout declaration on component `{component}`: {reason}")]
    MalformedLayout { component: String, reason: String },

    /// `extends`/`mixins` loop back onto a component already being searched.
    #[error("Inheritance cycle detected at component `{component}`")]
    InheritanceCycle { component: String },

    /// The layout was requested while the leaf component was still lazy.
    #[error("Route `{route}` still has an unresolved lazy component")]
    UnresolvedComponent { route: String },

    /// A lazy page or view component failed to load.
    #[error("Failed to load view `{view}` of route `{route}`: {source}")]
    ComponentLoad {
        route: String,
        view: String,
        source: LoadFailure,
    },

    /// The layout resolver rejected.
    #[error("Failed to resolve layout `{layout}`: {source}")]
    LayoutResolution { layout: String, source: LoadFailure },

    /// A newer transition committed before this one finished.
    #[error("Transition {generation} superseded by transition {committed}")]
    Superseded { generation: u64, committed: u64 },
}

impl NavigationError {
    /// The underlying loader rejection, if this error came from one.
    pub fn load_failure(&self) -> Option<&LoadFailure> {
        match self {
            NavigationError::ComponentLoad { source, .. }
            | NavigationError::LayoutResolution { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationError::MalformedLayout { .. } => "malformed_layout",
            NavigationError::InheritanceCycle { .. } => "inheritance_cycle",
            NavigationError::UnresolvedComponent { .. } => "unresolved_component",
            NavigationError::ComponentLoad { .. } => "component_load",
            NavigationError::LayoutResolution { .. } => "layout_resolution",
            NavigationError::Superseded { .. } => "superseded",
        }
    }
}

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NavigationError::LayoutResolution {
            layout: "error".into(),
            source: LoadFailure::new("Not found layout: error"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to resolve layout `error`: Not found layout: error"
        );
        assert_eq!(
            err.load_failure().map(LoadFailure::message),
            Some("Not found layout: error")
        );
    }

    #[test]
    fn test_error_kind() {
        let err = NavigationError::Superseded {
            generation: 1,
            committed: 2,
        };
        assert_eq!(err.kind(), "superseded");
        assert!(err.load_failure().is_none());
    }
}
