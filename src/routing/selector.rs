//! Layout selection over a matched route chain.
//!
//! # Responsibilities
//! - Scan the chain from leaf to root
//! - Return the first layout declared by an entry's primary component
//! - Fall back to the default layout otherwise
//!
//! # Design Decisions
//! - The leaf must already be concrete; a lazy leaf is an error, not a guess
//! - Declarations are not inherited across chain levels, only through a
//!   component's own `extends`/`mixins`

use std::sync::Arc;

use crate::component::{resolve_declared_layout, LayoutSpec};
use crate::config::schema::ContainerConfig;
use crate::error::{NavigationError, NavigationResult};
use crate::routing::entry::{MatchedRouteEntry, ViewComponent, PRIMARY_VIEW};

/// Layout name used when nothing in the chain declares one.
pub const DEFAULT_LAYOUT: &str = "default";

/// Picks the effective layout for a chain.
#[derive(Debug, Clone)]
pub struct LayoutSelector {
    primary_view: String,
    default_layout: String,
}

impl Default for LayoutSelector {
    fn default() -> Self {
        Self {
            primary_view: PRIMARY_VIEW.to_string(),
            default_layout: DEFAULT_LAYOUT.to_string(),
        }
    }
}

impl LayoutSelector {
    pub fn new(primary_view: impl Into<String>, default_layout: impl Into<String>) -> Self {
        Self {
            primary_view: primary_view.into(),
            default_layout: default_layout.into(),
        }
    }

    pub fn from_config(config: &ContainerConfig) -> Self {
        Self::new(config.primary_view.clone(), config.default_layout.clone())
    }

    pub fn default_spec(&self) -> LayoutSpec {
        LayoutSpec::named(self.default_layout.clone())
    }

    /// Select the layout for a root-to-leaf chain. Never returns an empty spec.
    pub fn select(&self, chain: &[Arc<MatchedRouteEntry>]) -> NavigationResult<LayoutSpec> {
        let Some(leaf) = chain.last() else {
            return Ok(self.default_spec());
        };

        match leaf.slot(&self.primary_view) {
            None => return Ok(self.default_spec()),
            Some(ViewComponent::Lazy(_)) => {
                return Err(NavigationError::UnresolvedComponent {
                    route: leaf.path().to_string(),
                })
            }
            Some(ViewComponent::Concrete(_)) => {}
        }

        for entry in chain.iter().rev() {
            let def = match entry.slot(&self.primary_view) {
                Some(ViewComponent::Concrete(def)) => def,
                Some(ViewComponent::Lazy(_)) => {
                    tracing::warn!(route = %entry.path(), "Skipping unresolved component during layout selection");
                    continue;
                }
                None => continue,
            };
            if let Some(spec) = resolve_declared_layout(&def)? {
                tracing::trace!(route = %entry.path(), layout = %spec.name, "Layout declared");
                return Ok(spec);
            }
        }

        Ok(self.default_spec())
    }
}

/// Select with the default primary view and default layout name.
pub fn select_layout(chain: &[Arc<MatchedRouteEntry>]) -> NavigationResult<LayoutSpec> {
    LayoutSelector::default().select(chain)
}
