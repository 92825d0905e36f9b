//! Layout resolution and lazy loading for client-side routed UIs.
//!
//! Each navigation resolves the matched route chain's lazy components, selects
//! the layout declared closest to the leaf, loads that layout once through a
//! shared cache, and only then commits the (layout, page) pair.

pub mod cache;
pub mod component;
pub mod config;
pub mod error;
pub mod navigation;
pub mod observability;
pub mod routing;

pub use cache::{resolver_fn, LayoutCache, LayoutResolver, StaticLayoutResolver};
pub use component::{ComponentDefinition, LayoutDeclaration, LayoutSpec, Props};
pub use config::LayoutConfig;
pub use error::{LoadFailure, NavigationError, NavigationResult};
pub use navigation::{LayoutNotifier, NavigationCoordinator, NavigationGuard, Proceed, RenderOutput};
pub use routing::{LoadedModule, MatchedRouteEntry, ViewComponent};
