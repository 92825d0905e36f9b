//! Route-update notifications from nested route components.
//!
//! When navigation stays inside a nested route, the router may only run the
//! update guard of the nested component, not the container's. The container
//! hands out a `LayoutNotifier` at construction; nested components call it from
//! their own update guard so the layout still follows the new route.

use std::sync::Arc;

use crate::error::NavigationResult;
use crate::navigation::coordinator::{Committed, NavigationCoordinator};
use crate::navigation::guard::Proceed;
use crate::routing::MatchedRouteEntry;

/// Cloneable handle onto a container's update pipeline.
#[derive(Debug, Clone)]
pub struct LayoutNotifier {
    coordinator: Arc<NavigationCoordinator>,
}

impl LayoutNotifier {
    pub(crate) fn new(coordinator: Arc<NavigationCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Run the update pipeline for the new route.
    pub async fn notify_route_update(&self, chain: &[Arc<MatchedRouteEntry>]) -> NavigationResult<Committed> {
        tracing::debug!(
            route = chain.last().map(|e| e.path()).unwrap_or(""),
            "Nested route update"
        );
        self.coordinator.update(chain).await
    }

    /// Update guard for a nested component: notify, then settle `proceed`.
    pub async fn before_update(&self, chain: Vec<Arc<MatchedRouteEntry>>, proceed: Proceed) {
        let result = self.notify_route_update(&chain).await.map(|_| ());
        proceed.call(result);
    }
}
