//! Router guard integration.
//!
//! The router calls `before_enter`/`before_update` with the matched chain and a
//! `Proceed` continuation. `Proceed` is consumed on use, so it runs exactly once.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::NavigationResult;
use crate::navigation::coordinator::NavigationCoordinator;
use crate::routing::MatchedRouteEntry;

/// Continuation that lets the router continue (`Ok`) or abort (`Err`) a navigation.
pub struct Proceed {
    f: Box<dyn FnOnce(NavigationResult<()>) + Send>,
}

impl Proceed {
    pub fn new(f: impl FnOnce(NavigationResult<()>) + Send + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    /// Settle the navigation.
    pub fn call(self, result: NavigationResult<()>) {
        (self.f)(result)
    }
}

impl fmt::Debug for Proceed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Proceed")
    }
}

/// Navigation hooks a router invokes before completing a transition.
pub trait NavigationGuard: Send + Sync {
    fn before_enter(&self, chain: Vec<Arc<MatchedRouteEntry>>, proceed: Proceed) -> BoxFuture<'_, ()>;

    fn before_update(&self, chain: Vec<Arc<MatchedRouteEntry>>, proceed: Proceed) -> BoxFuture<'_, ()>;
}

impl NavigationGuard for NavigationCoordinator {
    fn before_enter(&self, chain: Vec<Arc<MatchedRouteEntry>>, proceed: Proceed) -> BoxFuture<'_, ()> {
        async move {
            let result = self.enter(&chain).await.map(|_| ());
            proceed.call(result);
        }
        .boxed()
    }

    fn before_update(&self, chain: Vec<Arc<MatchedRouteEntry>>, proceed: Proceed) -> BoxFuture<'_, ()> {
        async move {
            let result = self.update(&chain).await.map(|_| ());
            proceed.call(result);
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StaticLayoutResolver;
    use crate::component::ComponentDefinition;
    use crate::error::NavigationError;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_proceed_receives_outcome() {
        let coordinator = NavigationCoordinator::new(
            StaticLayoutResolver::new()
                .with_layout("foo", ComponentDefinition::named("Foo").build())
                .into_resolver(),
        );

        let ok_chain = vec![MatchedRouteEntry::new("/")
            .component(ComponentDefinition::named("A").layout("foo").build())
            .build()];
        let (tx, rx) = oneshot::channel();
        coordinator
            .before_enter(ok_chain, Proceed::new(move |r| drop(tx.send(r))))
            .await;
        assert!(rx.await.unwrap().is_ok());

        let bad_chain = vec![MatchedRouteEntry::new("/missing")
            .component(ComponentDefinition::named("B").layout("missing").build())
            .build()];
        let (tx, rx) = oneshot::channel();
        coordinator
            .before_update(bad_chain, Proceed::new(move |r| drop(tx.send(r))))
            .await;
        assert!(matches!(
            rx.await.unwrap(),
            Err(NavigationError::LayoutResolution { .. })
        ));
    }
}
