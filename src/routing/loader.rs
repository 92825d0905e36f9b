//! Async component loading.
//!
//! # Responsibilities
//! - Invoke every lazy loader across every slot of a matched chain
//! - Normalize module-wrapped results
//! - Memoize by replacing the slot in place
//!
//! # Design Decisions
//! - Loaders run concurrently and every one runs to completion, even after
//!   another has rejected; each success replaces its slot
//! - Any rejection fails the whole load; the error reported is the first in
//!   chain order
//! - Loaded slots stay loaded (no rollback)
//! - Overlapping loads of the same slot share one loader invocation

use std::sync::Arc;

use futures_util::future::join_all;

use crate::error::{NavigationError, NavigationResult};
use crate::observability::metrics;
use crate::routing::entry::MatchedRouteEntry;

/// Resolve every lazy component in `chain` to a concrete definition.
///
/// Already-concrete slots are left untouched, so loading the same chain twice
/// invokes each loader at most once.
pub async fn load_all(chain: &[Arc<MatchedRouteEntry>]) -> NavigationResult<()> {
    let pending: Vec<_> = chain
        .iter()
        .flat_map(|entry| {
            entry
                .lazy_slots()
                .into_iter()
                .map(move |(slot, loader)| (entry.clone(), slot, loader))
        })
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = pending.len(), "Loading lazy components");

    let loads = pending.into_iter().map(|(entry, slot, loader)| async move {
        match loader.load().await {
            Ok(module) => {
                let def = module.into_component();
                tracing::trace!(
                    route = %entry.path(),
                    view = %slot,
                    component = %def.display_name(),
                    "Lazy component loaded"
                );
                metrics::record_component_load(true);
                entry.resolve_slot(&slot, def);
                Ok(())
            }
            Err(source) => {
                tracing::warn!(route = %entry.path(), view = %slot, error = %source, "Lazy component failed to load");
                metrics::record_component_load(false);
                Err(NavigationError::ComponentLoad {
                    route: entry.path().to_string(),
                    view: slot,
                    source,
                })
            }
        }
    });

    join_all(loads).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentDefinition;
    use crate::error::LoadFailure;
    use crate::routing::entry::{LoadedModule, ViewComponent, PRIMARY_VIEW};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_lazy(name: &'static str, calls: Arc<AtomicUsize>) -> ViewComponent {
        ViewComponent::lazy(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, LoadFailure>(LoadedModule::ModuleWrapped {
                    default: ComponentDefinition::named(name).build(),
                })
            }
        })
    }

    #[tokio::test]
    async fn test_load_all_resolves_every_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = vec![
            MatchedRouteEntry::new("/")
                .component(counting_lazy("Root", calls.clone()))
                .build(),
            MatchedRouteEntry::new("/leaf")
                .component(counting_lazy("Leaf", calls.clone()))
                .view("aside", counting_lazy("Aside", calls.clone()))
                .build(),
        ];

        load_all(&chain).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(chain.iter().all(|e| e.is_fully_resolved()));
        let leaf = chain[1].slot(PRIMARY_VIEW).unwrap();
        assert_eq!(leaf.concrete().unwrap().name(), Some("Leaf"));

        // Second traversal is a no-op.
        load_all(&chain).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let chain = vec![
            MatchedRouteEntry::new("/")
                .component(ComponentDefinition::named("Root").build())
                .build(),
            MatchedRouteEntry::new("/broken")
                .component(ViewComponent::lazy(|| async {
                    Err::<LoadedModule, _>(LoadFailure::new("chunk failed"))
                }))
                .build(),
        ];

        let err = load_all(&chain).await.unwrap_err();
        match err {
            NavigationError::ComponentLoad { route, view, source } => {
                assert_eq!(route, "/broken");
                assert_eq!(view, PRIMARY_VIEW);
                assert_eq!(source.message(), "chunk failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!chain[1].is_fully_resolved());
    }

    #[tokio::test]
    async fn test_partial_resolution_is_kept() {
        let chain = vec![
            MatchedRouteEntry::new("/ok")
                .component(ViewComponent::lazy(|| async {
                    Ok::<_, LoadFailure>(LoadedModule::Plain(ComponentDefinition::named("Ok").build()))
                }))
                .build(),
            MatchedRouteEntry::new("/slow-fail")
                .component(ViewComponent::lazy(|| async {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    Err::<LoadedModule, _>(LoadFailure::new("boom"))
                }))
                .build(),
        ];

        assert!(load_all(&chain).await.is_err());
        assert!(chain[0].is_fully_resolved());
    }

    #[tokio::test]
    async fn test_slow_loads_finish_after_a_rejection() {
        let chain = vec![
            MatchedRouteEntry::new("/slow")
                .component(ViewComponent::lazy(|| async {
                    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
                    Ok::<_, LoadFailure>(LoadedModule::Plain(ComponentDefinition::named("Slow").build()))
                }))
                .build(),
            MatchedRouteEntry::new("/fast-fail")
                .component(ViewComponent::lazy(|| async {
                    Err::<LoadedModule, _>(LoadFailure::new("boom"))
                }))
                .build(),
        ];

        let err = load_all(&chain).await.unwrap_err();
        assert_eq!(err.load_failure().unwrap().message(), "boom");
        assert!(chain[0].is_fully_resolved());
        assert!(!chain[1].is_fully_resolved());
    }

    #[tokio::test]
    async fn test_overlapping_loads_share_one_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let chain = vec![MatchedRouteEntry::new("/lazy")
            .component(ViewComponent::lazy(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    Ok::<_, LoadFailure>(LoadedModule::Plain(ComponentDefinition::named("Lazy").build()))
                }
            }))
            .build()];

        let (first, second) = tokio::join!(load_all(&chain), load_all(&chain));
        first.unwrap();
        second.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(chain[0].is_fully_resolved());
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let chain = vec![MatchedRouteEntry::new("/flaky")
            .component(ViewComponent::lazy(move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(LoadFailure::new("offline"))
                    } else {
                        Ok(LoadedModule::Plain(ComponentDefinition::named("Flaky").build()))
                    }
                }
            }))
            .build()];

        assert!(load_all(&chain).await.is_err());
        load_all(&chain).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(chain[0].is_fully_resolved());
    }
}
