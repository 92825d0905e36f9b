//! Resolved layout cache.
//!
//! # Responsibilities
//! - Map layout name → resolved component, for the lifetime of the container
//! - Run the resolver at most once per name
//! - Share one in-flight resolution between concurrent requests
//!
//! # Design Decisions
//! - Failures are not cached; the in-flight entry is dropped so the next
//!   request starts a fresh attempt
//! - Different names resolve independently
//! - No eviction: the set of layouts is small and static

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::cache::resolver::LayoutResolver;
use crate::component::ComponentDefinition;
use crate::error::{NavigationError, NavigationResult};
use crate::observability::metrics;

type SharedResolution = Shared<BoxFuture<'static, NavigationResult<Arc<ComponentDefinition>>>>;

#[derive(Default)]
struct CacheInner {
    resolved: DashMap<String, Arc<ComponentDefinition>>,
    in_flight: Mutex<HashMap<String, SharedResolution>>,
}

impl CacheInner {
    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, SharedResolution>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Memoizing store of resolved layout components.
#[derive(Clone, Default)]
pub struct LayoutCache {
    inner: Arc<CacheInner>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached layout, or resolve it once.
    ///
    /// Concurrent calls for the same unresolved name await the same resolution and
    /// all observe its outcome.
    pub async fn get_or_resolve(
        &self,
        name: &str,
        resolver: &LayoutResolver,
    ) -> NavigationResult<Arc<ComponentDefinition>> {
        if let Some(def) = self.get(name) {
            metrics::record_cache_lookup(true);
            return Ok(def);
        }

        let resolution = {
            let mut in_flight = self.inner.in_flight();
            // A resolution may have finished between the lookup and the lock.
            if let Some(def) = self.get(name) {
                metrics::record_cache_lookup(true);
                return Ok(def);
            }
            metrics::record_cache_lookup(false);
            match in_flight.get(name) {
                Some(pending) => {
                    tracing::trace!(layout = %name, "Joining in-flight layout resolution");
                    pending.clone()
                }
                None => {
                    let pending = self.start_resolution(name, resolver);
                    in_flight.insert(name.to_string(), pending.clone());
                    pending
                }
            }
        };

        resolution.await
    }

    fn start_resolution(&self, name: &str, resolver: &LayoutResolver) -> SharedResolution {
        let inner = Arc::clone(&self.inner);
        let resolver = Arc::clone(resolver);
        let name = name.to_string();

        async move {
            tracing::debug!(layout = %name, "Resolving layout");
            let outcome = resolver(&name).await;

            match outcome {
                Ok(module) => {
                    let def = module.into_component();
                    inner.resolved.insert(name.clone(), Arc::clone(&def));
                    inner.in_flight().remove(&name);
                    metrics::record_layout_resolution(true);
                    tracing::info!(layout = %name, component = %def.display_name(), "Layout resolved");
                    Ok(def)
                }
                Err(source) => {
                    inner.in_flight().remove(&name);
                    metrics::record_layout_resolution(false);
                    tracing::warn!(layout = %name, error = %source, "Layout resolution failed");
                    Err(NavigationError::LayoutResolution { layout: name, source })
                }
            }
        }
        .boxed()
        .shared()
    }

    /// The resolved layout for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        self.inner.resolved.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.resolved.contains_key(name)
    }

    /// Number of resolved layouts.
    pub fn len(&self) -> usize {
        self.inner.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.resolved.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.resolved.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of resolutions currently in flight.
    pub fn pending(&self) -> usize {
        self.inner.in_flight().len()
    }
}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache")
            .field("resolved", &self.names())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::resolver::resolver_fn;
    use crate::error::LoadFailure;
    use crate::routing::LoadedModule;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_resolver(calls: Arc<AtomicUsize>, delay_ms: u64) -> LayoutResolver {
        resolver_fn(move |name| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok::<_, LoadFailure>(LoadedModule::ModuleWrapped {
                    default: ComponentDefinition::named(name).build(),
                })
            }
        })
    }

    #[tokio::test]
    async fn test_sequential_calls_resolve_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = counting_resolver(calls.clone(), 0);
        let cache = LayoutCache::new();

        let first = cache.get_or_resolve("foo", &resolver).await.unwrap();
        let second = cache.get_or_resolve("foo", &resolver).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), Some("foo"));
        assert!(cache.contains("foo"));
        assert_eq!(cache.pending(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = counting_resolver(calls.clone(), 20);
        let cache = LayoutCache::new();

        let results = futures_util::future::join_all(
            (0..8).map(|_| cache.get_or_resolve("bar", &resolver)),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_different_names_resolve_independently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = counting_resolver(calls.clone(), 10);
        let cache = LayoutCache::new();

        let (a, b) = tokio::join!(
            cache.get_or_resolve("foo", &resolver),
            cache.get_or_resolve("bar", &resolver)
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.names(), vec!["bar".to_string(), "foo".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let resolver = resolver_fn(move |name| {
            let attempt = c.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                if attempt == 0 {
                    Err(LoadFailure::new(format!("Not found layout: {}", name)))
                } else {
                    Ok(LoadedModule::Plain(ComponentDefinition::named(name).build()))
                }
            }
        });
        let cache = LayoutCache::new();

        let (a, b) = tokio::join!(
            cache.get_or_resolve("error", &resolver),
            cache.get_or_resolve("error", &resolver)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in [a, b] {
            let err = result.unwrap_err();
            assert_eq!(err.load_failure().unwrap().message(), "Not found layout: error");
        }
        assert!(!cache.contains("error"));
        assert_eq!(cache.pending(), 0);

        // The next request retries.
        let def = cache.get_or_resolve("error", &resolver).await.unwrap();
        assert_eq!(def.name(), Some("error"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = counting_resolver(calls.clone(), 0);
        let cache = LayoutCache::new();
        let other = cache.clone();

        cache.get_or_resolve("foo", &resolver).await.unwrap();
        other.get_or_resolve("foo", &resolver).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
