//! Shared utilities for integration testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use router_layout::component::ComponentInstance;
use router_layout::navigation::{NavigationCoordinator, NavigationGuard, Proceed};
use router_layout::routing::{LoadedModule, MatchedRouteEntry, ViewComponent, PRIMARY_VIEW};
use router_layout::{resolver_fn, ComponentDefinition, LayoutResolver, LoadFailure, NavigationResult};
use tokio::sync::oneshot;

/// Ordered record of observable side effects.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }
}

/// Layout resolver serving `default`, `foo` and `bar`, rejecting anything else.
///
/// Counts invocations and logs `layout:<name>` once each layout is ready.
pub struct TestLayouts {
    pub calls: Arc<AtomicUsize>,
    pub resolver: LayoutResolver,
}

#[allow(dead_code)]
pub fn test_layouts(delay_ms: u64, log: EventLog) -> TestLayouts {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let resolver = resolver_fn(move |name| {
        counter.fetch_add(1, Ordering::SeqCst);
        let log = log.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            match name.as_str() {
                "default" | "foo" | "bar" => {
                    log.push(format!("layout:{}", name));
                    let def = ComponentDefinition::named(format!("{}-layout", name)).build();
                    Ok(LoadedModule::Plain(def))
                }
                _ => Err(LoadFailure::new(format!("Not found layout: {}", name))),
            }
        }
    });
    TestLayouts { calls, resolver }
}

/// A lazy view that resolves to `def` after `delay_ms`, optionally module-wrapped.
#[allow(dead_code)]
pub fn lazy_view(def: Arc<ComponentDefinition>, delay_ms: u64, module_wrapped: bool, calls: Arc<AtomicUsize>) -> ViewComponent {
    ViewComponent::lazy(move || {
        let def = def.clone();
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok::<_, LoadFailure>(if module_wrapped {
                LoadedModule::ModuleWrapped { default: def }
            } else {
                LoadedModule::Plain(def)
            })
        }
    })
}

/// Minimal router: drives the container's guards and mounts the leaf page only
/// after the guard lets the navigation proceed.
pub struct MockRouter {
    container: Arc<NavigationCoordinator>,
    entered: bool,
    pub current_route: Option<String>,
    pub page: Option<ComponentInstance>,
}

#[allow(dead_code)]
impl MockRouter {
    pub fn new(container: Arc<NavigationCoordinator>) -> Self {
        Self {
            container,
            entered: false,
            current_route: None,
            page: None,
        }
    }

    pub async fn push(&mut self, chain: Vec<Arc<MatchedRouteEntry>>) -> NavigationResult<()> {
        let (tx, rx) = oneshot::channel();
        let proceed = Proceed::new(move |result| {
            let _ = tx.send(result);
        });

        if self.entered {
            self.container.before_update(chain.clone(), proceed).await;
        } else {
            self.container.before_enter(chain.clone(), proceed).await;
        }
        let result = rx.await.expect("guard must settle the navigation");

        if result.is_ok() {
            self.entered = true;
            let leaf = chain.last().expect("non-empty chain");
            self.current_route = Some(leaf.path().to_string());
            self.page = leaf
                .slot(PRIMARY_VIEW)
                .and_then(|view| view.concrete().cloned())
                .map(|def| def.instantiate());
        }
        result
    }
}

/// Single-entry chain with a concrete primary component.
#[allow(dead_code)]
pub fn route(path: &str, def: ComponentDefinition) -> Vec<Arc<MatchedRouteEntry>> {
    vec![MatchedRouteEntry::new(path).component(def.build()).build()]
}
