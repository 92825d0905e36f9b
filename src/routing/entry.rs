//! Matched route entries and their view slots.
//!
//! # Responsibilities
//! - Hold the component for each named view slot of a matched route
//! - Distinguish concrete components from lazy loaders
//! - Replace a lazy slot in place once its component has loaded

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::component::ComponentDefinition;
use crate::error::LoadFailure;

/// Name of the slot holding a route's main component.
pub const PRIMARY_VIEW: &str = "default";

/// What a lazy loader hands back.
#[derive(Debug, Clone)]
pub enum LoadedModule {
    /// The component itself.
    Plain(Arc<ComponentDefinition>),
    /// A module whose default export is the component.
    ModuleWrapped { default: Arc<ComponentDefinition> },
}

impl LoadedModule {
    /// Strip the module wrapper, if any.
    pub fn into_component(self) -> Arc<ComponentDefinition> {
        match self {
            LoadedModule::Plain(def) => def,
            LoadedModule::ModuleWrapped { default } => default,
        }
    }
}

impl From<Arc<ComponentDefinition>> for LoadedModule {
    fn from(def: Arc<ComponentDefinition>) -> Self {
        LoadedModule::Plain(def)
    }
}

type LoaderFn = dyn Fn() -> BoxFuture<'static, Result<LoadedModule, LoadFailure>> + Send + Sync;

type SharedLoad = Shared<BoxFuture<'static, Result<LoadedModule, LoadFailure>>>;

/// A zero-argument loader producing a component asynchronously.
///
/// Clones share one in-flight load: overlapping callers await the same
/// invocation. A failed load is forgotten so the next call retries.
#[derive(Clone)]
pub struct ComponentLoader {
    load: Arc<LoaderFn>,
    in_flight: Arc<Mutex<Option<SharedLoad>>>,
}

impl ComponentLoader {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadedModule, LoadFailure>> + Send + 'static,
    {
        Self {
            load: Arc::new(move || f().boxed()),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Invoke the loader, or join the invocation already running.
    pub fn load(&self) -> BoxFuture<'static, Result<LoadedModule, LoadFailure>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = in_flight.as_ref() {
            return pending.clone().boxed();
        }

        let slot = Arc::downgrade(&self.in_flight);
        let pending = (self.load)()
            .map(move |outcome| {
                if let (Err(_), Some(slot)) = (&outcome, slot.upgrade()) {
                    slot.lock().unwrap_or_else(PoisonError::into_inner).take();
                }
                outcome
            })
            .boxed()
            .shared();
        *in_flight = Some(pending.clone());
        pending.boxed()
    }
}

impl fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComponentLoader")
    }
}

/// A view slot's component, concrete or still lazy.
#[derive(Debug, Clone)]
pub enum ViewComponent {
    Concrete(Arc<ComponentDefinition>),
    Lazy(ComponentLoader),
}

impl ViewComponent {
    pub fn lazy<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadedModule, LoadFailure>> + Send + 'static,
    {
        ViewComponent::Lazy(ComponentLoader::new(f))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, ViewComponent::Lazy(_))
    }

    /// The concrete definition, or `None` while still lazy.
    pub fn concrete(&self) -> Option<&Arc<ComponentDefinition>> {
        match self {
            ViewComponent::Concrete(def) => Some(def),
            ViewComponent::Lazy(_) => None,
        }
    }
}

impl From<Arc<ComponentDefinition>> for ViewComponent {
    fn from(def: Arc<ComponentDefinition>) -> Self {
        ViewComponent::Concrete(def)
    }
}

/// One node of a matched route chain.
///
/// Entries are owned by the router and shared; the only mutation performed here is
/// swapping a lazy slot for its loaded component.
#[derive(Debug)]
pub struct MatchedRouteEntry {
    path: String,
    views: DashMap<String, ViewComponent>,
}

impl MatchedRouteEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            views: DashMap::new(),
        }
    }

    /// Set the primary view.
    pub fn component(self, component: impl Into<ViewComponent>) -> Self {
        self.view(PRIMARY_VIEW, component)
    }

    /// Set a named view.
    pub fn view(self, slot: impl Into<String>, component: impl Into<ViewComponent>) -> Self {
        self.views.insert(slot.into(), component.into());
        self
    }

    pub fn build(self) -> Arc<MatchedRouteEntry> {
        Arc::new(self)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Snapshot of a slot's current component.
    pub fn slot(&self, slot: &str) -> Option<ViewComponent> {
        self.views.get(slot).map(|r| r.value().clone())
    }

    pub fn slot_names(&self) -> Vec<String> {
        self.views.iter().map(|r| r.key().clone()).collect()
    }

    /// Slots that still hold a loader.
    pub fn lazy_slots(&self) -> Vec<(String, ComponentLoader)> {
        self.views
            .iter()
            .filter_map(|r| match r.value() {
                ViewComponent::Lazy(loader) => Some((r.key().clone(), loader.clone())),
                ViewComponent::Concrete(_) => None,
            })
            .collect()
    }

    /// Replace a slot with its loaded component.
    pub fn resolve_slot(&self, slot: &str, def: Arc<ComponentDefinition>) {
        self.views.insert(slot.to_string(), ViewComponent::Concrete(def));
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.views.iter().all(|r| !r.value().is_lazy())
    }
}
