//! Navigation coordinator.
//!
//! # Pipeline (per transition, strictly sequential)
//! ```text
//! load_all(chain)
//!     → selector.select(chain)
//!     → cache.get_or_resolve(spec.name)
//!     → commit (only if no newer transition committed first)
//! ```
//! Any failure aborts before the commit; the previous render state stays.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{LayoutCache, LayoutResolver};
use crate::component::{ComponentDefinition, LayoutSpec};
use crate::config::schema::ContainerConfig;
use crate::error::{NavigationError, NavigationResult};
use crate::navigation::notifier::LayoutNotifier;
use crate::navigation::state::{CommittedLayout, LayoutChange, LayoutEvent, RenderOutput, RenderState};
use crate::observability::metrics;
use crate::routing::{load_all, LayoutSelector, MatchedRouteEntry, ViewComponent};

/// Kind of router transition being guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// First arrival at the container's subtree.
    Enter,
    /// Navigation within the subtree, reusing the container.
    Update,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Enter => "enter",
            TransitionKind::Update => "update",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a committed transition.
#[derive(Debug, Clone)]
pub struct Committed {
    pub generation: u64,
    pub layout: LayoutSpec,
    pub change: LayoutChange,
    /// The concrete leaf page, ready to be instantiated by the router.
    pub page: Option<Arc<ComponentDefinition>>,
}

/// Resolves and commits the layout for each navigation into the container.
pub struct NavigationCoordinator {
    selector: LayoutSelector,
    primary_view: String,
    cache: LayoutCache,
    resolver: LayoutResolver,
    state: ArcSwap<RenderState>,
    commit_lock: Mutex<()>,
    next_generation: AtomicU64,
    events: broadcast::Sender<LayoutEvent>,
}

impl NavigationCoordinator {
    /// Create a coordinator with default settings.
    pub fn new(resolver: LayoutResolver) -> Self {
        Self::with_config(resolver, &ContainerConfig::default())
    }

    pub fn with_config(resolver: LayoutResolver, config: &ContainerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            selector: LayoutSelector::from_config(config),
            primary_view: config.primary_view.clone(),
            cache: LayoutCache::new(),
            resolver,
            state: ArcSwap::from_pointee(RenderState::default()),
            commit_lock: Mutex::new(()),
            next_generation: AtomicU64::new(0),
            events,
        }
    }

    /// Use an existing cache, e.g. one shared with another container.
    pub fn with_cache(mut self, cache: LayoutCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Handle for nested route components to report in-subtree updates.
    pub fn notifier(self: &Arc<Self>) -> LayoutNotifier {
        LayoutNotifier::new(Arc::clone(self))
    }

    /// Receive an event after every commit that changed the layout or its props.
    pub fn subscribe(&self) -> broadcast::Receiver<LayoutEvent> {
        self.events.subscribe()
    }

    /// Current render state snapshot.
    pub fn state(&self) -> Arc<RenderState> {
        self.state.load_full()
    }

    pub fn current_layout(&self) -> Option<LayoutSpec> {
        self.state.load().current_layout().cloned()
    }

    /// Run the Enter pipeline.
    pub async fn enter(&self, chain: &[Arc<MatchedRouteEntry>]) -> NavigationResult<Committed> {
        self.transition(TransitionKind::Enter, chain).await
    }

    /// Run the Update pipeline.
    pub async fn update(&self, chain: &[Arc<MatchedRouteEntry>]) -> NavigationResult<Committed> {
        self.transition(TransitionKind::Update, chain).await
    }

    pub async fn transition(
        &self,
        kind: TransitionKind,
        chain: &[Arc<MatchedRouteEntry>],
    ) -> NavigationResult<Committed> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let span = tracing::debug_span!(
            "transition",
            id = %Uuid::new_v4(),
            kind = %kind,
            generation,
            route = chain.last().map(|e| e.path()).unwrap_or(""),
        );

        let result = self.run_pipeline(generation, chain).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(committed) => {
                metrics::record_transition(kind.as_str(), "committed");
                tracing::debug!(layout = %committed.layout.name, change = %committed.change, "Transition committed");
            }
            Err(err) => {
                metrics::record_transition(kind.as_str(), err.kind());
                tracing::warn!(error = %err, "Transition aborted");
            }
        });
        result
    }

    async fn run_pipeline(
        &self,
        generation: u64,
        chain: &[Arc<MatchedRouteEntry>],
    ) -> NavigationResult<Committed> {
        load_all(chain).await?;
        let spec = self.selector.select(chain)?;
        tracing::trace!(layout = %spec.name, "Layout selected");
        let component = self.cache.get_or_resolve(&spec.name, &self.resolver).await?;
        let page = self.leaf_page(chain);
        self.commit(generation, spec, component, page)
    }

    fn leaf_page(&self, chain: &[Arc<MatchedRouteEntry>]) -> Option<Arc<ComponentDefinition>> {
        match chain.last()?.slot(&self.primary_view)? {
            ViewComponent::Concrete(def) => Some(def),
            ViewComponent::Lazy(_) => None,
        }
    }

    fn commit(
        &self,
        generation: u64,
        spec: LayoutSpec,
        component: Arc<ComponentDefinition>,
        page: Option<Arc<ComponentDefinition>>,
    ) -> NavigationResult<Committed> {
        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.state.load_full();

        if previous.generation > generation {
            return Err(NavigationError::Superseded {
                generation,
                committed: previous.generation,
            });
        }

        let change = LayoutChange::between(previous.current_layout(), &spec);
        self.state.store(Arc::new(RenderState {
            current: Some(CommittedLayout {
                spec: spec.clone(),
                component,
            }),
            generation,
        }));

        if change != LayoutChange::Unchanged {
            // No subscribers is fine.
            let _ = self.events.send(LayoutEvent {
                generation,
                spec: spec.clone(),
                change: change.clone(),
            });
        }

        Ok(Committed {
            generation,
            layout: spec,
            change,
            page,
        })
    }

    /// What the container should display right now.
    pub fn render(&self) -> RenderOutput {
        let state = self.state.load();
        match &state.current {
            Some(current) if self.cache.contains(&current.spec.name) => RenderOutput::Layout {
                key: current.spec.name.clone(),
                component: Arc::clone(&current.component),
                props: current.spec.props.clone(),
            },
            _ => RenderOutput::Placeholder,
        }
    }
}

impl fmt::Debug for NavigationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationCoordinator")
            .field("selector", &self.selector)
            .field("cache", &self.cache)
            .field("state", &self.state.load())
            .finish()
    }
}
