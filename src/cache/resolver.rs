//! Layout resolver callbacks.
//!
//! A resolver maps a layout name to its component. It must be a pure function of
//! the name: the cache calls it at most once per name.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::component::ComponentDefinition;
use crate::error::LoadFailure;
use crate::routing::LoadedModule;

/// Caller-supplied layout resolver.
pub type LayoutResolver =
    Arc<dyn Fn(&str) -> BoxFuture<'static, Result<LoadedModule, LoadFailure>> + Send + Sync>;

/// Build a resolver from an async closure taking the owned layout name.
pub fn resolver_fn<F, Fut>(f: F) -> LayoutResolver
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoadedModule, LoadFailure>> + Send + 'static,
{
    Arc::new(move |name: &str| f(name.to_string()).boxed())
}

/// Resolver backed by a fixed table of layouts.
#[derive(Debug, Clone, Default)]
pub struct StaticLayoutResolver {
    layouts: HashMap<String, Arc<ComponentDefinition>>,
}

impl StaticLayoutResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, name: impl Into<String>, def: Arc<ComponentDefinition>) -> Self {
        self.layouts.insert(name.into(), def);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, def: Arc<ComponentDefinition>) {
        self.layouts.insert(name.into(), def);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Result<LoadedModule, LoadFailure> {
        self.layouts
            .get(name)
            .cloned()
            .map(LoadedModule::Plain)
            .ok_or_else(|| LoadFailure::new(format!("Not found layout: {}", name)))
    }

    pub fn into_resolver(self) -> LayoutResolver {
        let table = Arc::new(self);
        Arc::new(move |name: &str| {
            let result = table.lookup(name);
            async move { result }.boxed()
        })
    }
}
