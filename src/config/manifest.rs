//! Declarative component manifest.
//!
//! A manifest describes components (with `layout`, `extends`, `mixins`), the
//! layouts a resolver can serve, and a nested route table. Building it turns ids
//! into the shared `Arc` graph and produces matched chains per route path.
//!
//! ```toml
//! [components.Base]
//! layout = "foo"
//!
//! [components.Page]
//! extends = "Base"
//! layout = { name = "bar", props = { title = "hi" } }
//!
//! [lazy.LazyPage]
//! component = "Page"
//! delay_ms = 50
//! module_wrapped = true
//!
//! [layouts.foo]
//! [layouts.bar]
//!
//! [[routes]]
//! path = "/"
//! component = "Base"
//!
//!   [[routes.children]]
//!   path = "/page"
//!   component = "LazyPage"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::StaticLayoutResolver;
use crate::component::ComponentDefinition;
use crate::config::loader::ConfigError;
use crate::error::LoadFailure;
use crate::routing::{LoadedModule, MatchedRouteEntry, ViewComponent};

/// Root of a manifest file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Manifest {
    /// Concrete component definitions by id.
    pub components: BTreeMap<String, ComponentConfig>,

    /// Lazy wrappers around concrete components, by id.
    pub lazy: BTreeMap<String, LazyConfig>,

    /// Layouts served by the manifest's resolver, by layout name.
    pub layouts: BTreeMap<String, LayoutEntry>,

    /// Top-level routes.
    pub routes: Vec<RouteConfig>,
}

/// One component definition.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Either a name or `{ name, props }`; checked at resolution time.
    pub layout: Option<Value>,

    /// Parent component id.
    pub extends: Option<String>,

    /// Mixin component ids, highest priority first.
    pub mixins: Vec<String>,
}

/// A component whose definition is only available after an async load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LazyConfig {
    /// Concrete component id the loader produces.
    pub component: String,

    /// Simulated load latency.
    #[serde(default)]
    pub delay_ms: u64,

    /// Deliver the component as a module default export.
    #[serde(default)]
    pub module_wrapped: bool,

    /// Reject with this message instead of loading.
    #[serde(default)]
    pub fail_with: Option<String>,
}

/// A layout the resolver can serve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutEntry {
    /// Component id rendering the layout; an anonymous one is used when absent.
    pub component: Option<String>,
}

/// A route and its nested children.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Full path of the route.
    pub path: String,

    /// Primary view component id.
    pub component: Option<String>,

    /// Additional named views: slot → component id.
    pub views: BTreeMap<String, String>,

    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    /// All (slot, component id) pairs, the primary view as `default`.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &str)> {
        self.component
            .iter()
            .map(|c| ("default", c.as_str()))
            .chain(self.views.iter().map(|(slot, c)| (slot.as_str(), c.as_str())))
    }
}

/// A manifest with every id resolved.
#[derive(Debug)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<ComponentDefinition>>,
    layouts: StaticLayoutResolver,
    chains: HashMap<String, Vec<Arc<MatchedRouteEntry>>>,
}

impl ComponentRegistry {
    pub fn component(&self, id: &str) -> Option<&Arc<ComponentDefinition>> {
        self.components.get(id)
    }

    /// Resolver serving the manifest's layouts.
    pub fn layouts(&self) -> &StaticLayoutResolver {
        &self.layouts
    }

    /// Matched chain (root → leaf) for a route path.
    pub fn chain(&self, path: &str) -> Option<Vec<Arc<MatchedRouteEntry>>> {
        self.chains.get(path).cloned()
    }

    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.chains.keys().map(String::as_str).collect();
        paths.sort();
        paths
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

struct GraphBuilder<'a> {
    manifest: &'a Manifest,
    built: HashMap<String, Arc<ComponentDefinition>>,
    visits: HashMap<&'a str, Visit>,
}

impl<'a> GraphBuilder<'a> {
    fn build(&mut self, id: &'a str) -> Result<Arc<ComponentDefinition>, ConfigError> {
        match self.visits.get(id) {
            Some(Visit::Done) => {
                if let Some(def) = self.built.get(id) {
                    return Ok(Arc::clone(def));
                }
            }
            Some(Visit::InProgress) => {
                return Err(ConfigError::Manifest(format!(
                    "inheritance cycle through component `{}`",
                    id
                )))
            }
            None => {}
        }

        let manifest: &'a Manifest = self.manifest;
        let config = manifest
            .components
            .get(id)
            .ok_or_else(|| ConfigError::Manifest(format!("unknown component `{}`", id)))?;
        self.visits.insert(id, Visit::InProgress);

        let mut def = ComponentDefinition::named(id);
        if let Some(layout) = &config.layout {
            def = def.layout_value(layout.clone());
        }
        for mixin in &config.mixins {
            def = def.mixin(self.build(mixin)?);
        }
        if let Some(parent) = &config.extends {
            def = def.extends(self.build(parent)?);
        }

        let def = def.build();
        self.visits.insert(id, Visit::Done);
        self.built.insert(id.to_string(), Arc::clone(&def));
        Ok(def)
    }
}

impl Manifest {
    /// Resolve ids into the component graph and route chains.
    ///
    /// `primary_view` names the slot that receives each route's `component`.
    pub fn build(&self, primary_view: &str) -> Result<ComponentRegistry, ConfigError> {
        let mut graph = GraphBuilder {
            manifest: self,
            built: HashMap::new(),
            visits: HashMap::new(),
        };
        for id in self.components.keys() {
            graph.build(id)?;
        }
        let components = graph.built;

        let mut layouts = StaticLayoutResolver::new();
        for (name, entry) in &self.layouts {
            let def = match &entry.component {
                Some(id) => lookup(&components, id)?,
                None => ComponentDefinition::named(name.clone()).build(),
            };
            layouts.insert(name.clone(), def);
        }

        let mut chains = HashMap::new();
        self.collect_chains(&self.routes, &components, primary_view, &mut Vec::new(), &mut chains)?;

        tracing::debug!(
            components = components.len(),
            layouts = self.layouts.len(),
            routes = chains.len(),
            "Manifest built"
        );

        Ok(ComponentRegistry {
            components,
            layouts,
            chains,
        })
    }

    fn collect_chains(
        &self,
        routes: &[RouteConfig],
        components: &HashMap<String, Arc<ComponentDefinition>>,
        primary_view: &str,
        ancestors: &mut Vec<Arc<MatchedRouteEntry>>,
        chains: &mut HashMap<String, Vec<Arc<MatchedRouteEntry>>>,
    ) -> Result<(), ConfigError> {
        for route in routes {
            let mut entry = MatchedRouteEntry::new(route.path.clone());
            for (slot, id) in route.slots() {
                let slot = if slot == "default" { primary_view } else { slot };
                entry = entry.view(slot, self.view_component(components, id)?);
            }
            let entry = entry.build();

            ancestors.push(entry);
            if chains.insert(route.path.clone(), ancestors.clone()).is_some() {
                return Err(ConfigError::Manifest(format!("duplicate route path `{}`", route.path)));
            }
            self.collect_chains(&route.children, components, primary_view, ancestors, chains)?;
            ancestors.pop();
        }
        Ok(())
    }

    fn view_component(
        &self,
        components: &HashMap<String, Arc<ComponentDefinition>>,
        id: &str,
    ) -> Result<ViewComponent, ConfigError> {
        let Some(lazy) = self.lazy.get(id) else {
            return lookup(components, id).map(ViewComponent::Concrete);
        };

        let def = lookup(components, &lazy.component)?;
        let delay = Duration::from_millis(lazy.delay_ms);
        let module_wrapped = lazy.module_wrapped;
        let failure = lazy.fail_with.clone();

        Ok(ViewComponent::lazy(move || {
            let def = Arc::clone(&def);
            let failure = failure.clone();
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if let Some(message) = failure {
                    return Err(LoadFailure::new(message));
                }
                Ok(if module_wrapped {
                    LoadedModule::ModuleWrapped { default: def }
                } else {
                    LoadedModule::Plain(def)
                })
            }
        }))
    }
}

fn lookup(
    components: &HashMap<String, Arc<ComponentDefinition>>,
    id: &str,
) -> Result<Arc<ComponentDefinition>, ConfigError> {
    components
        .get(id)
        .cloned()
        .ok_or_else(|| ConfigError::Manifest(format!("unknown component `{}`", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::resolve_declared_layout;
    use crate::routing::{load_all, select_layout};

    const MANIFEST: &str = r#"
        [components.Root]
        layout = "foo"

        [components.Super]
        layout = "bar"

        [components.Page]
        extends = "Super"

        [components.Plain]

        [lazy.LazyPage]
        component = "Page"
        module_wrapped = true

        [layouts.default]
        [layouts.foo]
        [layouts.bar]

        [[routes]]
        path = "/"
        component = "Root"

          [[routes.children]]
          path = "/plain"
          component = "Plain"

          [[routes.children]]
          path = "/lazy"
          component = "LazyPage"
    "#;

    #[test]
    fn test_build_graph() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        let registry = manifest.build("default").unwrap();

        let page = registry.component("Page").unwrap();
        assert_eq!(resolve_declared_layout(page).unwrap().unwrap().name, "bar");
        assert!(registry.layouts().contains("foo"));
        assert_eq!(registry.paths(), vec!["/", "/lazy", "/plain"]);
    }

    #[test]
    fn test_chains_share_parent_entries() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        let registry = manifest.build("default").unwrap();

        let plain = registry.chain("/plain").unwrap();
        let lazy = registry.chain("/lazy").unwrap();
        assert_eq!(plain.len(), 2);
        assert!(Arc::ptr_eq(&plain[0], &lazy[0]));
        assert_eq!(select_layout(&plain).unwrap().name, "foo");
    }

    #[tokio::test]
    async fn test_lazy_route_loads() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        let registry = manifest.build("default").unwrap();

        let chain = registry.chain("/lazy").unwrap();
        load_all(&chain).await.unwrap();
        assert_eq!(select_layout(&chain).unwrap().name, "bar");
    }

    #[test]
    fn test_cycle_is_rejected() {
        let manifest: Manifest = toml::from_str(
            r#"
            [components.A]
            extends = "B"

            [components.B]
            mixins = ["A"]
            "#,
        )
        .unwrap();
        let err = manifest.build("default").unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }
}
