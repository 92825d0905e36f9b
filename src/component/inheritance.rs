//! Declared-layout lookup over the component inheritance graph.
//!
//! # Search Order
//! ```text
//! component.layout            (own declaration wins)
//!     → mixins[0], mixins[1], ... (depth-first, in priority order)
//!     → extends                   (depth-first)
//! ```
//! The first non-empty declaration found is returned.
//!
//! Definitions are immutable once built, so builder graphs cannot loop back on
//! themselves, and manifest cycles are rejected when the manifest is built. The
//! `InheritanceCycle` check is a guard only; no public constructor reaches it.

use std::sync::Arc;

use crate::component::definition::{ComponentDefinition, LayoutSpec};
use crate::error::{NavigationError, NavigationResult};

/// Find the layout a component declares directly or through inheritance.
///
/// Returns `Ok(None)` when nothing in the graph declares a layout.
pub fn resolve_declared_layout(def: &Arc<ComponentDefinition>) -> NavigationResult<Option<LayoutSpec>> {
    let mut path = Vec::new();
    search(def, &mut path)
}

fn search(
    def: &Arc<ComponentDefinition>,
    path: &mut Vec<*const ComponentDefinition>,
) -> NavigationResult<Option<LayoutSpec>> {
    let ptr = Arc::as_ptr(def);
    if path.contains(&ptr) {
        return Err(NavigationError::InheritanceCycle {
            component: def.display_name().to_string(),
        });
    }

    if let Some(declaration) = def.layout_declaration() {
        if let Some(spec) = declaration.normalize(def.display_name())? {
            return Ok(Some(spec));
        }
    }

    path.push(ptr);
    let found = search_ancestors(def, path);
    path.pop();
    found
}

fn search_ancestors(
    def: &Arc<ComponentDefinition>,
    path: &mut Vec<*const ComponentDefinition>,
) -> NavigationResult<Option<LayoutSpec>> {
    for mixin in def.mixins().iter().chain(def.parent()) {
        if let Some(spec) = search(mixin, path)? {
            return Ok(Some(spec));
        }
    }
    Ok(None)
}
