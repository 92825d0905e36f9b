//! Render state owned by the layout container.

use std::fmt;
use std::sync::Arc;

use crate::component::{ComponentDefinition, LayoutSpec, Props};

/// The layout committed by the most recent successful transition.
#[derive(Debug, Clone)]
pub struct CommittedLayout {
    pub spec: LayoutSpec,
    pub component: Arc<ComponentDefinition>,
}

/// Snapshot read by the renderer. Replaced atomically on every commit.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    /// Layout on screen, `None` before the first commit.
    pub current: Option<CommittedLayout>,
    /// Generation of the transition that produced this state.
    pub generation: u64,
}

impl RenderState {
    pub fn current_layout(&self) -> Option<&LayoutSpec> {
        self.current.as_ref().map(|c| &c.spec)
    }
}

/// What the container renders.
#[derive(Debug, Clone)]
pub enum RenderOutput {
    /// Nothing committed yet: no layout and no nested content.
    Placeholder,
    /// The layout component, keyed by name so a new name remounts it.
    Layout {
        key: String,
        component: Arc<ComponentDefinition>,
        props: Props,
    },
}

impl RenderOutput {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderOutput::Placeholder)
    }

    /// The remount key, if a layout is rendered.
    pub fn key(&self) -> Option<&str> {
        match self {
            RenderOutput::Placeholder => None,
            RenderOutput::Layout { key, .. } => Some(key),
        }
    }
}

/// How a commit changed the rendered layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutChange {
    /// First layout for this container.
    Mounted,
    /// A different layout replaced the previous one.
    Swapped { previous: String },
    /// Same layout, new props; no remount.
    PropsUpdated,
    /// Same layout and props.
    Unchanged,
}

impl LayoutChange {
    pub(crate) fn between(previous: Option<&LayoutSpec>, next: &LayoutSpec) -> Self {
        match previous {
            None => LayoutChange::Mounted,
            Some(prev) if !prev.same_layout(next) => LayoutChange::Swapped {
                previous: prev.name.clone(),
            },
            Some(prev) if prev.props != next.props => LayoutChange::PropsUpdated,
            Some(_) => LayoutChange::Unchanged,
        }
    }

    /// True when the renderer must instantiate a new layout component.
    pub fn remounts(&self) -> bool {
        matches!(self, LayoutChange::Mounted | LayoutChange::Swapped { .. })
    }
}

impl fmt::Display for LayoutChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutChange::Mounted => write!(f, "mounted"),
            LayoutChange::Swapped { previous } => write!(f, "swapped from {}", previous),
            LayoutChange::PropsUpdated => write!(f, "props updated"),
            LayoutChange::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Notification sent to renderers after a commit that changed something.
#[derive(Debug, Clone)]
pub struct LayoutEvent {
    pub generation: u64,
    pub spec: LayoutSpec,
    pub change: LayoutChange,
}
