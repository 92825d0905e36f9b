//! Component definitions and layout declarations.
//!
//! # Responsibilities
//! - Describe a renderable unit and its inheritance edges (`extends`, `mixins`)
//! - Carry the author's `layout` declaration in typed or raw form
//! - Run the component's initialization hook when it is instantiated

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NavigationError, NavigationResult};

/// Props passed to a layout component.
pub type Props = Map<String, Value>;

/// Initialization side effect run when a component is instantiated.
pub type CreatedHook = Arc<dyn Fn() + Send + Sync>;

/// The effective layout of a navigation: a name plus props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub name: String,
    #[serde(default)]
    pub props: Props,
}

impl LayoutSpec {
    /// A spec with no props.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Props::new(),
        }
    }

    pub fn with_props(name: impl Into<String>, props: Props) -> Self {
        Self {
            name: name.into(),
            props,
        }
    }

    /// Two specs denote the same layout iff their names match; props are ignored.
    pub fn same_layout(&self, other: &LayoutSpec) -> bool {
        self.name == other.name
    }
}

/// The `layout` field as written by a component author.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutDeclaration {
    /// `layout: "foo"`
    Name(String),
    /// `layout: { name: "foo", props: {...} }`
    Spec(LayoutSpec),
    /// Untyped value (e.g. read from a manifest), checked when resolved.
    Raw(Value),
}

impl LayoutDeclaration {
    /// Normalize into a spec.
    ///
    /// Returns `Ok(None)` for an empty name so that the search keeps going.
    pub fn normalize(&self, component: &str) -> NavigationResult<Option<LayoutSpec>> {
        let spec = match self {
            LayoutDeclaration::Name(name) => LayoutSpec::named(name.clone()),
            LayoutDeclaration::Spec(spec) => spec.clone(),
            LayoutDeclaration::Raw(value) => normalize_raw(value, component)?,
        };
        if spec.name.is_empty() {
            return Ok(None);
        }
        Ok(Some(spec))
    }
}

fn normalize_raw(value: &Value, component: &str) -> NavigationResult<LayoutSpec> {
    let malformed = |reason: &str| NavigationError::MalformedLayout {
        component: component.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::String(name) => Ok(LayoutSpec::named(name.clone())),
        Value::Object(fields) => {
            let name = match fields.get("name") {
                Some(Value::String(name)) => name.clone(),
                Some(_) => return Err(malformed("`name` must be a string")),
                None => return Err(malformed("missing `name`")),
            };
            let props = match fields.get("props") {
                Some(Value::Object(props)) => props.clone(),
                Some(Value::Null) | None => Props::new(),
                Some(_) => return Err(malformed("`props` must be an object")),
            };
            if let Some(extra) = fields.keys().find(|k| *k != "name" && *k != "props") {
                return Err(malformed(&format!("unexpected field `{}`", extra)));
            }
            Ok(LayoutSpec { name, props })
        }
        other => Err(malformed(&format!(
            "expected a string or {{name, props}} object, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<&str> for LayoutDeclaration {
    fn from(name: &str) -> Self {
        LayoutDeclaration::Name(name.to_string())
    }
}

impl From<String> for LayoutDeclaration {
    fn from(name: String) -> Self {
        LayoutDeclaration::Name(name)
    }
}

impl From<LayoutSpec> for LayoutDeclaration {
    fn from(spec: LayoutSpec) -> Self {
        LayoutDeclaration::Spec(spec)
    }
}

/// A concrete, immutable component definition.
///
/// Definitions are shared through `Arc`; `extends` and `mixins` point at other
/// shared definitions, so the inheritance graph is immutable once built.
#[derive(Clone, Default)]
pub struct ComponentDefinition {
    name: Option<String>,
    layout: Option<LayoutDeclaration>,
    extends: Option<Arc<ComponentDefinition>>,
    mixins: Vec<Arc<ComponentDefinition>>,
    created: Option<CreatedHook>,
}

impl ComponentDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// A definition with a display name used in logs and errors.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn layout(mut self, layout: impl Into<LayoutDeclaration>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Set the layout from an untyped value, validated at resolution time.
    pub fn layout_value(mut self, value: Value) -> Self {
        self.layout = Some(LayoutDeclaration::Raw(value));
        self
    }

    pub fn extends(mut self, parent: Arc<ComponentDefinition>) -> Self {
        self.extends = Some(parent);
        self
    }

    /// Append a mixin. Earlier mixins take priority over later ones.
    pub fn mixin(mut self, mixin: Arc<ComponentDefinition>) -> Self {
        self.mixins.push(mixin);
        self
    }

    pub fn on_created(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.created = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Arc<ComponentDefinition> {
        Arc::new(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for diagnostics, `<anonymous>` when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    pub fn layout_declaration(&self) -> Option<&LayoutDeclaration> {
        self.layout.as_ref()
    }

    pub fn parent(&self) -> Option<&Arc<ComponentDefinition>> {
        self.extends.as_ref()
    }

    pub fn mixins(&self) -> &[Arc<ComponentDefinition>] {
        &self.mixins
    }

    /// Create an instance, running the initialization hook.
    pub fn instantiate(self: &Arc<Self>) -> ComponentInstance {
        if let Some(hook) = &self.created {
            hook();
        }
        tracing::trace!(component = %self.display_name(), "Component instantiated");
        ComponentInstance {
            definition: Arc::clone(self),
        }
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("extends", &self.extends.as_ref().map(|p| p.display_name().to_string()))
            .field("mixins", &self.mixins.len())
            .field("created", &self.created.is_some())
            .finish()
    }
}

/// A live instance of a component.
#[derive(Debug, Clone)]
pub struct ComponentInstance {
    definition: Arc<ComponentDefinition>,
}

impl ComponentInstance {
    pub fn definition(&self) -> &Arc<ComponentDefinition> {
        &self.definition
    }
}
