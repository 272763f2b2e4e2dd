//! Render instructions and the dynamic renderer that produces them.

mod event;
mod renderer;

pub use event::FormEvent;
pub use renderer::DynamicRenderer;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::FormMode;
use crate::rules::DynamicPropsMap;
use crate::schema::{ComponentConfig, SchemaError};
use crate::value::FormData;

/// Output of a render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Element(Element),
    /// Inline diagnostic rendered where a failing node would have been
    Fallback(Fallback),
}

/// A component with its final props and rendered children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub component: String,
    pub props: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fallback {
    /// Position of the failing node (`children[0].children[2]`)
    pub path: String,
    pub message: String,
    /// Offending raw configuration
    pub config: Value,
    #[serde(skip)]
    pub error: SchemaError,
}

impl RenderNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            RenderNode::Element(element) => Some(element),
            RenderNode::Fallback(_) => None,
        }
    }

    pub fn as_fallback(&self) -> Option<&Fallback> {
        match self {
            RenderNode::Fallback(fallback) => Some(fallback),
            RenderNode::Element(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RenderNode::Fallback(_))
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element(element) => &element.children,
            RenderNode::Fallback(_) => &[],
        }
    }

    /// Value of the element's `id` prop.
    pub fn id(&self) -> Option<&str> {
        self.as_element()?.props.get("id")?.as_str()
    }

    /// Every node of the tree in document order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }

    /// Finds the element whose `id` prop equals `id`.
    pub fn find(&self, id: &str) -> Option<&Element> {
        self.iter()
            .find(|node| node.id() == Some(id))
            .and_then(RenderNode::as_element)
    }
}

/// Arguments handed to a leaf renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    pub values: Map<String, Value>,
    pub children: Vec<RenderNode>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props holding the configuration's own fields, minus `children`.
    pub fn from_config(config: &ComponentConfig) -> Self {
        let mut values = config.to_map().unwrap_or_default();
        values.remove("children");
        Self {
            values,
            children: Vec::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` when `value` is present.
    pub fn with_opt<T: Into<Value>>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn with_children(mut self, children: Vec<RenderNode>) -> Self {
        self.children = children;
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Produces the host-level output for one component.
///
/// Returning `None` renders nothing at this position.
pub trait LeafRenderer: Send + Sync {
    fn render(&self, component: &str, props: Props) -> Option<RenderNode>;
}

impl<F> LeafRenderer for F
where
    F: Fn(&str, Props) -> Option<RenderNode> + Send + Sync,
{
    fn render(&self, component: &str, props: Props) -> Option<RenderNode> {
        self(component, props)
    }
}

/// Default leaf renderer: emits the props as an [`Element`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementRenderer;

impl LeafRenderer for ElementRenderer {
    fn render(&self, component: &str, props: Props) -> Option<RenderNode> {
        Some(RenderNode::Element(Element {
            component: component.to_string(),
            props: props.values,
            children: props.children,
        }))
    }
}

/// Renders children through the same pipeline as their parent.
pub trait RenderChildren {
    /// Renders the child at `index` of the current node's `children`.
    fn render_child(&self, index: usize, child: &Value) -> Option<RenderNode>;

    /// Renders every child, dropping those that render nothing.
    fn render_children(&self, children: &[Value]) -> Vec<RenderNode> {
        children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| self.render_child(index, child))
            .collect()
    }
}

/// Page state of a multi-page form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub current_page_index: usize,
    pub total_pages: usize,
}

impl Navigation {
    pub fn is_first_page(&self) -> bool {
        self.current_page_index == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page_index >= self.total_pages.saturating_sub(1)
    }
}

/// Read-only inputs of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub form_data: &'a FormData,
    pub dynamic_props: &'a DynamicPropsMap,
    /// Host-supplied context (e.g. user role)
    pub form_context: &'a Map<String, Value>,
    pub mode: FormMode,
    /// Present only in multi-page mode
    pub navigation: Option<Navigation>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        form_data: &'a FormData,
        dynamic_props: &'a DynamicPropsMap,
        form_context: &'a Map<String, Value>,
    ) -> Self {
        Self {
            form_data,
            dynamic_props,
            form_context,
            mode: FormMode::default(),
            navigation: None,
        }
    }

    pub fn with_mode(mut self, mode: FormMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_navigation(mut self, navigation: Option<Navigation>) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn value_of(&self, field: &str) -> Option<&'a Value> {
        self.form_data.get(field)
    }
}
