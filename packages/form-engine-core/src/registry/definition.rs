use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::render::{ElementRenderer, LeafRenderer, Props, RenderChildren, RenderContext};
use crate::schema::{parse_typed, ComponentConfig, ConfigShape, CustomConfig, SchemaError};

/// Broad category of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Holds `children`
    Container,
    /// Holds a form-data value; needs a unique, non-empty id
    Field,
    /// Neither holds data nor children
    Static,
}

/// Validates the raw configuration of one component type.
pub trait ConfigValidator: Send + Sync {
    /// Parses a raw node into its typed configuration.
    ///
    /// Error paths are relative to the node.
    fn validate(&self, raw: &Map<String, Value>) -> Result<ComponentConfig, SchemaError>;
}

impl<F> ConfigValidator for F
where
    F: Fn(&Map<String, Value>) -> Result<ComponentConfig, SchemaError> + Send + Sync,
{
    fn validate(&self, raw: &Map<String, Value>) -> Result<ComponentConfig, SchemaError> {
        self(raw)
    }
}

/// Pre-validation normalizer. Returns a new object; the input is untouched.
pub type TransformConfigFn = Arc<dyn Fn(&Map<String, Value>) -> Map<String, Value> + Send + Sync>;

/// Post-validation adapter computing the leaf renderer's arguments.
pub type TransformPropsFn =
    Arc<dyn Fn(&ComponentConfig, &RenderContext<'_>, &dyn RenderChildren) -> Props + Send + Sync>;

/// Everything the engine knows about one component type.
#[derive(Clone)]
pub struct ComponentDefinition {
    kind: ComponentKind,
    validator: Arc<dyn ConfigValidator>,
    renderer: Arc<dyn LeafRenderer>,
    transform_config: Option<TransformConfigFn>,
    transform_props: Option<TransformPropsFn>,
}

impl ComponentDefinition {
    /// Creates a definition from a validator and a leaf renderer.
    ///
    /// # Arguments
    /// * `kind` - Component category
    /// * `validator` - Per-type configuration validator
    /// * `renderer` - Leaf renderer invoked with the final props
    pub fn new(
        kind: ComponentKind,
        validator: impl ConfigValidator + 'static,
        renderer: impl LeafRenderer + 'static,
    ) -> Self {
        Self {
            kind,
            validator: Arc::new(validator),
            renderer: Arc::new(renderer),
            transform_config: None,
            transform_props: None,
        }
    }

    /// Creates a definition for a host type described only by its shape.
    ///
    /// Validated nodes become [`ComponentConfig::Custom`] and render through
    /// the [`ElementRenderer`].
    pub fn from_shape(kind: ComponentKind, shape: ConfigShape) -> Self {
        let validator = move |raw: &Map<String, Value>| -> Result<ComponentConfig, SchemaError> {
            shape.validate(raw)?;
            parse_typed::<CustomConfig>(raw).map(ComponentConfig::Custom)
        };
        Self::new(kind, validator, ElementRenderer)
    }

    /// Replaces the leaf renderer.
    pub fn with_renderer(mut self, renderer: impl LeafRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_transform_config<F>(mut self, f: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.transform_config = Some(Arc::new(f));
        self
    }

    pub fn with_transform_props<F>(mut self, f: F) -> Self
    where
        F: Fn(&ComponentConfig, &RenderContext<'_>, &dyn RenderChildren) -> Props
            + Send
            + Sync
            + 'static,
    {
        self.transform_props = Some(Arc::new(f));
        self
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn validator(&self) -> &dyn ConfigValidator {
        self.validator.as_ref()
    }

    pub fn renderer(&self) -> &dyn LeafRenderer {
        self.renderer.as_ref()
    }

    pub fn transform_config(&self) -> Option<&TransformConfigFn> {
        self.transform_config.as_ref()
    }

    pub fn transform_props(&self) -> Option<&TransformPropsFn> {
        self.transform_props.as_ref()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("kind", &self.kind)
            .field("transform_config", &self.transform_config.is_some())
            .field("transform_props", &self.transform_props.is_some())
            .finish_non_exhaustive()
    }
}
