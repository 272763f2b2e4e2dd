//! Schema-driven composition engine for declarative forms.
//!
//! Provides the component type registry, per-type configuration validation,
//! the condition evaluator, the rule engine and the dynamic renderer that
//! turns a schema tree plus form data into a tree of render instructions.

pub mod components;
pub mod condition;
pub mod config;
pub mod error;
pub mod registry;
pub mod render;
pub mod rules;
pub mod schema;
pub mod value;

pub use components::{form_json_schema, register_builtin_components};
pub use config::{DisplayMode, EngineConfig, FormMode};
pub use error::FormError;
pub use registry::{ComponentDefinition, ComponentKind, ComponentRegistry};
pub use render::{DynamicRenderer, FormEvent, Navigation, Props, RenderContext, RenderNode};
pub use rules::{compute_dynamic_props, DynamicPropsMap, RuleEngine};
pub use schema::{ComponentConfig, FormDocument, SchemaError, SchemaValidator};
pub use value::FormData;
