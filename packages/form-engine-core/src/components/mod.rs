//! Built-in component types.

mod fields;
mod json_schema;
mod layout;

pub use fields::common_field_transform;
pub use json_schema::{form_json_schema, COMPONENT_DEFINITION};
pub use layout::VOID_ELEMENTS;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::registry::{ComponentRegistry, ConfigValidator};
use crate::schema::{parse_typed, ComponentConfig, ConfigShape, SchemaError};

/// Registers the stock component types.
///
/// Existing registrations of the same names are replaced, so hosts that
/// want to override a stock type register theirs afterwards.
pub fn register_builtin_components(registry: &ComponentRegistry) {
    layout::register_layout_components(registry);
    fields::register_field_components(registry);
    tracing::debug!(types = registry.len(), "built-in components registered");
}

/// Validator checking `shape` first, then parsing into `T`.
fn typed_validator<T, F>(shape: ConfigShape, wrap: F) -> impl ConfigValidator
where
    T: DeserializeOwned,
    F: Fn(T) -> ComponentConfig + Send + Sync + 'static,
{
    move |raw: &Map<String, Value>| -> Result<ComponentConfig, SchemaError> {
        shape.validate(raw)?;
        parse_typed::<T>(raw).map(&wrap)
    }
}
