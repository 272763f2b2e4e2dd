//! JSON Schema for authoring form documents.
//!
//! The document is a `form` whose `children` hold any built-in component,
//! nesting through `form` and `page`. Host-registered types have no typed
//! configuration and are left out.

use schemars::gen::{SchemaGenerator, SchemaSettings};
use schemars::JsonSchema;
use serde_json::{json, Value};

use super::fields::TEXT_LIKE;
use crate::schema::{
    CheckboxConfig, DateConfig, FieldConfig, FileConfig, FormConfig, HtmlConfig, NumberConfig,
    PageConfig, RadioGroupConfig, SelectConfig, TextConfig, TextareaConfig,
};

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
const DEFINITIONS: &str = "#/definitions/";
/// Definition holding the union of every built-in component
pub const COMPONENT_DEFINITION: &str = "Component";

/// Builds the draft-07 `FormSchema` document for the built-in components.
pub fn form_json_schema() -> Result<Value, serde_json::Error> {
    let mut generator = SchemaSettings::draft07().into_generator();

    let form = reference::<FormConfig>(&mut generator)?;
    let page = reference::<PageConfig>(&mut generator)?;
    let text = reference::<TextConfig>(&mut generator)?;

    let mut components = vec![
        ("form", form.clone()),
        ("page", page.clone()),
        ("html", reference::<HtmlConfig>(&mut generator)?),
    ];
    components.extend(TEXT_LIKE.iter().map(|name| (*name, text.clone())));
    components.extend([
        ("number", reference::<NumberConfig>(&mut generator)?),
        ("textarea", reference::<TextareaConfig>(&mut generator)?),
        ("select", reference::<SelectConfig>(&mut generator)?),
        ("radiogroup", reference::<RadioGroupConfig>(&mut generator)?),
        ("checkbox", reference::<CheckboxConfig>(&mut generator)?),
        ("date", reference::<DateConfig>(&mut generator)?),
        ("file", reference::<FileConfig>(&mut generator)?),
        ("addressValidation", reference::<FieldConfig>(&mut generator)?),
    ]);

    let mut definitions = serde_json::to_value(generator.take_definitions())?;
    let children = json!({
        "type": "array",
        "items": {"$ref": format!("{}{}", DEFINITIONS, COMPONENT_DEFINITION)}
    });
    for container in [&form, &page] {
        if let Some(properties) = definition_name(container)
            .and_then(|name| definitions.get_mut(name))
            .and_then(|schema| schema.get_mut("properties"))
            .and_then(Value::as_object_mut)
        {
            properties.insert("children".to_string(), children.clone());
        }
    }

    let variants: Vec<Value> = components
        .iter()
        .map(|(name, schema)| of_type(name, schema))
        .collect();
    if let Some(map) = definitions.as_object_mut() {
        map.insert(
            COMPONENT_DEFINITION.to_string(),
            json!({ "anyOf": variants }),
        );
    }
    tracing::debug!(types = components.len(), "form json schema generated");

    let mut root = of_type("form", &form);
    root["$schema"] = json!(DRAFT_07);
    root["title"] = json!("FormSchema");
    root["definitions"] = definitions;
    Ok(root)
}

fn reference<T: JsonSchema>(generator: &mut SchemaGenerator) -> Result<Value, serde_json::Error> {
    serde_json::to_value(generator.subschema_for::<T>())
}

fn definition_name(reference: &Value) -> Option<&str> {
    reference
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|path| path.strip_prefix(DEFINITIONS))
}

/// `schema` narrowed to nodes declaring `type: name`.
fn of_type(name: &str, schema: &Value) -> Value {
    json!({
        "allOf": [
            schema,
            {"properties": {"type": {"const": name}}, "required": ["type"]}
        ]
    })
}
