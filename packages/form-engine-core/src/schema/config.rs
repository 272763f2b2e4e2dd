//! Typed component configurations.
//!
//! A validated node is one variant of [`ComponentConfig`]. Containers keep
//! their `children` as raw JSON: each child is validated against its own
//! type only when the renderer reaches it.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SchemaError;
use super::rule::Rule;
use crate::config::DisplayMode;

/// Fields shared by every component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Visibility expression; absent means always render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

/// Field validation block. Keys other than `required` pass through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields shared by every data-bearing component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldBase {
    #[serde(flatten)]
    pub meta: NodeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldBase {
    /// Field id. Field shapes require it, so it is only empty for
    /// host-built configs that skipped validation.
    pub fn id(&self) -> &str {
        self.meta.id.as_deref().unwrap_or_default()
    }

    pub fn is_required(&self) -> bool {
        self.validation
            .as_ref()
            .and_then(|v| v.required)
            .unwrap_or(false)
    }
}

/// Root `form` container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub meta: NodeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(default)]
    pub children: Vec<Value>,
}

/// `page` container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub meta: NodeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(default)]
    pub children: Vec<Value>,
}

/// Static `html` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HtmlConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub meta: NodeMeta,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
}

/// Single-line input: `text`, `email`, `password`, `tel`, `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NumberConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextareaConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

/// One entry of a `select` or `radiogroup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RadioGroupConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
}

/// Field with nothing beyond the field base (e.g. `addressValidation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub base: FieldBase,
}

/// Host-registered type validated by its own [`ConfigShape`](super::ConfigShape).
///
/// Type-specific fields are kept verbatim in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomConfig {
    pub r#type: String,
    #[serde(flatten)]
    pub meta: NodeMeta,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A validated component configuration, one variant per component kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentConfig {
    Form(FormConfig),
    Page(PageConfig),
    Html(HtmlConfig),
    Text(TextConfig),
    Number(NumberConfig),
    Textarea(TextareaConfig),
    Select(SelectConfig),
    RadioGroup(RadioGroupConfig),
    Checkbox(CheckboxConfig),
    Date(DateConfig),
    File(FileConfig),
    Field(FieldConfig),
    Custom(CustomConfig),
}

impl ComponentConfig {
    /// The `type` the node was declared with.
    pub fn type_name(&self) -> &str {
        match self {
            ComponentConfig::Form(c) => &c.r#type,
            ComponentConfig::Page(c) => &c.r#type,
            ComponentConfig::Html(c) => &c.r#type,
            ComponentConfig::Text(c) => &c.r#type,
            ComponentConfig::Number(c) => &c.r#type,
            ComponentConfig::Textarea(c) => &c.r#type,
            ComponentConfig::Select(c) => &c.r#type,
            ComponentConfig::RadioGroup(c) => &c.r#type,
            ComponentConfig::Checkbox(c) => &c.r#type,
            ComponentConfig::Date(c) => &c.r#type,
            ComponentConfig::File(c) => &c.r#type,
            ComponentConfig::Field(c) => &c.r#type,
            ComponentConfig::Custom(c) => &c.r#type,
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        match self {
            ComponentConfig::Form(c) => &c.meta,
            ComponentConfig::Page(c) => &c.meta,
            ComponentConfig::Html(c) => &c.meta,
            ComponentConfig::Custom(c) => &c.meta,
            ComponentConfig::Text(c) => &c.base.meta,
            ComponentConfig::Number(c) => &c.base.meta,
            ComponentConfig::Textarea(c) => &c.base.meta,
            ComponentConfig::Select(c) => &c.base.meta,
            ComponentConfig::RadioGroup(c) => &c.base.meta,
            ComponentConfig::Checkbox(c) => &c.base.meta,
            ComponentConfig::Date(c) => &c.base.meta,
            ComponentConfig::File(c) => &c.base.meta,
            ComponentConfig::Field(c) => &c.base.meta,
        }
    }

    /// Field base of data-bearing variants.
    pub fn field_base(&self) -> Option<&FieldBase> {
        match self {
            ComponentConfig::Text(c) => Some(&c.base),
            ComponentConfig::Number(c) => Some(&c.base),
            ComponentConfig::Textarea(c) => Some(&c.base),
            ComponentConfig::Select(c) => Some(&c.base),
            ComponentConfig::RadioGroup(c) => Some(&c.base),
            ComponentConfig::Checkbox(c) => Some(&c.base),
            ComponentConfig::Date(c) => Some(&c.base),
            ComponentConfig::File(c) => Some(&c.base),
            ComponentConfig::Field(c) => Some(&c.base),
            ComponentConfig::Form(_)
            | ComponentConfig::Page(_)
            | ComponentConfig::Html(_)
            | ComponentConfig::Custom(_) => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.meta().hidden.unwrap_or(false)
    }

    pub fn condition(&self) -> Option<&Value> {
        self.meta().condition.as_ref()
    }

    /// Raw children of container variants.
    pub fn children(&self) -> Option<&[Value]> {
        match self {
            ComponentConfig::Form(c) => Some(&c.children),
            ComponentConfig::Page(c) => Some(&c.children),
            ComponentConfig::Custom(c) => match c.fields.get("children") {
                Some(Value::Array(children)) => Some(children),
                _ => None,
            },
            _ => None,
        }
    }

    /// Serializes the configuration back to a JSON object.
    pub fn to_map(&self) -> Result<Map<String, Value>, SchemaError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SchemaError::invalid("", "configuration is not an object")),
            Err(e) => Err(SchemaError::invalid("", e.to_string())),
        }
    }
}

/// Deserializes a shape-checked raw object into a typed configuration.
///
/// Null-valued keys are dropped first so they read as absent.
pub(crate) fn parse_typed<T: DeserializeOwned>(raw: &Map<String, Value>) -> Result<T, SchemaError> {
    let mut obj = raw.clone();
    obj.retain(|_, v| !v.is_null());
    serde_json::from_value(Value::Object(obj)).map_err(|e| SchemaError::invalid("", e.to_string()))
}
