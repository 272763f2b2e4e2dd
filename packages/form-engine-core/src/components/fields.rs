use serde::Serialize;
use serde_json::{Map, Value};

use super::typed_validator;
use crate::registry::{ComponentDefinition, ComponentKind, ComponentRegistry};
use crate::render::{ElementRenderer, FormEvent, Props, RenderChildren, RenderContext};
use crate::schema::{ComponentConfig, ConfigShape, FieldBase, FieldKind};

pub(super) const TEXT_LIKE: [&str; 5] = ["text", "email", "password", "tel", "url"];

/// Normalizes a field's raw configuration before validation.
///
/// A label ending in `*` loses the asterisk and the field becomes required
/// (`validation.required = true`, merged into any existing validation block).
pub fn common_field_transform(raw: &Map<String, Value>) -> Map<String, Value> {
    let mut out = raw.clone();
    let Some(Value::String(label)) = raw.get("label") else {
        return out;
    };
    let Some(stripped) = label.trim().strip_suffix('*') else {
        return out;
    };

    let mut validation = match raw.get("validation") {
        Some(Value::Object(existing)) => existing.clone(),
        None | Some(Value::Null) => Map::new(),
        // leave malformed blocks for the shape check to report
        Some(_) => return out,
    };
    validation.insert("required".to_string(), Value::Bool(true));
    out.insert("label".to_string(), Value::String(stripped.trim().to_string()));
    out.insert("validation".to_string(), Value::Object(validation));
    out
}

pub(super) fn register_field_components(registry: &ComponentRegistry) {
    for name in TEXT_LIKE {
        register_field(
            registry,
            name,
            ComponentDefinition::new(
                ComponentKind::Field,
                typed_validator(text_shape(), ComponentConfig::Text),
                ElementRenderer,
            ),
        );
    }

    register_field(
        registry,
        "number",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                ConfigShape::field()
                    .optional("placeholder", FieldKind::String)
                    .optional("defaultValue", FieldKind::Number)
                    .optional("min", FieldKind::Number)
                    .optional("max", FieldKind::Number)
                    .optional("step", FieldKind::Number),
                ComponentConfig::Number,
            ),
            ElementRenderer,
        ),
    );

    register_field(
        registry,
        "textarea",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                text_shape().optional("rows", FieldKind::PositiveInteger),
                ComponentConfig::Textarea,
            ),
            ElementRenderer,
        ),
    );

    register_field(
        registry,
        "select",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                text_shape().required("options", FieldKind::Options),
                ComponentConfig::Select,
            ),
            ElementRenderer,
        ),
    );

    register_field(
        registry,
        "radiogroup",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                ConfigShape::field()
                    .required("options", FieldKind::Options)
                    .optional("defaultValue", FieldKind::String)
                    .optional("orientation", FieldKind::OneOf(&["horizontal", "vertical"])),
                ComponentConfig::RadioGroup,
            ),
            ElementRenderer,
        ),
    );

    register_field(
        registry,
        "checkbox",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                ConfigShape::field()
                    .optional("checkboxLabel", FieldKind::String)
                    .optional("defaultValue", FieldKind::Boolean),
                ComponentConfig::Checkbox,
            ),
            ElementRenderer,
        ),
    );

    register_field(
        registry,
        "date",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                ConfigShape::field().optional("defaultValue", FieldKind::String),
                ComponentConfig::Date,
            ),
            ElementRenderer,
        ),
    );

    register_field(
        registry,
        "file",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(
                ConfigShape::field()
                    .optional("accept", FieldKind::String)
                    .optional("multiple", FieldKind::Boolean),
                ComponentConfig::File,
            ),
            ElementRenderer,
        ),
    );

    // Verification happens in the host's leaf; the engine only tracks the value.
    register_field(
        registry,
        "addressValidation",
        ComponentDefinition::new(
            ComponentKind::Field,
            typed_validator(ConfigShape::field(), ComponentConfig::Field),
            ElementRenderer,
        ),
    );
}

fn register_field(registry: &ComponentRegistry, name: &str, definition: ComponentDefinition) {
    registry.register(
        name,
        definition
            .with_transform_config(common_field_transform)
            .with_transform_props(field_props),
    );
}

fn text_shape() -> ConfigShape {
    ConfigShape::field()
        .optional("placeholder", FieldKind::String)
        .optional("defaultValue", FieldKind::String)
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Props shared by every field kind.
fn base_props(base: &FieldBase, ctx: &RenderContext<'_>) -> Props {
    let id = base.id();
    Props::new()
        .with("id", id)
        .with("name", id)
        .with_opt("label", base.label.as_deref())
        .with_opt("description", base.description.as_deref())
        .with("required", base.is_required())
        .with(
            "disabled",
            base.disabled.unwrap_or(false) || ctx.mode.is_read_only(),
        )
        .with("readOnly", base.read_only.unwrap_or(false))
        .with("onChange", FormEvent::data_change(id).binding())
}

/// Current value: form data, then the configured default, then `empty`.
fn current_value(
    id: &str,
    default: Option<Value>,
    empty: Option<Value>,
    ctx: &RenderContext<'_>,
) -> Option<Value> {
    ctx.value_of(id)
        .filter(|v| !v.is_null())
        .cloned()
        .or(default)
        .or(empty)
}

fn field_props(config: &ComponentConfig, ctx: &RenderContext<'_>, _: &dyn RenderChildren) -> Props {
    let Some(base) = config.field_base() else {
        return Props::from_config(config);
    };
    let props = base_props(base, ctx);
    let id = base.id();
    let empty_string = Some(Value::String(String::new()));

    match config {
        ComponentConfig::Text(c) => props
            .with("inputType", c.r#type.as_str())
            .with_opt("placeholder", c.placeholder.as_deref())
            .with_opt(
                "value",
                current_value(id, c.default_value.clone().map(Value::from), empty_string, ctx),
            ),
        ComponentConfig::Number(c) => props
            .with("inputType", "number")
            .with_opt("placeholder", c.placeholder.as_deref())
            .with_opt("min", c.min)
            .with_opt("max", c.max)
            .with_opt("step", c.step)
            .with_opt(
                "value",
                current_value(id, c.default_value.map(Value::from), empty_string, ctx),
            ),
        ComponentConfig::Textarea(c) => props
            .with_opt("placeholder", c.placeholder.as_deref())
            .with_opt("rows", c.rows)
            .with_opt(
                "value",
                current_value(id, c.default_value.clone().map(Value::from), empty_string, ctx),
            ),
        ComponentConfig::Select(c) => props
            .with("options", to_json(&c.options))
            .with_opt("placeholder", c.placeholder.as_deref())
            .with_opt(
                "value",
                current_value(id, c.default_value.clone().map(Value::from), None, ctx),
            ),
        ComponentConfig::RadioGroup(c) => props
            .with("options", to_json(&c.options))
            .with("orientation", to_json(&c.orientation))
            .with_opt(
                "value",
                current_value(id, c.default_value.clone().map(Value::from), None, ctx),
            ),
        ComponentConfig::Checkbox(c) => props
            .with_opt("checkboxLabel", c.checkbox_label.as_deref())
            .with_opt(
                "value",
                current_value(id, c.default_value.map(Value::from), Some(Value::Bool(false)), ctx),
            ),
        ComponentConfig::Date(c) => props.with_opt(
            "value",
            current_value(id, c.default_value.clone().map(Value::from), empty_string, ctx),
        ),
        ComponentConfig::File(c) => props
            .with_opt("accept", c.accept.as_deref())
            .with("multiple", c.multiple.unwrap_or(false))
            .with_opt("value", current_value(id, None, None, ctx)),
        _ => props.with_opt("value", current_value(id, None, None, ctx)),
    }
}
