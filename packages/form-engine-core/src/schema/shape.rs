//! Declarative field requirements for a component configuration.

use serde_json::{Map, Value};

use super::error::SchemaError;
use super::rule::Rule;
use crate::value::value_type;

/// Expected shape of a single configuration field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    /// String with at least one character
    NonEmptyString,
    Number,
    /// Integer greater than zero
    PositiveInteger,
    Boolean,
    Object,
    Array,
    Any,
    /// String restricted to the listed values
    OneOf(&'static [&'static str]),
    /// Array of `{value, label, disabled?}` choice options
    Options,
    /// `{required?: bool, ...}` validation block
    Validation,
    /// Array of `when`/`then` rules
    Rules,
}

/// Requirement for one configuration field.
#[derive(Debug, Clone)]
pub struct FieldRequirement {
    /// Field name
    pub name: String,
    /// Expected kind
    pub kind: FieldKind,
    /// Whether the field must be present
    pub required: bool,
}

/// Field requirements of a component type.
///
/// Fields not listed are accepted and left untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigShape {
    fields: Vec<FieldRequirement>,
}

impl ConfigShape {
    /// Creates an empty shape.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Fields every component accepts.
    pub fn node() -> Self {
        Self::new()
            .required("type", FieldKind::NonEmptyString)
            .optional("id", FieldKind::String)
            .optional("condition", FieldKind::Any)
            .optional("rules", FieldKind::Rules)
            .optional("hidden", FieldKind::Boolean)
    }

    /// Fields of a container holding `children`.
    pub fn container() -> Self {
        Self::node().optional("children", FieldKind::Array)
    }

    /// Fields of a data-bearing component; `id` becomes mandatory.
    pub fn field() -> Self {
        Self::node()
            .required("id", FieldKind::NonEmptyString)
            .optional("label", FieldKind::String)
            .optional("description", FieldKind::String)
            .optional("disabled", FieldKind::Boolean)
            .optional("readOnly", FieldKind::Boolean)
            .optional("validation", FieldKind::Validation)
    }

    /// Adds a required field, replacing any earlier requirement of the same name.
    pub fn required(self, name: &str, kind: FieldKind) -> Self {
        self.with(name, kind, true)
    }

    /// Adds an optional field, replacing any earlier requirement of the same name.
    pub fn optional(self, name: &str, kind: FieldKind) -> Self {
        self.with(name, kind, false)
    }

    fn with(mut self, name: &str, kind: FieldKind, required: bool) -> Self {
        let req = FieldRequirement {
            name: name.to_string(),
            kind,
            required,
        };
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => *existing = req,
            None => self.fields.push(req),
        }
        self
    }

    pub fn fields(&self) -> &[FieldRequirement] {
        &self.fields
    }

    /// Validates a raw configuration object against this shape.
    ///
    /// # Arguments
    /// * `obj` - Raw configuration of one node
    ///
    /// # Returns
    /// `Ok(())` if every requirement holds, otherwise the first failure with
    /// a node-relative path.
    pub fn validate(&self, obj: &Map<String, Value>) -> Result<(), SchemaError> {
        for req in &self.fields {
            match obj.get(&req.name) {
                // Explicit null counts as absent for optional fields
                Some(Value::Null) if !req.required => {}
                Some(v) => check_kind(&req.name, &req.kind, v)?,
                None => {
                    if req.required {
                        return Err(SchemaError::invalid(&req.name, "Required"));
                    }
                }
            }
        }
        Ok(())
    }
}

fn expected(path: &str, expected: &str, got: &Value) -> SchemaError {
    SchemaError::invalid(
        path,
        format!("Expected {}, received {}", expected, value_type(got)),
    )
}

fn check_kind(path: &str, kind: &FieldKind, v: &Value) -> Result<(), SchemaError> {
    match kind {
        FieldKind::String if !v.is_string() => Err(expected(path, "string", v)),
        FieldKind::NonEmptyString => match v.as_str() {
            Some("") => Err(SchemaError::invalid(
                path,
                "String must contain at least 1 character(s)",
            )),
            Some(_) => Ok(()),
            None => Err(expected(path, "string", v)),
        },
        FieldKind::Number if !v.is_number() => Err(expected(path, "number", v)),
        FieldKind::PositiveInteger => match v.as_u64() {
            Some(n) if n > 0 => Ok(()),
            _ if v.is_number() => Err(SchemaError::invalid(
                path,
                "Expected a positive integer",
            )),
            _ => Err(expected(path, "number", v)),
        },
        FieldKind::Boolean if !v.is_boolean() => Err(expected(path, "boolean", v)),
        FieldKind::Object if !v.is_object() => Err(expected(path, "object", v)),
        FieldKind::Array if !v.is_array() => Err(expected(path, "array", v)),
        FieldKind::OneOf(allowed) => match v.as_str() {
            Some(s) if allowed.contains(&s) => Ok(()),
            Some(s) => Err(SchemaError::invalid(
                path,
                format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    allowed
                        .iter()
                        .map(|a| format!("'{}'", a))
                        .collect::<Vec<_>>()
                        .join(" | "),
                    s
                ),
            )),
            None => Err(expected(path, "string", v)),
        },
        FieldKind::Options => check_options(path, v),
        FieldKind::Validation => {
            let obj = v.as_object().ok_or_else(|| expected(path, "object", v))?;
            match obj.get("required") {
                Some(r) if !r.is_boolean() => {
                    Err(expected(&format!("{}.required", path), "boolean", r))
                }
                _ => Ok(()),
            }
        }
        FieldKind::Rules => Rule::parse_list(v).map(|_| ()),
        _ => Ok(()),
    }
}

fn check_options(path: &str, v: &Value) -> Result<(), SchemaError> {
    let options = v.as_array().ok_or_else(|| expected(path, "array", v))?;
    for (i, option) in options.iter().enumerate() {
        let item_path = format!("{}[{}]", path, i);
        let obj = option
            .as_object()
            .ok_or_else(|| expected(&item_path, "object", option))?;
        for key in ["value", "label"] {
            match obj.get(key) {
                Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(expected(&format!("{}.{}", item_path, key), "string", other))
                }
                None => {
                    return Err(SchemaError::invalid(
                        format!("{}.{}", item_path, key),
                        "Required",
                    ))
                }
            }
        }
        if let Some(disabled) = obj.get("disabled") {
            if !disabled.is_boolean() {
                return Err(expected(
                    &format!("{}.disabled", item_path),
                    "boolean",
                    disabled,
                ));
            }
        }
    }
    Ok(())
}
