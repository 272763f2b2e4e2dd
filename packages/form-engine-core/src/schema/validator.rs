use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::config::ComponentConfig;
use super::error::SchemaError;
use super::path::NodePath;
use crate::config::EngineConfig;
use crate::error::FormError;
use crate::registry::{ComponentDefinition, ComponentKind, ComponentRegistry};

/// A node that passed its type's validator.
#[derive(Debug, Clone)]
pub struct ValidatedNode {
    pub definition: Arc<ComponentDefinition>,
    pub config: ComponentConfig,
    /// Dynamic props with no place in the typed configuration; handed to the
    /// leaf renderer on top of the computed props
    pub extra: Map<String, Value>,
}

/// Outcome of an eager whole-tree validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeReport {
    pub errors: Vec<SchemaError>,
    pub nodes_checked: usize,
}

impl TreeReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), FormError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(self.errors))
        }
    }
}

/// Validates raw nodes against the types registered for them.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'r> {
    registry: &'r ComponentRegistry,
    max_depth: usize,
}

impl<'r> SchemaValidator<'r> {
    pub fn new(registry: &'r ComponentRegistry, config: &EngineConfig) -> Self {
        Self {
            registry,
            max_depth: config.max_depth,
        }
    }

    /// Validates a single raw node. Children are not visited.
    ///
    /// # Arguments
    /// * `raw` - Raw configuration node
    ///
    /// # Returns
    /// The typed configuration with its definition, or an error whose path is
    /// relative to the node.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedNode, SchemaError> {
        let (obj, type_name) = type_of(raw)?;
        let definition = self
            .registry
            .lookup(type_name)
            .ok_or_else(|| SchemaError::UnknownType {
                path: String::new(),
                type_name: type_name.to_string(),
            })?;

        let prepared = match definition.transform_config() {
            Some(transform) => Cow::Owned(transform(obj)),
            None => Cow::Borrowed(obj),
        };
        let config = definition.validator().validate(&prepared)?;
        check_type_matches(&config, type_name)?;

        Ok(ValidatedNode {
            definition,
            config,
            extra: Map::new(),
        })
    }

    /// Merges dynamic props over a validated node and re-validates the result.
    ///
    /// Overrides are applied after `transformConfig`, so they are not
    /// normalized again. Keys the typed configuration does not model are
    /// kept in [`ValidatedNode::extra`].
    pub fn apply_overrides(
        &self,
        node: &ValidatedNode,
        overrides: &Map<String, Value>,
    ) -> Result<ValidatedNode, SchemaError> {
        let id = node.config.id().unwrap_or_default().to_string();
        let rejected = |e: SchemaError| SchemaError::OverrideRejected {
            id: id.clone(),
            path: e.path().to_string(),
            reason: e.to_string(),
        };

        let mut merged = node.config.to_map().map_err(rejected)?;
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }

        let config = node
            .definition
            .validator()
            .validate(&merged)
            .map_err(rejected)?;
        check_type_matches(&config, node.config.type_name()).map_err(rejected)?;

        let modeled = config.to_map().map_err(rejected)?;
        let extra = overrides
            .iter()
            .filter(|(key, _)| !modeled.contains_key(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(ValidatedNode {
            definition: Arc::clone(&node.definition),
            config,
            extra,
        })
    }

    /// Validates every node of a raw tree, collecting all failures.
    ///
    /// Besides per-node checks, field-kind nodes must carry a non-empty id,
    /// and ids must be unique among nodes that render unconditionally (no
    /// `condition` on the node or any ancestor).
    pub fn validate_tree(&self, root: &Value) -> TreeReport {
        let mut walk = TreeWalk {
            validator: self,
            report: TreeReport::default(),
            seen: HashMap::new(),
        };
        walk.visit(root, &NodePath::root(), true);

        tracing::debug!(
            nodes = walk.report.nodes_checked,
            errors = walk.report.errors.len(),
            "schema tree validated"
        );
        walk.report
    }
}

/// Extracts the object and its `type`; a missing, empty or non-string type
/// is a root-level error.
fn type_of(raw: &Value) -> Result<(&Map<String, Value>, &str), SchemaError> {
    let missing = || SchemaError::MissingType {
        path: String::new(),
    };
    let obj = raw.as_object().ok_or_else(missing)?;
    match obj.get("type") {
        Some(Value::String(t)) if !t.is_empty() => Ok((obj, t.as_str())),
        _ => Err(missing()),
    }
}

fn check_type_matches(config: &ComponentConfig, expected: &str) -> Result<(), SchemaError> {
    if config.type_name() == expected {
        Ok(())
    } else {
        Err(SchemaError::invalid(
            "type",
            format!(
                "Expected type \"{}\", received \"{}\"",
                expected,
                config.type_name()
            ),
        ))
    }
}

struct TreeWalk<'a, 'r> {
    validator: &'a SchemaValidator<'r>,
    report: TreeReport,
    /// id -> path of its first unconditional declaration
    seen: HashMap<String, String>,
}

impl TreeWalk<'_, '_> {
    fn visit(&mut self, raw: &Value, path: &NodePath, unconditional: bool) {
        self.report.nodes_checked += 1;
        let at = path.to_string();

        if path.level() > self.validator.max_depth {
            self.report.errors.push(SchemaError::TooDeep {
                path: at,
                max: self.validator.max_depth,
            });
            return;
        }

        let unconditional = unconditional
            && raw
                .get("condition")
                .map_or(true, |condition| condition.is_null());

        let validated = match self.validator.validate(raw) {
            Ok(node) => node,
            Err(e) => {
                self.report.errors.push(e.at(&at));
                // Keep walking so errors further down are reported too
                if let Some(Value::Array(children)) = raw.get("children") {
                    self.visit_children(children, path, unconditional);
                }
                return;
            }
        };

        let id = validated.config.id().filter(|id| !id.is_empty());
        if validated.definition.kind() == ComponentKind::Field && id.is_none() {
            self.report.errors.push(SchemaError::MissingId { path: at.clone() });
        }
        if let (Some(id), true) = (id, unconditional) {
            match self.seen.get(id) {
                Some(first) => self.report.errors.push(SchemaError::DuplicateId {
                    id: id.to_string(),
                    path: at.clone(),
                    first: first.clone(),
                }),
                None => {
                    self.seen.insert(id.to_string(), at.clone());
                }
            }
        }

        if let Some(children) = validated.config.children() {
            self.visit_children(children, path, unconditional);
        }
    }

    fn visit_children(&mut self, children: &[Value], path: &NodePath, unconditional: bool) {
        for (index, child) in children.iter().enumerate() {
            self.visit(child, &path.child(index), unconditional);
        }
    }
}
