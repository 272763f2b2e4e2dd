//! Rule engine: computes per-node prop overrides from form data.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::schema::{Action, Rule};
use crate::value::{strict_equals, FormData};

/// Prop overrides keyed by component id.
pub type DynamicPropsMap = BTreeMap<String, Map<String, Value>>;

/// Evaluates the `rules` declared on schema nodes.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    log_actions: bool,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self { log_actions: true }
    }
}

impl RuleEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            log_actions: config.log_rule_actions,
        }
    }

    /// Computes the dynamic props of every node in the tree.
    ///
    /// The map is rebuilt from scratch on every call. Nodes are visited in
    /// document order and rules in declaration order, so a later `set`
    /// overrides an earlier one on the same key. Malformed rules are skipped.
    ///
    /// # Arguments
    /// * `root` - Raw schema tree
    /// * `form_data` - Current form data
    pub fn compute(&self, root: &Value, form_data: &FormData) -> DynamicPropsMap {
        let mut props = DynamicPropsMap::new();
        let mut matched = 0usize;

        for node in flatten(root) {
            let Some(id) = node.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
            else {
                continue;
            };
            let Some(rules) = node.get("rules").and_then(Value::as_array) else {
                continue;
            };

            for (index, raw) in rules.iter().enumerate() {
                let rule = match Rule::parse_at(index, raw) {
                    Ok(rule) => rule,
                    Err(e) => {
                        tracing::warn!(component = id, error = %e, "skipping malformed rule");
                        continue;
                    }
                };
                if !matches(&rule, form_data) {
                    continue;
                }
                matched += 1;
                for action in &rule.then {
                    match action {
                        Action::Set(values) => {
                            let entry = props.entry(id.to_string()).or_default();
                            for (key, value) in values {
                                entry.insert(key.clone(), value.clone());
                            }
                        }
                        Action::Log(messages) if self.log_actions => {
                            tracing::info!(
                                component = id,
                                rule = index,
                                messages = ?messages,
                                "rule log"
                            );
                        }
                        Action::Log(_) => {}
                    }
                }
            }
        }

        tracing::debug!(matched, components = props.len(), "dynamic props computed");
        props
    }
}

/// Computes dynamic props with default engine settings.
pub fn compute_dynamic_props(root: &Value, form_data: &FormData) -> DynamicPropsMap {
    RuleEngine::default().compute(root, form_data)
}

/// Every clause must hold. An absent field only matches a clause without
/// `is`.
fn matches(rule: &Rule, form_data: &FormData) -> bool {
    rule.when
        .clauses()
        .iter()
        .all(|clause| match (form_data.get(&clause.field), &clause.is) {
            (Some(value), Some(expected)) => strict_equals(value, expected),
            (None, None) => true,
            _ => false,
        })
}

/// Pre-order list of every object node, root included.
fn flatten(root: &Value) -> Vec<&Map<String, Value>> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let Some(obj) = node.as_object() else {
            continue;
        };
        nodes.push(obj);
        if let Some(Value::Array(children)) = obj.get("children") {
            stack.extend(children.iter().rev());
        }
    }
    nodes
}
