use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SchemaError;

/// Declarative `when`/`then` rule attached to the node it affects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    pub when: When,
    pub then: Vec<Action>,
}

/// Trigger of a rule: a single clause or a list of clauses that must all hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum When {
    All(Vec<Clause>),
    One(Clause),
}

impl When {
    pub fn clauses(&self) -> &[Clause] {
        match self {
            When::All(clauses) => clauses,
            When::One(clause) => std::slice::from_ref(clause),
        }
    }
}

/// True iff the form-data value at `field` strictly equals `is`.
///
/// Without `is` the clause holds exactly when `field` is absent from the
/// form data. `is: null` only matches a field explicitly set to null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clause {
    pub field: String,
    #[serde(
        default,
        deserialize_with = "crate::value::present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Value>")]
    pub is: Option<Value>,
}

/// Effect of a matched rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Merge these keys into the node's dynamic props
    Set(Map<String, Value>),
    /// Diagnostic messages, no state effect
    Log(Vec<String>),
}

impl Rule {
    /// Parses the rule at position `index` of a node's `rules` array.
    ///
    /// Error paths are relative to the node (`rules[1].then`).
    pub fn parse_at(index: usize, raw: &Value) -> Result<Rule, SchemaError> {
        let base = format!("rules[{}]", index);
        let obj = raw
            .as_object()
            .ok_or_else(|| SchemaError::invalid(&base, "Expected object"))?;

        let when = obj
            .get("when")
            .ok_or_else(|| SchemaError::invalid(format!("{}.when", base), "Required"))?;
        match when {
            Value::Array(clauses) if clauses.is_empty() => {
                return Err(SchemaError::invalid(
                    format!("{}.when", base),
                    "A rule must have at least one condition in its 'when' clause.",
                ));
            }
            Value::Array(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    check_clause(&format!("{}.when[{}]", base, i), clause)?;
                }
            }
            other => check_clause(&format!("{}.when", base), other)?,
        }

        match obj.get("then") {
            Some(Value::Array(actions)) if actions.is_empty() => {
                return Err(SchemaError::invalid(
                    format!("{}.then", base),
                    "A rule must have at least one action in its 'then' clause.",
                ));
            }
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(SchemaError::invalid(
                    format!("{}.then", base),
                    "Expected array",
                ))
            }
            None => return Err(SchemaError::invalid(format!("{}.then", base), "Required")),
        }

        serde_json::from_value(raw.clone())
            .map_err(|e| SchemaError::invalid(format!("{}.then", base), e.to_string()))
    }

    /// Parses a node's whole `rules` array, failing on the first malformed rule.
    pub fn parse_list(raw: &Value) -> Result<Vec<Rule>, SchemaError> {
        let items = raw
            .as_array()
            .ok_or_else(|| SchemaError::invalid("rules", "Expected array"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Rule::parse_at(i, item))
            .collect()
    }
}

fn check_clause(path: &str, raw: &Value) -> Result<(), SchemaError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SchemaError::invalid(path, "Expected object"))?;
    match obj.get("field") {
        Some(Value::String(field)) if !field.is_empty() => Ok(()),
        Some(Value::String(_)) => Err(SchemaError::invalid(
            format!("{}.field", path),
            "String must contain at least 1 character(s)",
        )),
        Some(_) => Err(SchemaError::invalid(
            format!("{}.field", path),
            "Expected string",
        )),
        None => Err(SchemaError::invalid(format!("{}.field", path), "Required")),
    }
}
