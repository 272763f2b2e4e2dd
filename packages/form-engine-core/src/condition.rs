//! Visibility conditions.
//!
//! A condition is a JSON logic tree: an object with exactly one operator key
//! whose value is the operand list. Variables resolve against
//! `{ formData, context }`, so `{"var": "formData.age"}` reads a field and
//! `{"var": "context.role"}` reads the host context.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::value::{is_truthy, loose_equals, strict_equals, to_number, FormData};

/// Reasons a condition cannot be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum ConditionError {
    #[error("unrecognized operator '{0}'")]
    UnknownOperator(String),

    #[error("expression object must hold exactly one operator, found {0} keys")]
    Malformed(usize),

    #[error("operator '{op}' expects {expected} operand(s), got {got}")]
    Arity {
        op: String,
        expected: &'static str,
        got: usize,
    },

    #[error("invalid variable reference: {0}")]
    InvalidVar(String),
}

/// Evaluates a condition against form data and host context.
///
/// An absent or null condition is true. Evaluation never fails: a malformed
/// expression logs a warning and reads as false.
pub fn evaluate(
    condition: Option<&Value>,
    form_data: &FormData,
    context: &Map<String, Value>,
) -> bool {
    let expr = match condition {
        None | Some(Value::Null) => return true,
        Some(expr) => expr,
    };
    let scope = Scope { form_data, context };
    match scope.apply(expr) {
        Ok(result) => is_truthy(&result),
        Err(e) => {
            tracing::warn!(
                error = %e,
                condition = %expr,
                "condition evaluation failed, treating as false"
            );
            false
        }
    }
}

struct Scope<'a> {
    form_data: &'a FormData,
    context: &'a Map<String, Value>,
}

impl Scope<'_> {
    fn apply(&self, expr: &Value) -> Result<Value, ConditionError> {
        match expr {
            Value::Object(obj) => {
                if obj.len() != 1 {
                    return Err(ConditionError::Malformed(obj.len()));
                }
                match obj.iter().next() {
                    Some((op, args)) => self.operate(op, operands(args)),
                    None => Err(ConditionError::Malformed(0)),
                }
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.apply(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            literal => Ok(literal.clone()),
        }
    }

    fn operate(&self, op: &str, args: &[Value]) -> Result<Value, ConditionError> {
        match op {
            "var" => self.var(args),
            "missing" => self.missing(args),
            "==" | "!=" | "===" | "!==" => {
                let [a, b] = self.pair(op, args)?;
                let equal = if op.len() == 3 {
                    strict_equals(&a, &b)
                } else {
                    loose_equals(&a, &b)
                };
                Ok(Value::Bool(equal == op.starts_with('=')))
            }
            "!" | "!!" => {
                let first = match args.first() {
                    Some(arg) => self.apply(arg)?,
                    None => Value::Null,
                };
                Ok(Value::Bool(is_truthy(&first) == (op == "!!")))
            }
            "and" | "or" => {
                let mut last = Value::Null;
                for arg in args {
                    last = self.apply(arg)?;
                    // short-circuit on the first decisive operand
                    if is_truthy(&last) == (op == "or") {
                        break;
                    }
                }
                Ok(last)
            }
            "if" | "?:" => {
                let mut rest = args;
                while let [cond, then, tail @ ..] = rest {
                    if is_truthy(&self.apply(cond)?) {
                        return self.apply(then);
                    }
                    rest = tail;
                }
                match rest {
                    [otherwise] => self.apply(otherwise),
                    _ => Ok(Value::Null),
                }
            }
            "<" | "<=" | ">" | ">=" => self.compare(op, args),
            "in" => {
                let [needle, haystack] = self.pair(op, args)?;
                let found = match (&needle, &haystack) {
                    (Value::String(n), Value::String(h)) => h.contains(n.as_str()),
                    (_, Value::Array(items)) => items.iter().any(|i| strict_equals(i, &needle)),
                    _ => false,
                };
                Ok(Value::Bool(found))
            }
            other => Err(ConditionError::UnknownOperator(other.to_string())),
        }
    }

    fn pair(&self, op: &str, args: &[Value]) -> Result<[Value; 2], ConditionError> {
        match args {
            [a, b] => Ok([self.apply(a)?, self.apply(b)?]),
            _ => Err(ConditionError::Arity {
                op: op.to_string(),
                expected: "2",
                got: args.len(),
            }),
        }
    }

    /// `<` and `<=` also accept three operands: `a < b < c`.
    fn compare(&self, op: &str, args: &[Value]) -> Result<Value, ConditionError> {
        let between = matches!(op, "<" | "<=") && args.len() == 3;
        if args.len() != 2 && !between {
            return Err(ConditionError::Arity {
                op: op.to_string(),
                expected: if matches!(op, "<" | "<=") { "2 or 3" } else { "2" },
                got: args.len(),
            });
        }
        let values = args
            .iter()
            .map(|arg| self.apply(arg).map(|v| to_number(&v)))
            .collect::<Result<Vec<_>, _>>()?;
        let holds = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => match op {
                "<" => a < b,
                "<=" => a <= b,
                ">" => a > b,
                _ => a >= b,
            },
            _ => false,
        };
        Ok(Value::Bool(
            values.windows(2).all(|pair| holds(pair[0], pair[1])),
        ))
    }

    fn var(&self, args: &[Value]) -> Result<Value, ConditionError> {
        let (path, default) = match args {
            [] => (Value::String(String::new()), Value::Null),
            [path] => (self.apply(path)?, Value::Null),
            [path, default, ..] => (self.apply(path)?, self.apply(default)?),
        };
        let path = match path {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
            other => return Err(ConditionError::InvalidVar(other.to_string())),
        };
        Ok(self.lookup(&path).unwrap_or(default))
    }

    fn missing(&self, args: &[Value]) -> Result<Value, ConditionError> {
        let keys = match args {
            [Value::Array(keys)] => keys.as_slice(),
            keys => keys,
        };
        let mut absent = Vec::new();
        for key in keys {
            let key = self.apply(key)?;
            let path = match &key {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            match self.lookup(&path) {
                None | Some(Value::Null) => absent.push(key),
                Some(Value::String(s)) if s.is_empty() => absent.push(key),
                Some(_) => {}
            }
        }
        Ok(Value::Array(absent))
    }

    /// Resolves a dotted path; numeric segments index arrays.
    fn lookup(&self, path: &str) -> Option<Value> {
        if path.is_empty() {
            let mut data = Map::new();
            data.insert("formData".to_string(), Value::Object(self.form_data.clone()));
            data.insert("context".to_string(), Value::Object(self.context.clone()));
            return Some(Value::Object(data));
        }

        let mut segments = path.split('.');
        let root = match segments.next() {
            Some("formData") => self.form_data,
            Some("context") => self.context,
            _ => return None,
        };
        let mut current = match segments.next() {
            Some(key) => root.get(key)?,
            None => return Some(Value::Object(root.clone())),
        };
        for segment in segments {
            current = match current {
                Value::Object(obj) => obj.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }
}

/// Operands of an operator; a lone value is a one-element list.
fn operands(args: &Value) -> &[Value] {
    match args {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    }
}
