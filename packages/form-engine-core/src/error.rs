//! Document-level error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaError;

/// Errors raised while loading or strictly validating a schema document.
///
/// Node-level problems found during a render pass never surface here; they
/// become inline fallbacks instead.
#[derive(Error, Debug)]
pub enum FormError {
    /// Schema file could not be read
    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension does not name a supported format
    #[error("Unsupported schema format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// Root node is not a form
    #[error("Invalid schema root: {0}")]
    InvalidRoot(String),

    /// Eager tree validation found errors
    #[error("Schema validation failed with {} error(s)", .0.len())]
    Invalid(Vec<SchemaError>),
}
