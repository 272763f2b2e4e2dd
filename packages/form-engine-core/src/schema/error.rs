use thiserror::Error;

/// Structural failure of a single component configuration.
///
/// Every variant carries the path of the failing value. Paths produced by a
/// per-type validator are relative to the node; the renderer and the tree
/// validator prefix them with the node's position in the tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Node is not an object or has no string `type`
    #[error("Invalid component configuration or missing type at '{path}'")]
    MissingType { path: String },

    /// No definition registered for the type
    #[error("Component type \"{type_name}\" not registered (at '{path}')")]
    UnknownType { path: String, type_name: String },

    /// A field failed its per-type check
    #[error("Invalid value at '{path}': {reason}")]
    InvalidField { path: String, reason: String },

    /// Two unconditional nodes share an id
    #[error("Duplicate component id '{id}' at '{path}' (first declared at '{first}')")]
    DuplicateId {
        id: String,
        path: String,
        first: String,
    },

    /// Data-bearing node without an id
    #[error("Data-bearing component at '{path}' has no id")]
    MissingId { path: String },

    /// Rule overrides produced a configuration the type rejects
    #[error("Dynamic props for '{id}' rejected at '{path}': {reason}")]
    OverrideRejected {
        id: String,
        path: String,
        reason: String,
    },

    /// Tree nested deeper than the configured maximum
    #[error("Nesting deeper than {max} levels at '{path}'")]
    TooDeep { path: String, max: usize },
}

impl SchemaError {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidField {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the path of the failing value.
    pub fn path(&self) -> &str {
        match self {
            SchemaError::MissingType { path }
            | SchemaError::UnknownType { path, .. }
            | SchemaError::InvalidField { path, .. }
            | SchemaError::DuplicateId { path, .. }
            | SchemaError::MissingId { path }
            | SchemaError::OverrideRejected { path, .. }
            | SchemaError::TooDeep { path, .. } => path,
        }
    }

    /// Prefixes the path with the position of the node it was raised for.
    pub fn at(mut self, prefix: &str) -> Self {
        let path = match &mut self {
            SchemaError::MissingType { path }
            | SchemaError::UnknownType { path, .. }
            | SchemaError::InvalidField { path, .. }
            | SchemaError::DuplicateId { path, .. }
            | SchemaError::MissingId { path }
            | SchemaError::OverrideRejected { path, .. }
            | SchemaError::TooDeep { path, .. } => path,
        };
        *path = join_path(prefix, path);
        self
    }
}

/// Joins two dotted paths, omitting the dot before an index segment.
pub(crate) fn join_path(prefix: &str, suffix: &str) -> String {
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) if suffix.starts_with('[') => format!("{}{}", prefix, suffix),
        (false, false) => format!("{}.{}", prefix, suffix),
    }
}
