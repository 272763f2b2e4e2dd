use std::path::Path;

use serde_json::Value;

use super::validator::{SchemaValidator, TreeReport};
use crate::config::{DisplayMode, EngineConfig};
use crate::error::FormError;
use crate::registry::ComponentRegistry;

const DEFAULT_TITLE: &str = "Untitled Form";

/// A schema document: a raw component tree whose root is a `form`.
///
/// Only the root is checked on load; nodes below it are validated when
/// rendered, or all at once through [`FormDocument::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormDocument {
    root: Value,
}

impl FormDocument {
    /// Wraps an already parsed tree.
    pub fn from_value(root: Value) -> Result<Self, FormError> {
        let obj = root
            .as_object()
            .ok_or_else(|| FormError::InvalidRoot("root must be an object".to_string()))?;
        match obj.get("type").and_then(Value::as_str) {
            Some("form") => Ok(Self { root }),
            Some(other) => Err(FormError::InvalidRoot(format!(
                "root type must be \"form\", found \"{}\"",
                other
            ))),
            None => Err(FormError::InvalidRoot(
                "root has no string `type`".to_string(),
            )),
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, FormError> {
        let root: Value = serde_yaml::from_str(source)?;
        Self::from_value(root)
    }

    pub fn from_json_str(source: &str) -> Result<Self, FormError> {
        let root: Value = serde_json::from_str(source)?;
        Self::from_value(root)
    }

    /// Loads a document from disk, picking the parser from the extension.
    ///
    /// # Arguments
    /// * `path` - `.yaml`, `.yml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !matches!(extension.as_str(), "yaml" | "yml" | "json") {
            return Err(FormError::UnsupportedFormat(path.display().to_string()));
        }

        let source = std::fs::read_to_string(path).map_err(|source| FormError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loading schema document");

        if extension == "json" {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Eagerly validates the whole tree.
    pub fn validate(&self, registry: &ComponentRegistry, config: &EngineConfig) -> TreeReport {
        SchemaValidator::new(registry, config).validate_tree(&self.root)
    }

    /// Like [`FormDocument::validate`] but fails on the first report with errors.
    pub fn validate_strict(
        &self,
        registry: &ComponentRegistry,
        config: &EngineConfig,
    ) -> Result<(), FormError> {
        self.validate(registry, config).into_result()
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    /// Form title, `Untitled Form` when absent.
    pub fn title(&self) -> &str {
        self.root
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Display mode declared on the root; unknown values read as absent.
    pub fn display(&self) -> Option<DisplayMode> {
        self.root
            .get("display")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Immediate children of the root whose type is `page`.
    pub fn pages(&self) -> Vec<&Value> {
        self.root
            .get("children")
            .and_then(Value::as_array)
            .map(|children| children.iter().filter(|c| is_page(c)).collect())
            .unwrap_or_default()
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Page titles in order; untitled pages read `Page N` (1-based).
    pub fn page_titles(&self) -> Vec<String> {
        self.pages()
            .iter()
            .enumerate()
            .map(|(i, page)| match page.get("title").and_then(Value::as_str) {
                Some(title) => title.to_string(),
                None => format!("Page {}", i + 1),
            })
            .collect()
    }
}

/// Returns true when a raw node is a `page`.
pub(crate) fn is_page(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some("page")
}
