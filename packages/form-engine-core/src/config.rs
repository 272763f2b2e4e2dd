//! Engine configuration.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a paginated form is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One page at a time with next/previous navigation
    #[default]
    Multipage,
    /// Every page rendered at once
    Singlepage,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Multipage => "multipage",
            DisplayMode::Singlepage => "singlepage",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multipage" => Ok(DisplayMode::Multipage),
            "singlepage" => Ok(DisplayMode::Singlepage),
            other => Err(format!(
                "invalid display mode '{}' (expected multipage or singlepage)",
                other
            )),
        }
    }
}

/// Mode the form is shown in. Leaves use it to decide interactivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Edit,
    Preview,
    View,
    Print,
}

impl FormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Edit => "edit",
            FormMode::Preview => "preview",
            FormMode::View => "view",
            FormMode::Print => "print",
        }
    }

    /// Returns true when fields must not accept input.
    pub fn is_read_only(&self) -> bool {
        matches!(self, FormMode::View | FormMode::Print)
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(FormMode::Edit),
            "preview" => Ok(FormMode::Preview),
            "view" => Ok(FormMode::View),
            "print" => Ok(FormMode::Print),
            other => Err(format!(
                "invalid form mode '{}' (expected edit, preview, view or print)",
                other
            )),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Display mode when neither the session nor the schema names one
    pub default_display: DisplayMode,
    /// Maximum nesting depth walked by the renderer and tree validator
    pub max_depth: usize,
    /// Emit rule `log` actions as tracing events
    pub log_rule_actions: bool,
    /// Form mode when the host context carries no `formMode`
    pub default_mode: FormMode,
    /// Element id for a form root declared without one
    pub root_id: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_display: DisplayMode::Multipage,
            max_depth: 64,
            log_rule_actions: true,
            default_mode: FormMode::Edit,
            root_id: "form-engine-root".to_string(),
        }
    }
}
