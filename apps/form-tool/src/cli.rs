use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use form_engine_core::{DisplayMode, EngineConfig, FormMode};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `form_engine_core=trace`
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags mapped onto [`EngineConfig`].
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Maximum nesting depth before a node renders a fallback
    #[arg(long, global = true, default_value_t = 64)]
    pub max_depth: usize,

    /// Element id for a form root declared without one
    #[arg(long, global = true, default_value = "form-engine-root")]
    pub root_id: String,

    /// Suppress rule `log` actions
    #[arg(long, global = true)]
    pub quiet_rules: bool,
}

impl EngineArgs {
    pub fn to_config(&self) -> EngineConfig {
        EngineConfig {
            max_depth: self.max_depth,
            root_id: self.root_id.clone(),
            log_rule_actions: !self.quiet_rules,
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every node of a schema document
    Validate {
        /// Schema file (.yaml, .yml or .json)
        schema: PathBuf,
    },

    /// Print form title and pagination as JSON
    Meta {
        schema: PathBuf,

        /// Override the document's display mode
        #[arg(long)]
        display: Option<DisplayMode>,
    },

    /// Render the schema against form data and print the render tree
    Render {
        schema: PathBuf,

        /// JSON object with form data
        #[arg(long)]
        data: Option<PathBuf>,

        /// Page to render in multi-page mode
        #[arg(long)]
        page: Option<usize>,

        #[arg(long)]
        display: Option<DisplayMode>,

        /// edit, preview, view or print
        #[arg(long)]
        mode: Option<FormMode>,

        /// JSON object passed to conditions as `context`
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Print the JSON Schema describing form documents
    Schema {
        /// Write the schema here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Apply a JSON array of form events to a fresh session
    Replay {
        schema: PathBuf,

        /// JSON array of events, e.g. `[{"event": "navigate_next"}]`
        events: PathBuf,

        /// Initial form data
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long)]
        display: Option<DisplayMode>,
    },
}
