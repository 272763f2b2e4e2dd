//! Subcommand implementations. Each returns the value `main` prints.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use form_engine_core::{
    form_json_schema, ComponentRegistry, DisplayMode, EngineConfig, FormData, FormDocument,
    FormMode, RenderNode,
};
use form_engine_runtime::{
    EventOutcome, FormEvent, FormHost, FormMeta, FormSession, SessionBuilder,
};

/// Outcome of `validate`.
#[derive(Debug)]
pub struct Validation {
    pub nodes_checked: usize,
    /// One line per error; each message names its path
    pub errors: Vec<String>,
}

pub fn validate(schema: &Path, config: &EngineConfig) -> Result<Validation> {
    let document = FormDocument::from_path(schema)?;
    let registry = ComponentRegistry::with_builtins();
    let report = document.validate(&registry, config);
    Ok(Validation {
        nodes_checked: report.nodes_checked,
        errors: report.errors.iter().map(ToString::to_string).collect(),
    })
}

pub fn meta(
    schema: &Path,
    config: &EngineConfig,
    display: Option<DisplayMode>,
) -> Result<FormMeta> {
    let session = session_builder(schema, config, display)?.build();
    Ok(session.meta())
}

#[derive(Debug, Default)]
pub struct RenderOptions {
    pub data: Option<PathBuf>,
    pub page: Option<usize>,
    pub display: Option<DisplayMode>,
    pub mode: Option<FormMode>,
    pub context: Option<PathBuf>,
}

/// Renders one pass. A hidden root renders as `null`.
pub fn render(
    schema: &Path,
    config: &EngineConfig,
    options: &RenderOptions,
) -> Result<Option<RenderNode>> {
    let mut context = match &options.context {
        Some(path) => read_object(path, "context")?,
        None => Map::new(),
    };
    if let Some(mode) = options.mode {
        context.insert("formMode".to_string(), Value::String(mode.to_string()));
    }

    let mut builder = session_builder(schema, config, options.display)?.form_context(context);
    if let Some(path) = &options.data {
        builder = builder.initial_data(read_object(path, "form data")?);
    }
    if let Some(page) = options.page {
        builder = builder.controlled_page(page);
    }
    let session = builder.build();
    if let Some(page) = options.page {
        if page >= session.total_pages() {
            tracing::warn!(
                page,
                total = session.total_pages(),
                "rendering the last page instead"
            );
        }
    }
    Ok(session.render())
}

/// Builds the authoring schema, also writing it to `out` when given.
pub fn schema(out: Option<&Path>) -> Result<Value> {
    let schema = form_json_schema().context("generating the form JSON schema")?;
    if let Some(path) = out {
        let mut pretty = serde_json::to_string_pretty(&schema)?;
        pretty.push('\n');
        fs::write(path, pretty)
            .with_context(|| format!("writing schema to '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "form schema written");
    }
    Ok(schema)
}

/// Host recording what a replayed session hands back.
#[derive(Debug, Default)]
struct ReplayHost {
    submissions: Vec<Arc<FormData>>,
    page_changes: usize,
}

impl FormHost for ReplayHost {
    fn on_page_change(&mut self, _index: usize, _total_pages: usize) {
        self.page_changes += 1;
    }

    fn on_submit(&mut self, form_data: &Arc<FormData>) {
        self.submissions.push(Arc::clone(form_data));
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub outcomes: Vec<EventOutcome>,
    pub form_data: FormData,
    pub current_page_index: usize,
    pub page_changes: usize,
    pub submissions: Vec<FormData>,
}

pub fn replay(
    schema: &Path,
    events: &Path,
    config: &EngineConfig,
    data: Option<&Path>,
    display: Option<DisplayMode>,
) -> Result<ReplayReport> {
    let raw = fs::read_to_string(events)
        .with_context(|| format!("reading events from '{}'", events.display()))?;
    let events: Vec<FormEvent> = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' must hold a JSON array of events", events.display()))?;

    let mut builder = session_builder(schema, config, display)?;
    if let Some(path) = data {
        builder = builder.initial_data(read_object(path, "form data")?);
    }
    let mut session: FormSession<ReplayHost> = builder.host(ReplayHost::default()).build();

    let outcomes: Vec<EventOutcome> = events
        .into_iter()
        .map(|event| session.dispatch(event))
        .collect();
    tracing::debug!(events = outcomes.len(), "replay finished");

    let host = session.host();
    Ok(ReplayReport {
        form_data: FormData::clone(session.form_data()),
        current_page_index: session.current_page_index(),
        page_changes: host.page_changes,
        submissions: host
            .submissions
            .iter()
            .map(|snapshot| FormData::clone(snapshot))
            .collect(),
        outcomes,
    })
}

fn session_builder(
    schema: &Path,
    config: &EngineConfig,
    display: Option<DisplayMode>,
) -> Result<SessionBuilder> {
    let document = FormDocument::from_path(schema)?;
    let builder = FormSession::builder(document, ComponentRegistry::with_builtins())
        .config(config.clone());
    Ok(match display {
        Some(display) => builder.display(display),
        None => builder,
    })
}

fn read_object(path: &Path, what: &str) -> Result<Map<String, Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {} from '{}'", what, path.display()))?;
    match serde_json::from_str::<Value>(&raw)
        .with_context(|| format!("parsing {} in '{}'", what, path.display()))?
    {
        Value::Object(map) => Ok(map),
        other => bail!(
            "{} in '{}' must be a JSON object, found {}",
            what,
            path.display(),
            form_engine_core::value::value_type(&other)
        ),
    }
}
