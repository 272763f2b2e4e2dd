//! Session state machine over form data and the current page.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use form_engine_core::render::Navigation;
use form_engine_core::{
    ComponentRegistry, DisplayMode, DynamicPropsMap, DynamicRenderer, EngineConfig, FormData,
    FormDocument, FormEvent, FormMode, RenderContext, RenderNode, RuleEngine,
};

use crate::host::FormHost;
use crate::meta::FormMeta;

/// Host context key selecting the form mode.
const FORM_MODE_KEY: &str = "formMode";

/// Who owns the page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageIndex {
    /// The session moves the index itself
    Uncontrolled(usize),
    /// The host owns the index; navigation is forwarded to it
    Controlled(usize),
}

impl PageIndex {
    fn get(self) -> usize {
        match self {
            PageIndex::Uncontrolled(index) | PageIndex::Controlled(index) => index,
        }
    }
}

/// Effect of a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "page", rename_all = "snake_case")]
pub enum EventOutcome {
    DataChanged,
    /// The session moved to this page
    PageChanged(usize),
    /// A controlled session asked its host to move to this page
    PageRequested(usize),
    Submitted,
    /// Out of range, already there, or not on the last page
    Ignored,
}

/// Creates an uncontrolled session with a no-op host.
///
/// # Arguments
/// * `document` - Schema document
/// * `registry` - Component types available to the renderer
/// * `initial_data` - Starting form data, empty when `None`
/// * `display` - Overrides the document's display mode
pub fn create_session(
    document: FormDocument,
    registry: ComponentRegistry,
    initial_data: Option<FormData>,
    display: Option<DisplayMode>,
) -> FormSession {
    let mut builder = FormSession::builder(document, registry);
    if let Some(data) = initial_data {
        builder = builder.initial_data(data);
    }
    if let Some(display) = display {
        builder = builder.display(display);
    }
    builder.build()
}

/// Builder for [`FormSession`].
pub struct SessionBuilder<H: FormHost = ()> {
    document: FormDocument,
    registry: ComponentRegistry,
    config: EngineConfig,
    initial_data: FormData,
    display: Option<DisplayMode>,
    controlled_page: Option<usize>,
    form_context: Map<String, Value>,
    host: H,
}

impl<H: FormHost> SessionBuilder<H> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn initial_data(mut self, data: FormData) -> Self {
        self.initial_data = data;
        self
    }

    pub fn display(mut self, display: DisplayMode) -> Self {
        self.display = Some(display);
        self
    }

    /// Makes the page index host-controlled, starting at `index`.
    pub fn controlled_page(mut self, index: usize) -> Self {
        self.controlled_page = Some(index);
        self
    }

    /// Host context for conditions and leaves. A `formMode` key selects the
    /// form mode and is not passed on.
    pub fn form_context(mut self, context: Map<String, Value>) -> Self {
        self.form_context = context;
        self
    }

    pub fn host<H2: FormHost>(self, host: H2) -> SessionBuilder<H2> {
        SessionBuilder {
            document: self.document,
            registry: self.registry,
            config: self.config,
            initial_data: self.initial_data,
            display: self.display,
            controlled_page: self.controlled_page,
            form_context: self.form_context,
            host,
        }
    }

    pub fn build(self) -> FormSession<H> {
        let rules = RuleEngine::new(&self.config);
        let dynamic_props = rules.compute(self.document.root(), &self.initial_data);
        let page = match self.controlled_page {
            Some(index) => PageIndex::Controlled(index),
            None => PageIndex::Uncontrolled(0),
        };
        let mut session = FormSession {
            document: self.document,
            registry: self.registry,
            mode: self.config.default_mode,
            config: self.config,
            rules,
            form_data: Arc::new(self.initial_data),
            dynamic_props,
            page,
            display_override: self.display,
            form_context: Map::new(),
            host: self.host,
        };
        session.set_form_context(self.form_context);
        tracing::debug!(
            title = session.document.title(),
            pages = session.total_pages(),
            multi_page = session.is_multi_page(),
            "form session created"
        );
        session.announce();
        session
    }
}

/// One live form instance.
///
/// Form data changes only through [`FormSession::on_data_change`] (and the
/// explicit [`FormSession::reset`]); each change installs a new snapshot.
pub struct FormSession<H: FormHost = ()> {
    document: FormDocument,
    registry: ComponentRegistry,
    config: EngineConfig,
    rules: RuleEngine,
    form_data: Arc<FormData>,
    dynamic_props: DynamicPropsMap,
    page: PageIndex,
    display_override: Option<DisplayMode>,
    form_context: Map<String, Value>,
    mode: FormMode,
    host: H,
}

impl FormSession {
    pub fn builder(document: FormDocument, registry: ComponentRegistry) -> SessionBuilder {
        SessionBuilder {
            document,
            registry,
            config: EngineConfig::default(),
            initial_data: FormData::new(),
            display: None,
            controlled_page: None,
            form_context: Map::new(),
            host: (),
        }
    }
}

impl<H: FormHost> FormSession<H> {
    /// Display mode in effect: session override, then document, then config.
    pub fn display_mode(&self) -> DisplayMode {
        self.display_override
            .or_else(|| self.document.display())
            .unwrap_or(self.config.default_display)
    }

    /// Multi-page only when the mode says so and there is more than one page.
    pub fn is_multi_page(&self) -> bool {
        self.display_mode() == DisplayMode::Multipage && self.document.page_count() > 1
    }

    /// Page-typed children of the root, regardless of display mode.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Pages navigated through; `1` unless the form is multi-page.
    pub fn total_pages(&self) -> usize {
        if self.is_multi_page() {
            self.document.page_count()
        } else {
            1
        }
    }

    /// Current page, clamped to the pages that exist.
    pub fn current_page_index(&self) -> usize {
        self.page.get().min(self.total_pages() - 1)
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.page, PageIndex::Controlled(_))
    }

    pub fn form_data(&self) -> &Arc<FormData> {
        &self.form_data
    }

    pub fn dynamic_props(&self) -> &DynamicPropsMap {
        &self.dynamic_props
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn form_context(&self) -> &Map<String, Value> {
        &self.form_context
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Replaces form data with a copy differing only at `field`, then
    /// recomputes dynamic props.
    pub fn on_data_change(&mut self, field: &str, value: Value) {
        let mut next = FormData::clone(&self.form_data);
        next.insert(field.to_string(), value);
        self.install(next);
        tracing::debug!(field, "form data changed");
    }

    /// Replaces all form data, e.g. to clear the form after submission.
    pub fn reset(&mut self, data: Option<FormData>) {
        self.install(data.unwrap_or_default());
        tracing::debug!("form data reset");
    }

    fn install(&mut self, data: FormData) {
        self.form_data = Arc::new(data);
        self.dynamic_props = self.rules.compute(self.document.root(), &self.form_data);
        self.host.on_data_change(&self.form_data);
    }

    pub fn on_navigate_next(&mut self) -> EventOutcome {
        let current = self.current_page_index();
        if current + 1 >= self.total_pages() {
            tracing::debug!(current, "already on the last page");
            return EventOutcome::Ignored;
        }
        self.move_to(current + 1)
    }

    pub fn on_navigate_prev(&mut self) -> EventOutcome {
        match self.current_page_index().checked_sub(1) {
            Some(target) => self.move_to(target),
            None => {
                tracing::debug!("already on the first page");
                EventOutcome::Ignored
            }
        }
    }

    /// Jumps to an arbitrary page; out-of-range indices are ignored.
    pub fn go_to_page(&mut self, index: usize) -> EventOutcome {
        if index >= self.total_pages() {
            tracing::warn!(index, total = self.total_pages(), "page index out of range");
            return EventOutcome::Ignored;
        }
        if index == self.current_page_index() {
            return EventOutcome::Ignored;
        }
        self.move_to(index)
    }

    fn move_to(&mut self, target: usize) -> EventOutcome {
        let total = self.total_pages();
        match self.page {
            PageIndex::Controlled(_) => {
                tracing::debug!(target, "forwarding page change to host");
                self.host.on_page_change(target, total);
                EventOutcome::PageRequested(target)
            }
            PageIndex::Uncontrolled(_) => {
                self.page = PageIndex::Uncontrolled(target);
                tracing::debug!(target, total, "page changed");
                self.host.on_page_change(target, total);
                let meta = self.meta();
                self.host.on_meta_change(&meta);
                EventOutcome::PageChanged(target)
            }
        }
    }

    /// Hands a freshly built session's meta, and in multi-page mode its
    /// starting page, to the host.
    fn announce(&mut self) {
        let meta = self.meta();
        self.host.on_meta_change(&meta);
        if self.is_multi_page() {
            let (current, total) = (self.current_page_index(), self.total_pages());
            self.host.on_page_change(current, total);
        }
    }

    /// Switches between a host-controlled index (`Some`) and session-owned
    /// navigation (`None`, continuing from the current page).
    pub fn set_controlled_page(&mut self, index: Option<usize>) {
        self.page = match index {
            Some(index) => PageIndex::Controlled(index),
            None => PageIndex::Uncontrolled(self.current_page_index()),
        };
    }

    pub fn set_display_mode(&mut self, display: Option<DisplayMode>) {
        self.display_override = display;
        let meta = self.meta();
        self.host.on_meta_change(&meta);
    }

    /// Replaces the host context, taking the form mode out of `formMode`.
    pub fn set_form_context(&mut self, mut context: Map<String, Value>) {
        self.mode = match context.remove(FORM_MODE_KEY) {
            None | Some(Value::Null) => self.config.default_mode,
            Some(Value::String(mode)) => mode.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "ignoring form mode from context");
                self.config.default_mode
            }),
            Some(other) => {
                tracing::warn!(value = %other, "formMode must be a string");
                self.config.default_mode
            }
        };
        self.form_context = context;
    }

    /// Submits the current snapshot to the host.
    ///
    /// Only accepted on the last page of a multi-page form; always accepted
    /// in single-page mode.
    pub fn on_submit(&mut self) -> EventOutcome {
        if self.is_multi_page() && self.current_page_index() + 1 != self.total_pages() {
            tracing::warn!(
                page = self.current_page_index(),
                total = self.total_pages(),
                "submit ignored before the last page"
            );
            return EventOutcome::Ignored;
        }
        tracing::debug!(fields = self.form_data.len(), "form submitted");
        self.host.on_submit(&self.form_data);
        EventOutcome::Submitted
    }

    /// Applies an event produced by a render binding.
    pub fn dispatch(&mut self, event: FormEvent) -> EventOutcome {
        match event {
            FormEvent::DataChange {
                field,
                value: Some(value),
            } => {
                self.on_data_change(&field, value);
                EventOutcome::DataChanged
            }
            FormEvent::DataChange { field, value: None } => {
                tracing::warn!(field = %field, "data change without a value ignored");
                EventOutcome::Ignored
            }
            FormEvent::NavigateNext => self.on_navigate_next(),
            FormEvent::NavigatePrev => self.on_navigate_prev(),
            FormEvent::GoToPage { index } => self.go_to_page(index),
            FormEvent::Submit => self.on_submit(),
        }
    }

    /// Runs a render pass over the current state.
    pub fn render(&self) -> Option<RenderNode> {
        let navigation = self.is_multi_page().then(|| Navigation {
            current_page_index: self.current_page_index(),
            total_pages: self.total_pages(),
        });
        let ctx = RenderContext::new(&self.form_data, &self.dynamic_props, &self.form_context)
            .with_mode(self.mode)
            .with_navigation(navigation);
        DynamicRenderer::new(&self.registry, &self.config).render(self.document.root(), &ctx)
    }

    pub fn meta(&self) -> FormMeta {
        let page_titles = self.document.page_titles();
        let current_page_index = self.current_page_index();
        FormMeta {
            form_title: self.document.title().to_string(),
            page_count: self.page_count(),
            current_page_title: page_titles.get(current_page_index).cloned(),
            page_titles,
            current_page_index,
        }
    }
}
