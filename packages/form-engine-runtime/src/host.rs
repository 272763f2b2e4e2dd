use std::sync::Arc;

use form_engine_core::FormData;

use crate::meta::FormMeta;

/// Callbacks a host application receives from a session.
///
/// Every method defaults to a no-op.
pub trait FormHost {
    /// Form data was replaced. The previous snapshot is never mutated, so
    /// `Arc::ptr_eq` against it detects the change.
    fn on_data_change(&mut self, _form_data: &Arc<FormData>) {}

    /// The current page changed, or (controlled sessions) a page change is
    /// requested. Multi-page sessions also report their starting page when
    /// built.
    fn on_page_change(&mut self, _index: usize, _total_pages: usize) {}

    /// The form was submitted with this snapshot.
    fn on_submit(&mut self, _form_data: &Arc<FormData>) {}

    /// Title and page summary, sent once when the session is built and
    /// again whenever it changes.
    fn on_meta_change(&mut self, _meta: &FormMeta) {}
}

impl FormHost for () {}
