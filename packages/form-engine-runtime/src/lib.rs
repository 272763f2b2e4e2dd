//! Form session controller.
//!
//! Owns the mutable state of one form instance (form data, current page)
//! and re-runs the rule engine whenever form data changes.

mod host;
mod meta;
mod session;

pub use host::FormHost;
pub use meta::FormMeta;
pub use session::{create_session, EventOutcome, FormSession, SessionBuilder};

pub use form_engine_core::{FormEvent, RenderNode};
