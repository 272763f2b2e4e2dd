use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A host-to-session event.
///
/// Render props carry these as serialized bindings (`onChange`,
/// `onNavigateNext`, ...). The host fills in any payload and dispatches the
/// event back to the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    /// A field value changed. Bindings omit `value`; a dispatched event
    /// must carry one, `null` included.
    DataChange {
        field: String,
        #[serde(
            default,
            deserialize_with = "crate::value::present",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<Value>,
    },
    NavigateNext,
    NavigatePrev,
    GoToPage { index: usize },
    Submit,
}

impl FormEvent {
    /// Binding for a field's change handler.
    pub fn data_change(field: impl Into<String>) -> Self {
        FormEvent::DataChange {
            field: field.into(),
            value: None,
        }
    }

    /// Serializes the event for embedding in render props.
    pub fn binding(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
