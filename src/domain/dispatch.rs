use serde::{Deserialize, Serialize};

/// Message returned when a handler fails unexpectedly.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// The uniform outcome of dispatching one webhook event.
///
/// Serialized as-is into the HTTP response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DispatchResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn internal_error() -> Self {
        Self::failure(INTERNAL_ERROR_MESSAGE)
    }

    pub fn unhandled(event_type: &str) -> Self {
        Self::failure(format!("No handler found for event type {event_type}."))
    }
}
