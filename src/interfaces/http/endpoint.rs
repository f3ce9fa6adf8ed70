//! Webhook reception endpoint.
//!
//! Every payload that parses as an event is acknowledged with HTTP 200 and
//! the dispatch envelope, whatever the business outcome. Acknowledging
//! understood-but-unactionable events (unknown order, unhandled type) keeps
//! the provider from retrying them.

use crate::application::dispatcher::Dispatcher;
use crate::domain::dispatch::DispatchResult;
use crate::domain::event::IncomingEvent;
use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP status used when a handler fails unexpectedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureStatus {
    /// Answer 200 so the provider does not retry.
    #[default]
    Acknowledge,
    /// Answer 500 so the provider retries the delivery later.
    ServerError,
}

impl FailureStatus {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Acknowledge => StatusCode::OK,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub failure_status: FailureStatus,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            failure_status: FailureStatus::default(),
        }
    }

    pub fn with_failure_status(mut self, failure_status: FailureStatus) -> Self {
        self.failure_status = failure_status;
        self
    }
}

/// Receives one webhook delivery and dispatches it.
///
/// Bodies that are not a JSON event object are rejected with 400.
pub async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<DispatchResult>) {
    let event: IncomingEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, bytes = body.len(), "Rejected malformed webhook payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(DispatchResult::failure(format!("Invalid webhook payload: {e}"))),
            );
        }
    };

    let outcome = state.dispatcher.route(&event).await;
    let status = if outcome.is_failed() {
        state.failure_status.status_code()
    } else {
        StatusCode::OK
    };
    let result = outcome.into_result();

    info!(
        event_type = %event.event_type,
        delivery_id = ?event.id,
        success = result.success,
        status = status.as_u16(),
        "Webhook processed"
    );
    (status, Json(result))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
