use super::handler::EventHandlerRef;
use crate::domain::dispatch::DispatchResult;
use crate::domain::event::IncomingEvent;
use crate::domain::ports::{EventLogRef, LogLevel};
use serde_json::json;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Tunables for how the dispatcher treats unmatched and failing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Upper bound on a single handler invocation, collaborator calls included.
    pub handler_timeout: Duration,
    /// Event-log level for events no handler claims. `None` only traces them
    /// at debug level.
    pub unhandled_log_level: Option<LogLevel>,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            handler_timeout: Duration::from_secs(10),
            unhandled_log_level: None,
        }
    }
}

/// How a dispatch ended. Collapses to a [`DispatchResult`] for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion, successfully or not.
    Handled {
        event_type: String,
        result: DispatchResult,
    },
    /// No registered handler claimed the event.
    Unhandled { result: DispatchResult },
    /// The handler returned an error, panicked or timed out.
    Failed { event_type: String, reason: String },
}

impl DispatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn into_result(self) -> DispatchResult {
        match self {
            Self::Handled { result, .. } | Self::Unhandled { result } => result,
            Self::Failed { .. } => DispatchResult::internal_error(),
        }
    }
}

/// Routes each event to the first registered handler that claims it.
pub struct Dispatcher {
    handlers: Vec<EventHandlerRef>,
    log: EventLogRef,
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(handlers: Vec<EventHandlerRef>, log: EventLogRef) -> Self {
        Self::with_policy(handlers, log, DispatchPolicy::default())
    }

    /// Builds a dispatcher over `handlers` in the given order.
    ///
    /// Several handlers may claim the same event type. The first one
    /// registered wins and later ones are reported as shadowed.
    pub fn with_policy(
        handlers: Vec<EventHandlerRef>,
        log: EventLogRef,
        policy: DispatchPolicy,
    ) -> Self {
        let mut seen = HashSet::new();
        for (position, handler) in handlers.iter().enumerate() {
            if !seen.insert(handler.event_type().to_string()) {
                warn!(
                    event_type = handler.event_type(),
                    position,
                    "Handler is shadowed by an earlier registration for the same event type"
                );
            }
        }

        Self {
            handlers,
            log,
            policy,
        }
    }

    pub fn handlers(&self) -> &[EventHandlerRef] {
        &self.handlers
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// The distinct event types claimed by the registered handlers.
    pub fn event_types(&self) -> BTreeSet<String> {
        self.handlers
            .iter()
            .map(|handler| handler.event_type().to_string())
            .collect()
    }

    pub async fn dispatch(&self, event: &IncomingEvent) -> DispatchResult {
        self.route(event).await.into_result()
    }

    /// Selects and runs the responsible handler.
    ///
    /// The handler runs on its own task so that a panic or an overrun of
    /// [`DispatchPolicy::handler_timeout`] is contained here and reported as
    /// [`DispatchOutcome::Failed`].
    #[instrument(skip_all, fields(event_type = %event.event_type, delivery_id = ?event.id))]
    pub async fn route(&self, event: &IncomingEvent) -> DispatchOutcome {
        let Some(handler) = self
            .handlers
            .iter()
            .find(|handler| handler.responsible_for_request(event))
        else {
            debug!("No handler responsible for webhook event");
            let result = DispatchResult::unhandled(&event.event_type);
            if let Some(level) = self.policy.unhandled_log_level {
                self.log.log(
                    level,
                    result.message.as_deref().unwrap_or_default(),
                    &json!({ "request": event }),
                );
            }
            return DispatchOutcome::Unhandled { result };
        };

        let event_type = handler.event_type().to_string();
        let mut task = {
            let handler = Arc::clone(handler);
            let event = event.clone();
            tokio::spawn(async move { handler.handle_request(&event).await })
        };

        let reason = match tokio::time::timeout(self.policy.handler_timeout, &mut task).await {
            Ok(Ok(Ok(result))) => {
                debug!(success = result.success, "Webhook handler finished");
                return DispatchOutcome::Handled { event_type, result };
            }
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(e)) if e.is_panic() => "handler panicked".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => {
                task.abort();
                format!(
                    "handler timed out after {}ms",
                    self.policy.handler_timeout.as_millis()
                )
            }
        };

        self.log.log(
            LogLevel::Error,
            &format!("Webhook handler for {event_type} failed: {reason}"),
            &json!({ "request": event }),
        );
        DispatchOutcome::Failed { event_type, reason }
    }
}
