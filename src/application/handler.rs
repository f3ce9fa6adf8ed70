use crate::domain::dispatch::DispatchResult;
use crate::domain::event::IncomingEvent;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Logic for one provider event type.
///
/// Implementations must be safe to share between concurrent deliveries and
/// must not keep per-invocation state on `self`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// The exact provider event type this handler claims.
    fn event_type(&self) -> &str;

    /// Whether this handler should process `event`.
    ///
    /// Matches on the event type by default. Implementations may inspect the
    /// resource as well.
    fn responsible_for_request(&self, event: &IncomingEvent) -> bool {
        event.event_type == self.event_type()
    }

    /// Applies the event to the domain.
    ///
    /// Expected failures (missing correlation key, unknown order) are
    /// reported as an unsuccessful [`DispatchResult`]. `Err` is reserved for
    /// collaborator failures.
    async fn handle_request(&self, event: &IncomingEvent) -> Result<DispatchResult>;
}

pub type EventHandlerRef = Arc<dyn EventHandler>;
