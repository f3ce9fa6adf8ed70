use super::dispatcher::{DispatchPolicy, Dispatcher};
use super::handlers::default_handlers;
use crate::domain::ports::{EventLogRef, OrderServiceRef, Subscription, WebhookSubscriberRef};
use crate::error::{Result, WebhookError};
use std::sync::Arc;
use tracing::info;

/// Path the webhook endpoint is served under, relative to the public URL.
pub const WEBHOOK_PATH: &str = "/paypal/v1/incoming";

/// Assembles the dispatcher and keeps the provider subscription in sync
/// with the handler set.
pub struct Registrar {
    subscriber: WebhookSubscriberRef,
}

impl Registrar {
    pub fn new(subscriber: WebhookSubscriberRef) -> Self {
        Self { subscriber }
    }

    /// Builds the dispatcher over the default handler set.
    pub fn dispatcher(
        orders: OrderServiceRef,
        log: EventLogRef,
        policy: DispatchPolicy,
    ) -> Dispatcher {
        Dispatcher::with_policy(default_handlers(orders, Arc::clone(&log)), log, policy)
    }

    /// Subscribes `public_url` for every event type `dispatcher` handles.
    ///
    /// Safe to call on every start: an existing subscription for the same
    /// URL is reused, with its event types replaced when they differ from
    /// the handler set.
    pub async fn register(
        &self,
        public_url: &str,
        dispatcher: &Dispatcher,
    ) -> Result<Subscription> {
        let url = webhook_url(public_url)?;
        let event_types = dispatcher.event_types();
        let subscription = self.subscriber.subscribe(&url, &event_types).await?;

        info!(
            webhook_id = %subscription.id,
            url = %subscription.url,
            created = subscription.created,
            updated = subscription.updated,
            event_types = event_types.len(),
            "Webhook subscription active"
        );
        Ok(subscription)
    }

    pub async fn unregister(&self, webhook_id: &str) -> Result<()> {
        self.subscriber.unsubscribe(webhook_id).await?;
        info!(webhook_id, "Webhook subscription removed");
        Ok(())
    }
}

/// Joins the public base URL with [`WEBHOOK_PATH`].
///
/// The provider only delivers to HTTPS endpoints; plain HTTP is accepted for
/// local tunnels and tests.
pub fn webhook_url(public_url: &str) -> Result<String> {
    let base = public_url.trim().trim_end_matches('/');
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(WebhookError::Config(format!(
            "public URL must start with http:// or https://, got '{public_url}'"
        )));
    }
    if base.ends_with(WEBHOOK_PATH) {
        return Ok(base.to_string());
    }
    Ok(format!("{base}{WEBHOOK_PATH}"))
}
