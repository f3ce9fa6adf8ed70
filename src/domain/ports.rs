use super::order::{Order, OrderId, OrderStatus};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Access to the order records webhooks act upon.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Returns every order matching the correlation key. Usually zero or one.
    async fn find_by_correlation_id(&self, id: OrderId) -> Result<Vec<Order>>;
    /// Moves `order` to `status`, recording `note` on its audit trail.
    async fn transition(&self, order: &Order, status: OrderStatus, note: &str) -> Result<()>;
}

pub type OrderServiceRef = Arc<dyn OrderService>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Leveled, structured log sink handed to handlers and the dispatcher.
pub trait EventLog: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, context: &Value);
}

pub type EventLogRef = Arc<dyn EventLog>;

/// A webhook subscription held at the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub url: String,
    /// `false` when an existing subscription for the same URL was reused.
    pub created: bool,
    /// `true` when a reused subscription's event types had to be replaced.
    pub updated: bool,
}

/// Administrative access to the provider's webhook subscriptions.
#[async_trait]
pub trait WebhookSubscriber: Send + Sync {
    async fn subscribe(&self, url: &str, event_types: &BTreeSet<String>) -> Result<Subscription>;
    async fn unsubscribe(&self, webhook_id: &str) -> Result<()>;
}

pub type WebhookSubscriberRef = Arc<dyn WebhookSubscriber>;
