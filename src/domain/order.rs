use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a local order, as carried in a webhook's correlation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Coerces a raw correlation key into an order id.
    ///
    /// Leading whitespace and an optional `+` are accepted, then the longest
    /// run of ASCII digits is read and anything after it is ignored, so
    /// `"42-shop"` resolves to order 42. Keys without leading digits, keys
    /// that overflow and the zero id are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_start();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let digits_end = unsigned
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(unsigned.len(), |(i, _)| i);

        unsigned[..digits_end]
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local order record as seen by the webhook pipeline.
///
/// The order service owns these; handlers only read them to request
/// transitions and to attach them to log context.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    /// Audit notes appended by status transitions, oldest first.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Order {
    pub fn new(id: OrderId, status: OrderStatus) -> Self {
        Self {
            id,
            status,
            notes: Vec::new(),
        }
    }
}
