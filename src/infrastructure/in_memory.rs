use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::OrderService;
use crate::error::{Result, WebhookError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order service.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` to allow shared concurrent access.
/// Ideal for testing or deployments where orders are seeded at startup.
#[derive(Default, Clone)]
pub struct InMemoryOrderService {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderService {
    /// Creates a new, empty in-memory order service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an order.
    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
    }

    pub async fn get(&self, id: OrderId) -> Option<Order> {
        let orders = self.orders.read().await;
        orders.get(&id).cloned()
    }

    /// All orders sorted by id.
    pub async fn all(&self) -> Vec<Order> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by_key(|order| order.id);
        all
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn find_by_correlation_id(&self, id: OrderId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).into_iter().cloned().collect())
    }

    async fn transition(&self, order: &Order, status: OrderStatus, note: &str) -> Result<()> {
        let mut orders = self.orders.write().await;
        let stored = orders.get_mut(&order.id).ok_or_else(|| {
            WebhookError::OrderService(format!("Order {} disappeared before transition", order.id))
        })?;
        stored.status = status;
        stored.notes.push(note.to_string());
        Ok(())
    }
}
