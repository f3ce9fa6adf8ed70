#![allow(dead_code)]

use async_trait::async_trait;
use order_webhooks::application::handler::EventHandler;
use order_webhooks::domain::dispatch::DispatchResult;
use order_webhooks::domain::event::IncomingEvent;
use order_webhooks::domain::order::{Order, OrderId, OrderStatus};
use order_webhooks::domain::ports::{EventLog, LogLevel, OrderService};
use order_webhooks::error::{Result, WebhookError};
use order_webhooks::infrastructure::in_memory::InMemoryOrderService;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub context: Value,
}

/// Event log that keeps every entry for assertions.
#[derive(Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }
}

impl EventLog for RecordingLog {
    fn log(&self, level: LogLevel, message: &str, context: &Value) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
            context: context.clone(),
        });
    }
}

/// Order service that records transition calls and can be switched into
/// failure mode to simulate a storage outage.
#[derive(Default)]
pub struct RecordingOrderService {
    inner: InMemoryOrderService,
    transitions: Mutex<Vec<(OrderId, OrderStatus, String)>>,
    offline: AtomicBool,
}

impl RecordingOrderService {
    pub async fn with_orders(orders: Vec<Order>) -> Self {
        let service = Self::default();
        for order in orders {
            service.inner.insert(order).await;
        }
        service
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn transitions(&self) -> Vec<(OrderId, OrderStatus, String)> {
        self.transitions.lock().unwrap().clone()
    }

    pub async fn order(&self, id: u64) -> Option<Order> {
        self.inner.get(OrderId(id)).await
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(WebhookError::OrderService("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderService for RecordingOrderService {
    async fn find_by_correlation_id(&self, id: OrderId) -> Result<Vec<Order>> {
        self.check_online()?;
        self.inner.find_by_correlation_id(id).await
    }

    async fn transition(&self, order: &Order, status: OrderStatus, note: &str) -> Result<()> {
        self.check_online()?;
        self.transitions
            .lock()
            .unwrap()
            .push((order.id, status, note.to_string()));
        self.inner.transition(order, status, note).await
    }
}

/// Order service where every correlation key resolves to the same set of
/// orders, as when one payment covers a parent order and its sub-orders.
/// Transitioning `fail_on` errors.
pub struct SharedKeyOrderService {
    orders: Vec<Order>,
    fail_on: Option<OrderId>,
    transitions: Mutex<Vec<(OrderId, OrderStatus, String)>>,
}

impl SharedKeyOrderService {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            fail_on: None,
            transitions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, id: u64) -> Self {
        self.fail_on = Some(OrderId(id));
        self
    }

    pub fn transitions(&self) -> Vec<(OrderId, OrderStatus, String)> {
        self.transitions.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderService for SharedKeyOrderService {
    async fn find_by_correlation_id(&self, _id: OrderId) -> Result<Vec<Order>> {
        Ok(self.orders.clone())
    }

    async fn transition(&self, order: &Order, status: OrderStatus, note: &str) -> Result<()> {
        if self.fail_on == Some(order.id) {
            return Err(WebhookError::OrderService(format!("order {} is locked", order.id)));
        }
        self.transitions
            .lock()
            .unwrap()
            .push((order.id, status, note.to_string()));
        Ok(())
    }
}

/// Handler that only counts invocations.
pub struct CountingHandler {
    event_type: &'static str,
    calls: AtomicUsize,
}

impl CountingHandler {
    pub fn new(event_type: &'static str) -> Self {
        Self {
            event_type,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventHandler for CountingHandler {
    fn event_type(&self) -> &str {
        self.event_type
    }

    async fn handle_request(&self, _event: &IncomingEvent) -> Result<DispatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DispatchResult::ok())
    }
}

pub fn refund_event(custom_id: Option<&str>) -> IncomingEvent {
    let event = IncomingEvent::new("PAYMENT.CAPTURE.REFUNDED")
        .with_id("WH-58D329510W468432D-8HN650336L201105X")
        .with_resource(json!({
            "id": "1Y107995YT783435V",
            "status": "COMPLETED",
            "amount": { "currency_code": "USD", "value": "10.00" }
        }));
    match custom_id {
        Some(id) => event.with_custom_id(id),
        None => event,
    }
}

pub fn refund_payload(custom_id: &str) -> Value {
    json!({
        "id": "WH-58D329510W468432D-8HN650336L201105X",
        "event_type": "PAYMENT.CAPTURE.REFUNDED",
        "custom_id": custom_id,
        "resource": { "id": "1Y107995YT783435V", "status": "COMPLETED" }
    })
}
