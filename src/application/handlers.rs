use super::handler::{EventHandler, EventHandlerRef};
use crate::domain::dispatch::DispatchResult;
use crate::domain::event::{CorrelationSource, IncomingEvent};
use crate::domain::order::OrderStatus;
use crate::domain::ports::{EventLogRef, LogLevel, OrderServiceRef};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Describes how one provider event type maps onto an order status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub event_type: &'static str,
    pub target: OrderStatus,
    /// Audit note recorded with the transition.
    pub note: &'static str,
    pub source: CorrelationSource,
    /// Noun naming the provider resource in the not-found message.
    pub subject: &'static str,
    /// Statuses an order must currently have to be transitioned. Empty
    /// accepts every status.
    pub eligible: &'static [OrderStatus],
}

pub const CHECKOUT_ORDER_COMPLETED: TransitionRule = TransitionRule {
    event_type: "CHECKOUT.ORDER.COMPLETED",
    target: OrderStatus::Processing,
    note: "Payment received.",
    source: CorrelationSource::PurchaseUnits,
    subject: "checkout",
    eligible: &[OrderStatus::Pending, OrderStatus::OnHold],
};

pub const PAYMENT_CAPTURE_REFUNDED: TransitionRule = TransitionRule {
    event_type: "PAYMENT.CAPTURE.REFUNDED",
    target: OrderStatus::Refunded,
    note: "Payment Refunded.",
    source: CorrelationSource::TopLevel,
    subject: "refund",
    eligible: &[],
};

pub const PAYMENT_CAPTURE_REVERSED: TransitionRule = TransitionRule {
    event_type: "PAYMENT.CAPTURE.REVERSED",
    target: OrderStatus::Cancelled,
    note: "Payment Reversed.",
    source: CorrelationSource::TopLevel,
    subject: "reversal",
    eligible: &[],
};

/// Handler that validates the correlation key, resolves the matching orders
/// and moves each of them to the rule's target status.
pub struct OrderTransitionHandler {
    rule: TransitionRule,
    orders: OrderServiceRef,
    log: EventLogRef,
}

impl OrderTransitionHandler {
    pub fn new(rule: TransitionRule, orders: OrderServiceRef, log: EventLogRef) -> Self {
        Self { rule, orders, log }
    }

    pub fn checkout_order_completed(orders: OrderServiceRef, log: EventLogRef) -> Self {
        Self::new(CHECKOUT_ORDER_COMPLETED, orders, log)
    }

    pub fn payment_capture_refunded(orders: OrderServiceRef, log: EventLogRef) -> Self {
        Self::new(PAYMENT_CAPTURE_REFUNDED, orders, log)
    }

    pub fn payment_capture_reversed(orders: OrderServiceRef, log: EventLogRef) -> Self {
        Self::new(PAYMENT_CAPTURE_REVERSED, orders, log)
    }

    pub fn rule(&self) -> &TransitionRule {
        &self.rule
    }

    fn reject(&self, message: String, event: &IncomingEvent) -> DispatchResult {
        self.log
            .log(LogLevel::Warning, &message, &json!({ "request": event }));
        DispatchResult::failure(message)
    }
}

#[async_trait]
impl EventHandler for OrderTransitionHandler {
    fn event_type(&self) -> &str {
        self.rule.event_type
    }

    async fn handle_request(&self, event: &IncomingEvent) -> Result<DispatchResult> {
        let Some(order_id) = event.correlation_key(self.rule.source) else {
            let message = format!(
                "No order for webhook event {} was found.",
                event.id.as_deref().unwrap_or_default()
            );
            return Ok(self.reject(message, event));
        };

        let orders = self.orders.find_by_correlation_id(order_id).await?;
        if orders.is_empty() {
            let message = format!(
                "Order for {} {} not found.",
                self.rule.subject,
                event.resource_id().unwrap_or_default()
            );
            return Ok(self.reject(message, event));
        }

        let mut updated = 0;
        for order in &orders {
            if !self.rule.eligible.is_empty() && !self.rule.eligible.contains(&order.status) {
                self.log.log(
                    LogLevel::Info,
                    &format!(
                        "Order {} skipped: status {} cannot move to {}",
                        order.id, order.status, self.rule.target
                    ),
                    &json!({ "request": event, "order": order }),
                );
                continue;
            }

            self.orders
                .transition(order, self.rule.target, self.rule.note)
                .await?;
            self.log.log(
                LogLevel::Info,
                &format!("Order {} has been updated through PayPal", order.id),
                &json!({ "request": event, "order": order }),
            );
            updated += 1;
        }

        // Every match was skipped; each skip is already logged.
        if updated == 0 {
            return Ok(DispatchResult::failure(format!(
                "No order for {} {} could move to {}.",
                self.rule.subject,
                event.resource_id().unwrap_or_default(),
                self.rule.target
            )));
        }
        Ok(DispatchResult::ok())
    }
}

/// The handler set registered by default, in dispatch order.
pub fn default_handlers(orders: OrderServiceRef, log: EventLogRef) -> Vec<EventHandlerRef> {
    vec![
        Arc::new(OrderTransitionHandler::checkout_order_completed(
            Arc::clone(&orders),
            Arc::clone(&log),
        )),
        Arc::new(OrderTransitionHandler::payment_capture_refunded(
            Arc::clone(&orders),
            Arc::clone(&log),
        )),
        Arc::new(OrderTransitionHandler::payment_capture_reversed(orders, log)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Order, OrderId};
    use crate::domain::ports::EventLog;
    use crate::infrastructure::in_memory::InMemoryOrderService;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLog {
        entries: Mutex<Vec<(LogLevel, String, Value)>>,
    }

    impl RecordingLog {
        fn levels(&self) -> Vec<LogLevel> {
            self.entries.lock().unwrap().iter().map(|e| e.0).collect()
        }

        fn messages(&self) -> Vec<String> {
            self.entries.lock().unwrap().iter().map(|e| e.1.clone()).collect()
        }
    }

    impl EventLog for RecordingLog {
        fn log(&self, level: LogLevel, message: &str, context: &Value) {
            self.entries
                .lock()
                .unwrap()
                .push((level, message.to_string(), context.clone()));
        }
    }

    async fn setup(orders: Vec<Order>) -> (Arc<InMemoryOrderService>, Arc<RecordingLog>) {
        let store = Arc::new(InMemoryOrderService::new());
        for order in orders {
            store.insert(order).await;
        }
        (store, Arc::new(RecordingLog::default()))
    }

    fn refund_event(custom_id: Option<&str>) -> IncomingEvent {
        let event = IncomingEvent::new("PAYMENT.CAPTURE.REFUNDED")
            .with_id("WH-1")
            .with_resource(json!({ "id": "REFUND-1" }));
        match custom_id {
            Some(id) => event.with_custom_id(id),
            None => event,
        }
    }

    #[tokio::test]
    async fn test_refund_without_correlation_key() {
        let (store, log) = setup(vec![]).await;
        let handler = OrderTransitionHandler::payment_capture_refunded(store, log.clone());

        let result = handler.handle_request(&refund_event(None)).await.unwrap();

        assert_eq!(
            result,
            DispatchResult::failure("No order for webhook event WH-1 was found.")
        );
        assert_eq!(log.levels(), vec![LogLevel::Warning]);
    }

    #[tokio::test]
    async fn test_refund_for_unknown_order() {
        let (store, log) = setup(vec![Order::new(OrderId(1), OrderStatus::Completed)]).await;
        let handler = OrderTransitionHandler::payment_capture_refunded(store.clone(), log.clone());

        let result = handler
            .handle_request(&refund_event(Some("404")))
            .await
            .unwrap();

        assert_eq!(
            result,
            DispatchResult::failure("Order for refund REFUND-1 not found.")
        );
        assert_eq!(log.levels(), vec![LogLevel::Warning]);
        let untouched = store.get(OrderId(1)).await.unwrap();
        assert!(untouched.notes.is_empty());
    }

    #[tokio::test]
    async fn test_refund_transitions_order() {
        let (store, log) = setup(vec![Order::new(OrderId(7), OrderStatus::Completed)]).await;
        let handler = OrderTransitionHandler::payment_capture_refunded(store.clone(), log.clone());

        let result = handler
            .handle_request(&refund_event(Some("7")))
            .await
            .unwrap();

        assert_eq!(result, DispatchResult::ok());
        let order = store.get(OrderId(7)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
        assert_eq!(order.notes, vec!["Payment Refunded.".to_string()]);
        assert_eq!(log.levels(), vec![LogLevel::Info]);
        assert_eq!(
            log.messages(),
            vec!["Order 7 has been updated through PayPal".to_string()]
        );
    }

    #[tokio::test]
    async fn test_checkout_completed_skips_ineligible_orders() {
        let (store, log) = setup(vec![Order::new(OrderId(3), OrderStatus::Refunded)]).await;
        let handler = OrderTransitionHandler::checkout_order_completed(store.clone(), log.clone());
        let event = IncomingEvent::new("CHECKOUT.ORDER.COMPLETED").with_resource(json!({
            "id": "CHECKOUT-1",
            "purchase_units": [{ "custom_id": "3" }]
        }));

        let result = handler.handle_request(&event).await.unwrap();

        assert_eq!(
            result,
            DispatchResult::failure("No order for checkout CHECKOUT-1 could move to processing.")
        );
        let order = store.get(OrderId(3)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
        assert!(order.notes.is_empty());
        assert_eq!(log.levels(), vec![LogLevel::Info]);
    }

    #[tokio::test]
    async fn test_checkout_completed_moves_pending_to_processing() {
        let (store, log) = setup(vec![Order::new(OrderId(3), OrderStatus::Pending)]).await;
        let handler = OrderTransitionHandler::checkout_order_completed(store.clone(), log);
        let event = IncomingEvent::new("CHECKOUT.ORDER.COMPLETED").with_resource(json!({
            "id": "CHECKOUT-1",
            "purchase_units": [{ "custom_id": "3" }]
        }));

        assert!(handler.handle_request(&event).await.unwrap().success);
        let order = store.get(OrderId(3)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.notes, vec!["Payment received.".to_string()]);
    }

    #[test]
    fn test_default_handlers_order_and_types() {
        let store: OrderServiceRef = Arc::new(InMemoryOrderService::new());
        let log: EventLogRef = Arc::new(RecordingLog::default());
        let types: Vec<String> = default_handlers(store, log)
            .iter()
            .map(|h| h.event_type().to_string())
            .collect();
        assert_eq!(
            types,
            vec![
                "CHECKOUT.ORDER.COMPLETED",
                "PAYMENT.CAPTURE.REFUNDED",
                "PAYMENT.CAPTURE.REVERSED"
            ]
        );
    }
}
