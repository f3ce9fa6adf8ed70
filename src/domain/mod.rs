//! Domain layer: webhook events, orders, dispatch outcomes and the ports
//! infrastructure adapters implement.

pub mod dispatch;
pub mod event;
pub mod order;
pub mod ports;
