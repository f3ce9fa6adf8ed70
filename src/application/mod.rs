//! Application layer: the webhook handler contract, the concrete order
//! handlers, the dispatcher that routes events to them and the registrar that
//! wires everything to the payment provider.
//!
//! Handlers are constructed once and shared across concurrent deliveries, so
//! all per-event state lives on the stack of `handle_request`.

pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod registrar;
