//! HTTP surface: the webhook endpoint, health check and server bootstrap.

pub mod endpoint;
pub mod server;

pub use endpoint::{AppState, FailureStatus};
pub use server::{create_router, start_server};
