//! Adapters for the domain ports: order storage, the event log and the
//! payment provider's webhook administration API.

pub mod in_memory;
pub mod paypal;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod store;
pub mod tracing_log;
