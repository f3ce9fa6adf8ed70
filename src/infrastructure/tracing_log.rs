use crate::domain::ports::{EventLog, LogLevel};
use serde_json::Value;
use tracing::{error, info, warn};

/// Forwards event-log entries to `tracing`, carrying the structured context
/// as a `context` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn log(&self, level: LogLevel, message: &str, context: &Value) {
        match level {
            LogLevel::Info => info!(target: "webhook", %context, "{message}"),
            LogLevel::Warning => warn!(target: "webhook", %context, "{message}"),
            LogLevel::Error => error!(target: "webhook", %context, "{message}"),
        }
    }
}
