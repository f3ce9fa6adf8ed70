//! Command-line and environment configuration.
//!
//! Every option can also be supplied through the environment variable named
//! in its help text; a `.env` file in the working directory is loaded first.

use crate::application::dispatcher::DispatchPolicy;
use crate::domain::ports::LogLevel;
use crate::error::{Result, WebhookError};
use crate::infrastructure::paypal::{PayPalCredentials, PayPalWebhookSubscriber, SANDBOX_API_BASE};
use crate::interfaces::http::FailureStatus;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "PayPal webhook receiver that keeps order statuses in sync", long_about = None)]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the webhook endpoint
    Serve(ServeArgs),
    /// Subscribe the public URL with PayPal and print the webhook id
    Register(RegisterArgs),
    /// Delete a PayPal webhook subscription
    Unregister(UnregisterArgs),
    /// Load orders from a CSV file into the store and print the stored orders
    ImportOrders(ImportOrdersArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Response status for deliveries whose handler failed unexpectedly.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Answer 200 so PayPal does not retry
    Acknowledge,
    /// Answer 500 so PayPal retries later
    ServerError,
}

impl From<FailurePolicy> for FailureStatus {
    fn from(policy: FailurePolicy) -> Self {
        match policy {
            FailurePolicy::Acknowledge => Self::Acknowledge,
            FailurePolicy::ServerError => Self::ServerError,
        }
    }
}

/// Event-log level for event types no handler claims.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledLog {
    Silent,
    Info,
    Warning,
}

impl From<UnhandledLog> for Option<LogLevel> {
    fn from(level: UnhandledLog) -> Self {
        match level {
            UnhandledLog::Silent => None,
            UnhandledLog::Info => Some(LogLevel::Info),
            UnhandledLog::Warning => Some(LogLevel::Warning),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "WEBHOOK_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// PayPal REST API base URL
    #[arg(long, env = "PAYPAL_API_BASE", default_value = SANDBOX_API_BASE)]
    pub paypal_api_base: String,

    /// PayPal REST client id
    #[arg(long, env = "PAYPAL_CLIENT_ID")]
    pub paypal_client_id: Option<String>,

    /// PayPal REST client secret
    #[arg(long, env = "PAYPAL_CLIENT_SECRET", hide_env_values = true)]
    pub paypal_client_secret: Option<String>,

    /// Timeout for PayPal API calls, in seconds
    #[arg(long, env = "PAYPAL_TIMEOUT_SECS", default_value_t = 15)]
    pub paypal_timeout_secs: u64,
}

impl ProviderArgs {
    pub fn credentials(&self) -> Option<PayPalCredentials> {
        match (&self.paypal_client_id, &self.paypal_client_secret) {
            (Some(client_id), Some(client_secret)) => Some(PayPalCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        }
    }

    /// Builds the PayPal client, or `None` when credentials are incomplete.
    pub fn subscriber(&self) -> Result<Option<PayPalWebhookSubscriber>> {
        self.credentials()
            .map(|credentials| {
                PayPalWebhookSubscriber::new(
                    &self.paypal_api_base,
                    credentials,
                    Duration::from_secs(self.paypal_timeout_secs),
                )
            })
            .transpose()
    }

    /// Like [`ProviderArgs::subscriber`], but missing credentials are an error.
    pub fn require_subscriber(&self) -> Result<PayPalWebhookSubscriber> {
        self.subscriber()?.ok_or_else(|| {
            WebhookError::Config(
                "PAYPAL_CLIENT_ID and PAYPAL_CLIENT_SECRET are required".to_string(),
            )
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address the HTTP server binds to
    #[arg(long, env = "WEBHOOK_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Public base URL PayPal delivers to. Registers the webhook at startup
    /// when PayPal credentials are present.
    #[arg(long, env = "WEBHOOK_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// CSV file (`id, status`) of orders to load before serving
    #[arg(long, env = "WEBHOOK_ORDERS")]
    pub orders: Option<PathBuf>,

    /// Upper bound for a single handler invocation, in seconds
    #[arg(long, env = "WEBHOOK_HANDLER_TIMEOUT_SECS", default_value_t = 10)]
    pub handler_timeout_secs: u64,

    /// Upper bound for a whole HTTP request, in seconds
    #[arg(long, env = "WEBHOOK_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, value_enum, env = "WEBHOOK_FAILURE_STATUS", default_value_t = FailurePolicy::Acknowledge)]
    pub failure_status: FailurePolicy,

    #[arg(long, value_enum, env = "WEBHOOK_UNHANDLED_LOG", default_value_t = UnhandledLog::Silent)]
    pub unhandled_log: UnhandledLog,

    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl ServeArgs {
    /// Rejects a request timeout that would cut a handler off before the
    /// dispatcher can report its own timeout.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs <= self.handler_timeout_secs {
            return Err(WebhookError::Config(format!(
                "--request-timeout-secs ({}) must be greater than --handler-timeout-secs ({})",
                self.request_timeout_secs, self.handler_timeout_secs
            )));
        }
        Ok(())
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            handler_timeout: Duration::from_secs(self.handler_timeout_secs),
            unhandled_log_level: self.unhandled_log.into(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Public base URL PayPal delivers to
    #[arg(long, env = "WEBHOOK_PUBLIC_URL")]
    pub public_url: String,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UnregisterArgs {
    /// Id of the PayPal webhook to delete
    pub webhook_id: String,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ImportOrdersArgs {
    /// Input orders CSV file
    pub input: PathBuf,

    #[command(flatten)]
    pub storage: StorageArgs,
}
