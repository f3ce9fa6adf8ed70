use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Order service error: {0}")]
    OrderService(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Provider request failed: {0}")]
    Provider(#[from] reqwest::Error),
    #[error("Provider responded with status {status}: {body}")]
    ProviderStatus { status: u16, body: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, WebhookError>;
