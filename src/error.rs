use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Transaction was not completed, window closed")]
    UserCancelled,
    #[error("Payment overlay did not call back in time")]
    Stalled,
    #[error("Payment provider failure: {0}")]
    ProviderFailure(String),
    #[error("Navigation failed: {0}")]
    NavigationError(String),
    #[error("Notification failed: {0}")]
    NotificationError(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
