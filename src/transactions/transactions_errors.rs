use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for ledger operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Insufficient quantity. Available: {available}")]
    InsufficientQuantity { available: Decimal },
    #[error("Removing this purchase would leave later sells uncovered as of {date}")]
    WouldBreakBalance { date: chrono::NaiveDate },
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, TransactionError>;
