use thiserror::Error;

/// Custom error type for price-history operations
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Import failed: {0}")]
    ImportFailed(String),
}

/// Result type for price-history operations
pub type Result<T> = std::result::Result<T, PriceError>;
