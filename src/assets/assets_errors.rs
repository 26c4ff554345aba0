use thiserror::Error;

/// Custom error type for asset-related operations
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Ticker '{0}' is already in use")]
    DuplicateTicker(String),
    #[error("Asset '{0}' still has {1} dependent transactions")]
    HasDependentTransactions(String, i64),
}

/// Result type for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;
