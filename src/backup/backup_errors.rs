use chrono::NaiveDate;
use thiserror::Error;

use crate::assets::AssetError;
use crate::prices::PriceError;
use crate::transactions::TransactionError;

/// Custom error type for backup and restore operations
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV encoding error: {0}")]
    CsvEncoding(String),

    #[error("Backup ledger for asset '{asset}' goes negative at {date}; restore rejected")]
    InvalidLedger { asset: String, date: NaiveDate },
}

/// Result type for backup operations
pub type Result<T> = std::result::Result<T, BackupError>;
