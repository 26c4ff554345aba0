use thiserror::Error;

use crate::assets::AssetError;
use crate::backup::BackupError;
use crate::market_data::MarketDataError;
use crate::portfolio::PortfolioError;
use crate::prices::PriceError;
use crate::transactions::TransactionError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Backup(BackupError::Serialization(err))
    }
}
