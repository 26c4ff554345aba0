use thiserror::Error;

use crate::assets::AssetError;
use crate::market_data::MarketDataError;
use crate::prices::PriceError;
use crate::transactions::TransactionError;

/// Custom error type for portfolio-level operations
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Calculation error: {0}")]
    Calculation(String),
}

/// Result type for portfolio operations
pub type Result<T> = std::result::Result<T, PortfolioError>;
