pub(crate) mod market_data_errors;
pub(crate) mod market_data_model;
pub(crate) mod market_data_service;
pub(crate) mod market_data_traits;
pub mod providers;

// Re-export the public interface
pub use market_data_model::{HistoricalQuote, MarketQuote, QuoteSource, SymbolSearchResult};
pub use market_data_service::MarketDataService;
pub use market_data_traits::{MarketDataServiceTrait, QuoteSourceTrait};

// Re-export error types for convenience
pub use market_data_errors::{MarketDataError, Result};
