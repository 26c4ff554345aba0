use async_trait::async_trait;
use chrono::NaiveDate;

use super::market_data_errors::Result;
use super::market_data_model::{HistoricalQuote, MarketQuote, QuoteSource, SymbolSearchResult};
use crate::assets::Asset;

/// One external quote source. Sources are tried in registration order until
/// one answers; none is authoritative on its own.
#[async_trait]
pub trait QuoteSourceTrait: Send + Sync {
    fn source(&self) -> QuoteSource;

    /// Whether this source covers the asset at all (e.g. BRAPI only lists
    /// BRL instruments). Unsupported assets are skipped, not errored.
    fn supports(&self, asset: &Asset) -> bool;

    async fn latest_quote(&self, asset: &Asset) -> Result<MarketQuote>;

    async fn historical_quotes(
        &self,
        asset: &Asset,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalQuote>>;

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>>;
}

/// Trait defining the contract for the market-data service.
///
/// All operations degrade gracefully: an asset with no reachable quote
/// resolves to `None`/empty rather than an error (the calculators treat
/// missing prices as "no current value").
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    async fn get_quote(&self, asset: &Asset) -> Result<Option<MarketQuote>>;
    async fn get_historical(
        &self,
        asset: &Asset,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(Vec<HistoricalQuote>, Option<QuoteSource>)>;
    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>>;
}
