use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::assets::{Asset, Currency};
use crate::market_data::market_data_errors::{MarketDataError, Result};
use crate::market_data::market_data_model::{
    HistoricalQuote, MarketQuote, QuoteSource, SymbolSearchResult,
};
use crate::market_data::market_data_traits::QuoteSourceTrait;

const BRAPI_BASE_URL: &str = "https://brapi.dev/api";

/// Quote source backed by brapi.dev. Covers Brazilian-listed (BRL) assets
/// only; anything else is skipped so the next source can answer.
pub struct BrapiProvider {
    client: Client,
    base_url: String,
}

impl BrapiProvider {
    pub fn new() -> Self {
        BrapiProvider {
            client: Client::new(),
            base_url: BRAPI_BASE_URL.to_string(),
        }
    }

    /// Points the provider at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for BrapiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct BrapiQuoteResponse {
    #[serde(default)]
    results: Vec<BrapiQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrapiQuote {
    symbol: String,
    regular_market_price: f64,
    #[serde(default)]
    regular_market_change: f64,
    #[serde(default)]
    regular_market_change_percent: f64,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrapiRangeResponse {
    #[serde(default)]
    results: Vec<BrapiRangeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrapiRangeResult {
    #[serde(default)]
    historical_data_price: Vec<BrapiHistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct BrapiHistoryEntry {
    date: i64,
    close: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BrapiAvailableResponse {
    #[serde(default)]
    stocks: Vec<String>,
}

fn decimal_from(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

#[async_trait]
impl QuoteSourceTrait for BrapiProvider {
    fn source(&self) -> QuoteSource {
        QuoteSource::Brapi
    }

    fn supports(&self, asset: &Asset) -> bool {
        asset.currency == Currency::Brl
    }

    async fn latest_quote(&self, asset: &Asset) -> Result<MarketQuote> {
        let url = format!("{}/quote/{}", self.base_url, asset.ticker);
        debug!("Fetching BRAPI quote from {}", url);

        let response: BrapiQuoteResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let quote = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::NotFound(asset.ticker.clone()))?;

        let timestamp = quote
            .regular_market_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.naive_utc())
            .unwrap_or_else(|| Utc::now().naive_utc());

        Ok(MarketQuote {
            symbol: quote.symbol,
            price: decimal_from(quote.regular_market_price),
            change: decimal_from(quote.regular_market_change),
            change_percent: decimal_from(quote.regular_market_change_percent),
            day_high: quote.regular_market_day_high.map(decimal_from),
            day_low: quote.regular_market_day_low.map(decimal_from),
            volume: quote.regular_market_volume.map(decimal_from),
            timestamp,
            source: QuoteSource::Brapi,
        })
    }

    async fn historical_quotes(
        &self,
        asset: &Asset,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalQuote>> {
        let url = format!(
            "{}/quote/{}/range?interval=1d&fromDate={}&toDate={}",
            self.base_url,
            asset.ticker,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        );
        debug!("Fetching BRAPI history from {}", url);

        let response: BrapiRangeResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let entries = response
            .results
            .into_iter()
            .next()
            .map(|r| r.historical_data_price)
            .unwrap_or_default();

        let mut quotes: Vec<HistoricalQuote> = entries
            .into_iter()
            .filter_map(|entry| {
                let date = DateTime::<Utc>::from_timestamp(entry.date, 0)?.date_naive();
                let close = entry.close?;
                Some(HistoricalQuote {
                    date,
                    close: decimal_from(close),
                    volume: entry.volume.map(decimal_from),
                })
            })
            .collect();
        quotes.sort_by_key(|q| q.date);
        Ok(quotes)
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>> {
        let url = format!("{}/available?search={}", self.base_url, query);

        let response: BrapiAvailableResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .stocks
            .into_iter()
            .map(|symbol| SymbolSearchResult {
                symbol,
                name: None,
                exchange: Some("B3".to_string()),
                source: QuoteSource::Brapi,
            })
            .collect())
    }
}
