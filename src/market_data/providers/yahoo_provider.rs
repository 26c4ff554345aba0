use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::debug;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use yahoo_finance_api as yahoo;

use crate::assets::{Asset, Currency};
use crate::market_data::market_data_errors::{MarketDataError, Result};
use crate::market_data::market_data_model::{
    HistoricalQuote, MarketQuote, QuoteSource, SymbolSearchResult,
};
use crate::market_data::market_data_traits::QuoteSourceTrait;

/// Quote source backed by Yahoo Finance. Used as the fallback for every
/// asset; bare Brazilian tickers get the `.SA` exchange suffix appended.
pub struct YahooProvider {
    provider: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self> {
        let provider = yahoo::YahooConnector::new()?;
        Ok(YahooProvider { provider })
    }

    fn yahoo_symbol(&self, asset: &Asset) -> String {
        if asset.currency == Currency::Brl && !asset.ticker.contains('.') {
            format!("{}.SA", asset.ticker)
        } else {
            asset.ticker.clone()
        }
    }
}

fn to_system_time(date: NaiveDate) -> SystemTime {
    let seconds = date.and_time(NaiveTime::MIN).and_utc().timestamp().max(0) as u64;
    UNIX_EPOCH + Duration::from_secs(seconds)
}

fn decimal_from(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

#[async_trait]
impl QuoteSourceTrait for YahooProvider {
    fn source(&self) -> QuoteSource {
        QuoteSource::Yahoo
    }

    fn supports(&self, _asset: &Asset) -> bool {
        true
    }

    async fn latest_quote(&self, asset: &Asset) -> Result<MarketQuote> {
        let symbol = self.yahoo_symbol(asset);
        debug!("Fetching Yahoo quote for {}", symbol);

        let response = self.provider.get_latest_quotes(&symbol, "1d").await?;
        let quote = response
            .last_quote()
            .map_err(|_| MarketDataError::NotFound(symbol.clone()))?;

        let timestamp = DateTime::<Utc>::from_timestamp(quote.timestamp as i64, 0)
            .map(|t| t.naive_utc())
            .unwrap_or_else(|| Utc::now().naive_utc());

        let close = decimal_from(quote.close);
        let open = decimal_from(quote.open);
        let change = close - open;
        let change_percent = if open > Decimal::ZERO {
            change / open * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        Ok(MarketQuote {
            symbol,
            price: close,
            change,
            change_percent,
            day_high: Some(decimal_from(quote.high)),
            day_low: Some(decimal_from(quote.low)),
            volume: Decimal::from_u64(quote.volume),
            timestamp,
            source: QuoteSource::Yahoo,
        })
    }

    async fn historical_quotes(
        &self,
        asset: &Asset,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalQuote>> {
        let symbol = self.yahoo_symbol(asset);
        let start = to_system_time(from);
        let end = to_system_time(to);

        let response = self
            .provider
            .get_quote_history(&symbol, start.into(), end.into())
            .await?;

        let quotes = response
            .quotes()?
            .into_iter()
            .filter_map(|quote| {
                let date = DateTime::<Utc>::from_timestamp(quote.timestamp as i64, 0)?
                    .date_naive();
                Some(HistoricalQuote {
                    date,
                    close: decimal_from(quote.close),
                    volume: Decimal::from_u64(quote.volume),
                })
            })
            .collect();

        Ok(quotes)
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>> {
        let result = self.provider.search_ticker(query).await?;

        Ok(result
            .quotes
            .iter()
            .map(|item| SymbolSearchResult {
                symbol: item.symbol.clone(),
                name: if item.long_name.is_empty() {
                    Some(item.short_name.clone())
                } else {
                    Some(item.long_name.clone())
                },
                exchange: Some(item.exchange.clone()),
                source: QuoteSource::Yahoo,
            })
            .collect())
    }
}
