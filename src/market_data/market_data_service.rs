use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use log::{debug, warn};

use super::market_data_errors::Result;
use super::market_data_model::{HistoricalQuote, MarketQuote, QuoteSource, SymbolSearchResult};
use super::market_data_traits::{MarketDataServiceTrait, QuoteSourceTrait};
use crate::assets::Asset;

/// How long a cached quote is considered fresh.
const QUOTE_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

struct CachedQuote {
    quote: MarketQuote,
    fetched_at: Instant,
}

/// Market-data collaborator: an ordered list of quote sources tried in
/// sequence until one succeeds, with an in-memory cache of latest quotes.
pub struct MarketDataService {
    providers: Vec<Arc<dyn QuoteSourceTrait>>,
    quote_cache: DashMap<String, CachedQuote>,
    cache_ttl: Duration,
}

impl MarketDataService {
    pub fn new(providers: Vec<Arc<dyn QuoteSourceTrait>>) -> Self {
        MarketDataService {
            providers,
            quote_cache: DashMap::new(),
            cache_ttl: QUOTE_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    fn cached_quote(&self, ticker: &str) -> Option<MarketQuote> {
        let entry = self.quote_cache.get(ticker)?;
        if entry.fetched_at.elapsed() < self.cache_ttl {
            Some(entry.quote.clone())
        } else {
            None
        }
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_quote(&self, asset: &Asset) -> Result<Option<MarketQuote>> {
        if let Some(quote) = self.cached_quote(&asset.ticker) {
            debug!("Serving cached quote for {}", asset.ticker);
            return Ok(Some(quote));
        }

        for provider in &self.providers {
            if !provider.supports(asset) {
                continue;
            }
            match provider.latest_quote(asset).await {
                Ok(quote) => {
                    self.quote_cache.insert(
                        asset.ticker.clone(),
                        CachedQuote {
                            quote: quote.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                    return Ok(Some(quote));
                }
                Err(e) => {
                    warn!(
                        "Quote source {} failed for {}: {}",
                        provider.source().as_str(),
                        asset.ticker,
                        e
                    );
                }
            }
        }

        debug!("No quote source answered for {}", asset.ticker);
        Ok(None)
    }

    async fn get_historical(
        &self,
        asset: &Asset,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(Vec<HistoricalQuote>, Option<QuoteSource>)> {
        for provider in &self.providers {
            if !provider.supports(asset) {
                continue;
            }
            match provider.historical_quotes(asset, from, to).await {
                Ok(quotes) if !quotes.is_empty() => {
                    return Ok((quotes, Some(provider.source())));
                }
                Ok(_) => {
                    debug!(
                        "Quote source {} returned no history for {}",
                        provider.source().as_str(),
                        asset.ticker
                    );
                }
                Err(e) => {
                    warn!(
                        "Quote source {} failed history for {}: {}",
                        provider.source().as_str(),
                        asset.ticker,
                        e
                    );
                }
            }
        }
        Ok((Vec::new(), None))
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolSearchResult>> {
        let mut results = Vec::new();
        for provider in &self.providers {
            match provider.search(query).await {
                Ok(mut hits) => results.append(&mut hits),
                Err(e) => warn!(
                    "Quote source {} failed search '{}': {}",
                    provider.source().as_str(),
                    query,
                    e
                ),
            }
        }
        Ok(results)
    }
}
