use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, warn};
use uuid::Uuid;

use super::prices_errors::{PriceError, Result};
use super::prices_model::{NewPricePoint, PriceImportSummary, PricePoint};
use super::prices_traits::{PriceRepositoryTrait, PriceServiceTrait};
use crate::assets::Asset;
use crate::constants::HISTORY_IMPORT_START;
use crate::market_data::MarketDataServiceTrait;

/// Service for recorded price observations and provider-backed refreshes.
pub struct PriceService {
    repository: Arc<dyn PriceRepositoryTrait>,
    market_data: Arc<dyn MarketDataServiceTrait>,
}

impl PriceService {
    pub fn new(
        repository: Arc<dyn PriceRepositoryTrait>,
        market_data: Arc<dyn MarketDataServiceTrait>,
    ) -> Self {
        PriceService {
            repository,
            market_data,
        }
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    fn get_price(&self, price_id: &str) -> Result<PricePoint> {
        self.repository.get_by_id(price_id)
    }

    fn add_price(&self, new_price: NewPricePoint) -> Result<PricePoint> {
        new_price.validate()?;
        let mut new_price = new_price;
        if new_price.id.is_none() {
            new_price.id = Some(Uuid::new_v4().to_string());
        }
        self.repository.create(new_price)
    }

    fn delete_price(&self, price_id: &str) -> Result<PricePoint> {
        self.repository.delete(price_id)
    }

    fn latest_price(&self, asset_id: &str) -> Result<Option<PricePoint>> {
        self.repository.get_latest(asset_id)
    }

    fn price_history(
        &self,
        asset_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        self.repository.get_range(asset_id, from, to)
    }

    async fn import_history(&self, asset: &Asset) -> Result<PriceImportSummary> {
        let from = NaiveDate::parse_from_str(HISTORY_IMPORT_START, "%Y-%m-%d")
            .map_err(|e| PriceError::ImportFailed(e.to_string()))?;
        let to = Utc::now().date_naive();

        let (history, source) = self
            .market_data
            .get_historical(asset, from, to)
            .await
            .map_err(|e| PriceError::ImportFailed(e.to_string()))?;

        if history.is_empty() {
            warn!("No historical data found for {}", asset.ticker);
            return Ok(PriceImportSummary {
                asset_id: asset.id.clone(),
                imported: 0,
                source: None,
            });
        }

        let points: Vec<NewPricePoint> = history
            .into_iter()
            .map(|quote| NewPricePoint {
                id: None,
                asset_id: asset.id.clone(),
                date: quote.date,
                price: quote.close,
                volume: quote.volume,
                dividend_yield: None,
            })
            .collect();

        let imported = self.repository.replace_for_asset(&asset.id, points)?;
        debug!(
            "Imported {} price points for {} from {:?}",
            imported, asset.ticker, source
        );

        Ok(PriceImportSummary {
            asset_id: asset.id.clone(),
            imported,
            source: source.map(|s| s.as_str().to_string()),
        })
    }
}
