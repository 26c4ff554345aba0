use async_trait::async_trait;
use chrono::NaiveDate;

use super::prices_errors::Result;
use super::prices_model::{NewPricePoint, PriceImportSummary, PricePoint};
use crate::assets::Asset;

/// Trait defining the contract for PricePoint repository operations.
///
/// Ranged listings are returned ascending by date.
pub trait PriceRepositoryTrait: Send + Sync {
    fn get_by_id(&self, price_id: &str) -> Result<PricePoint>;
    fn get_by_asset(&self, asset_id: &str) -> Result<Vec<PricePoint>>;
    /// Point with the maximum date for the asset, if any.
    fn get_latest(&self, asset_id: &str) -> Result<Option<PricePoint>>;
    fn get_range(&self, asset_id: &str, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<PricePoint>>;
    fn get_all(&self) -> Result<Vec<PricePoint>>;
    fn create(&self, new_price: NewPricePoint) -> Result<PricePoint>;
    fn delete(&self, price_id: &str) -> Result<PricePoint>;
    /// Removes every price point. Only the backup restore path uses this.
    fn delete_all(&self) -> Result<()>;
    /// Replaces the asset's whole stored series, returning the inserted count.
    fn replace_for_asset(&self, asset_id: &str, prices: Vec<NewPricePoint>) -> Result<usize>;
}

/// Trait defining the contract for PricePoint service operations.
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    fn get_price(&self, price_id: &str) -> Result<PricePoint>;
    fn add_price(&self, new_price: NewPricePoint) -> Result<PricePoint>;
    fn delete_price(&self, price_id: &str) -> Result<PricePoint>;
    fn latest_price(&self, asset_id: &str) -> Result<Option<PricePoint>>;
    fn price_history(
        &self,
        asset_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>>;
    /// Full refresh of the asset's series from the market-data collaborator.
    async fn import_history(&self, asset: &Asset) -> Result<PriceImportSummary>;
}
