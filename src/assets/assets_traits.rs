use super::assets_model::{Asset, NewAsset, UpdateAsset};
use super::assets_errors::Result;

/// Trait defining the contract for Asset repository operations.
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;
    fn get_by_ticker(&self, ticker: &str) -> Result<Option<Asset>>;
    fn get_all(&self) -> Result<Vec<Asset>>;
    fn create(&self, new_asset: NewAsset) -> Result<Asset>;
    fn update(&self, update: UpdateAsset) -> Result<Asset>;
    fn delete(&self, asset_id: &str) -> Result<Asset>;
    /// Removes every asset. Only the backup restore path uses this.
    fn delete_all(&self) -> Result<()>;
    /// Number of transactions recorded against the asset.
    fn transaction_count(&self, asset_id: &str) -> Result<i64>;
}

/// Trait defining the contract for Asset service operations.
pub trait AssetServiceTrait: Send + Sync {
    fn get_asset(&self, asset_id: &str) -> Result<Asset>;
    fn get_asset_by_ticker(&self, ticker: &str) -> Result<Option<Asset>>;
    fn list_assets(&self) -> Result<Vec<Asset>>;
    fn create_asset(&self, new_asset: NewAsset) -> Result<Asset>;
    fn update_asset(&self, update: UpdateAsset) -> Result<Asset>;
    fn delete_asset(&self, asset_id: &str) -> Result<Asset>;
}
