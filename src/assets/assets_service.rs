use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use super::assets_errors::{AssetError, Result};
use super::assets_model::{Asset, NewAsset, UpdateAsset};
use super::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};

/// Service for managing the asset catalog.
pub struct AssetService {
    repository: Arc<dyn AssetRepositoryTrait>,
}

impl AssetService {
    pub fn new(repository: Arc<dyn AssetRepositoryTrait>) -> Self {
        AssetService { repository }
    }
}

impl AssetServiceTrait for AssetService {
    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        self.repository.get_by_id(asset_id)
    }

    fn get_asset_by_ticker(&self, ticker: &str) -> Result<Option<Asset>> {
        self.repository.get_by_ticker(ticker)
    }

    fn list_assets(&self) -> Result<Vec<Asset>> {
        self.repository.get_all()
    }

    fn create_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        if let Some(existing) = self.repository.get_by_ticker(&new_asset.ticker)? {
            return Err(AssetError::DuplicateTicker(existing.ticker));
        }
        let mut new_asset = new_asset;
        if new_asset.id.is_none() {
            new_asset.id = Some(Uuid::new_v4().to_string());
        }
        debug!("Creating asset with ticker {}", new_asset.ticker);
        self.repository.create(new_asset)
    }

    fn update_asset(&self, update: UpdateAsset) -> Result<Asset> {
        update.validate()?;
        if let Some(existing) = self.repository.get_by_ticker(&update.ticker)? {
            if existing.id != update.id {
                return Err(AssetError::DuplicateTicker(existing.ticker));
            }
        }
        self.repository.update(update)
    }

    fn delete_asset(&self, asset_id: &str) -> Result<Asset> {
        let dependent = self.repository.transaction_count(asset_id)?;
        if dependent > 0 {
            let asset = self.repository.get_by_id(asset_id)?;
            return Err(AssetError::HasDependentTransactions(asset.ticker, dependent));
        }
        self.repository.delete(asset_id)
    }
}
