use async_trait::async_trait;
use chrono::NaiveDate;

use super::portfolio_errors::Result;
use super::portfolio_model::{
    AssetPosition, EvolutionPoint, HistoryPoint, PerformanceSummary, PortfolioSummary,
    TypeDistribution, WealthPoint,
};
use crate::treasury::SemiannualPayment;

/// Trait defining the contract for portfolio-level operations.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Current position for one asset; `None` when it has no transactions.
    fn asset_position(&self, asset_id: &str) -> Result<Option<AssetPosition>>;

    /// All positions folded into portfolio totals.
    fn portfolio_summary(&self) -> Result<PortfolioSummary>;

    /// Snapshot series for one asset between two dates.
    fn asset_history(
        &self,
        asset_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoryPoint>>;

    /// Aggregated portfolio equity curve, with the synthetic fallback when
    /// real price history is too thin.
    async fn portfolio_evolution(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EvolutionPoint>>;

    /// Monthly wealth curve merging asset value and coupon income.
    fn wealth_curve(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WealthPoint>>;

    /// Current value grouped by asset type, descending.
    fn distribution(&self) -> Result<Vec<TypeDistribution>>;

    /// Period performance across the whole portfolio.
    fn performance(&self, from: NaiveDate, to: NaiveDate) -> Result<PerformanceSummary>;

    /// Coupon schedule for one semiannual-paying treasury asset.
    fn semiannual_payments(&self, asset_id: &str) -> Result<Vec<SemiannualPayment>>;
}
