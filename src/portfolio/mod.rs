pub(crate) mod evolution_calculator;
pub(crate) mod history_calculator;
pub(crate) mod portfolio_errors;
pub(crate) mod portfolio_model;
pub(crate) mod portfolio_service;
pub(crate) mod portfolio_traits;
pub(crate) mod position_calculator;

// Re-export the public interface
pub use evolution_calculator::calculate_wealth_curve;
pub use history_calculator::{
    aggregate_portfolio_history, calculate_asset_history, interpolate_sparse_history,
};
pub use portfolio_model::{
    AssetLedger, AssetPosition, EvolutionConfig, EvolutionPoint, HistoryPoint,
    PerformanceSummary, PortfolioSummary, TypeDistribution, WealthPoint,
};
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::PortfolioServiceTrait;
pub use position_calculator::calculate_position;

// Re-export error types for convenience
pub use portfolio_errors::{PortfolioError, Result};
