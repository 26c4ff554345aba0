use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assets::{Asset, AssetType};
use crate::prices::PricePoint;
use crate::transactions::Transaction;

/// An asset's holdings, cost basis and derived value at a point in time.
///
/// Value and return fields are `None` when no price is known; quantity and
/// cost fields stay populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPosition {
    pub asset: Asset,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub total_invested: Decimal,
    pub current_price: Option<Decimal>,
    pub current_total: Option<Decimal>,
    pub absolute_return: Option<Decimal>,
    pub percent_return: Option<Decimal>,
    pub last_dividend_yield: Option<Decimal>,
}

/// Positions folded into portfolio totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: Decimal,
    pub current_total: Decimal,
    pub absolute_return: Decimal,
    pub percent_return: Decimal,
    pub positions: Vec<AssetPosition>,
}

/// One snapshot of an asset's position at a recorded price point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub price: Decimal,
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub total_invested: Decimal,
    pub current_total: Decimal,
    pub absolute_return: Decimal,
    pub percent_return: Decimal,
    pub dividend_yield: Option<Decimal>,
}

/// One point of the aggregated portfolio equity curve. Synthetic points from
/// the sparse-data fallback are flagged so consumers can render them apart
/// from real observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionPoint {
    pub date: NaiveDate,
    pub total: Decimal,
    pub estimated: bool,
}

/// One monthly point of the wealth curve merging asset value with
/// accumulated coupon payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WealthPoint {
    pub date: NaiveDate,
    pub total: Decimal,
    pub invested: Decimal,
    pub asset_value: Decimal,
    pub payments_received: Decimal,
    pub events: Vec<String>,
    pub has_payment: bool,
    pub daily_payment: Decimal,
}

/// An asset with its full ledger and latest known price, the unit the
/// portfolio-level calculators consume.
#[derive(Debug, Clone)]
pub struct AssetLedger {
    pub asset: Asset,
    /// Ascending by date.
    pub transactions: Vec<Transaction>,
    pub latest_price: Option<PricePoint>,
}

/// Current value grouped by asset type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDistribution {
    pub asset_type: AssetType,
    pub total: Decimal,
}

/// Period performance of the whole portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub initial_value: Decimal,
    pub final_value: Decimal,
    pub absolute_return: Decimal,
    pub percent_return: Decimal,
    pub contributions: Decimal,
    pub withdrawals: Decimal,
    pub adjusted_return: Decimal,
}

/// Tunable estimation parameters carried over from the original model: the
/// assumed growth rate and window sizes are conventions, not derived values.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Assumed annual growth when estimating values without price data
    /// (inflation ~4.5% + typical contracted real rate ~4%).
    pub annual_growth_rate: Decimal,
    /// Window before the end date inside which the real current value
    /// overrides the growth estimate.
    pub recent_value_window_days: i64,
    /// Fewer aggregate points than this triggers the synthetic fallback.
    pub sparse_point_threshold: usize,
    /// Horizons shorter than this interpolate weekly instead of monthly.
    pub weekly_granularity_horizon_days: i64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            annual_growth_rate: dec!(0.085),
            recent_value_window_days: 60,
            sparse_point_threshold: 3,
            weekly_granularity_horizon_days: 90,
        }
    }
}
