use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::prices_errors::{PriceError, Result};

/// Domain model representing an observed price for an asset at a date.
///
/// Multiple points per asset per day are allowed; "latest price" means the
/// point with the maximum date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub volume: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
    pub created_at: NaiveDateTime,
}

/// Input model for recording a new price point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPricePoint {
    pub id: Option<String>,
    pub asset_id: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub volume: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
}

impl NewPricePoint {
    /// Validates the new price point data
    pub fn validate(&self) -> Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(PriceError::InvalidData(
                "Asset ID cannot be empty".to_string(),
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(PriceError::InvalidData(
                "Price must be positive".to_string(),
            ));
        }
        if let Some(volume) = self.volume {
            if volume < Decimal::ZERO {
                return Err(PriceError::InvalidData(
                    "Volume cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of a historical price import for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceImportSummary {
    pub asset_id: String,
    pub imported: usize,
    pub source: Option<String>,
}
