use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a coupon amount was observed or derived from the contracted rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Expected,
    Estimated,
}

/// A semiannual coupon event for a treasury asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemiannualPayment {
    pub date: NaiveDate,
    pub expected_amount: Decimal,
    /// Human-readable period, e.g. "July 2024".
    pub period: String,
    pub status: PaymentStatus,
}

/// A coupon date still ahead of the reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingPayment {
    pub date: NaiveDate,
    pub period: String,
}

/// Decomposed compounded return of an inflation-indexed bond since purchase.
/// All components in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedReturn {
    pub real_return: Decimal,
    pub inflation_return: Decimal,
    pub total_return: Decimal,
}
