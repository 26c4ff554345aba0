use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Reference indexes the portfolio is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BenchmarkKind {
    Ipca,
    Cdi,
    Selic,
}

impl BenchmarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkKind::Ipca => "IPCA",
            BenchmarkKind::Cdi => "CDI",
            BenchmarkKind::Selic => "SELIC",
        }
    }

    /// Central-bank SGS series code for the index.
    pub fn sgs_code(&self) -> u32 {
        match self {
            BenchmarkKind::Ipca => 433,
            BenchmarkKind::Cdi => 12,
            BenchmarkKind::Selic => 11,
        }
    }

    /// Flat annual rate used when the series cannot be fetched.
    pub fn fallback_annual_rate(&self) -> Decimal {
        match self {
            BenchmarkKind::Ipca => dec!(0.045),
            BenchmarkKind::Cdi => dec!(0.068),
            BenchmarkKind::Selic => dec!(0.065),
        }
    }
}

/// One point of an accumulated benchmark series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkPoint {
    pub date: NaiveDate,
    /// Accumulated value from the series base.
    pub value: Decimal,
    /// Period rate in percent.
    pub rate: Decimal,
    /// True when the point comes from the simulated fallback series.
    pub simulated: bool,
}
