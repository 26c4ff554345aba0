use std::str::FromStr;

use chrono::{Months, NaiveDate};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::Deserialize;

use super::benchmarks_model::{BenchmarkKind, BenchmarkPoint};
use crate::market_data::MarketDataError;

const BCB_SGS_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";

/// Base the accumulated series starts from.
const BENCHMARK_BASE_VALUE: Decimal = dec!(10000);

#[derive(Debug, Deserialize)]
struct SgsEntry {
    data: String,
    valor: String,
}

/// Reference-index series from the central bank's SGS API. A fetch that
/// fails for any reason is replaced by a simulated series compounded from a
/// flat annual rate; callers always get a usable curve, flagged when
/// simulated.
pub struct BenchmarkService {
    client: Client,
    base_url: String,
}

impl BenchmarkService {
    pub fn new() -> Self {
        BenchmarkService {
            client: Client::new(),
            base_url: BCB_SGS_BASE_URL.to_string(),
        }
    }

    /// Points the service at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn series(
        &self,
        kind: BenchmarkKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<BenchmarkPoint> {
        match self.fetch_sgs(kind, from, to).await {
            Ok(entries) if !entries.is_empty() => accumulate(&entries),
            Ok(_) => {
                warn!("Empty {} series from SGS, using fallback", kind.as_str());
                simulated_series(kind, from, to)
            }
            Err(e) => {
                warn!(
                    "Failed to fetch {} series: {}. Using fallback",
                    kind.as_str(),
                    e
                );
                simulated_series(kind, from, to)
            }
        }
    }

    async fn fetch_sgs(
        &self,
        kind: BenchmarkKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SgsEntry>, MarketDataError> {
        let url = format!(
            "{}/bcdata.sgs.{}/dados?formato=json&dataInicial={}&dataFinal={}",
            self.base_url,
            kind.sgs_code(),
            from.format("%d/%m/%Y"),
            to.format("%d/%m/%Y"),
        );
        debug!("Fetching {} from {}", kind.as_str(), url);

        let entries: Vec<SgsEntry> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(entries)
    }
}

impl Default for BenchmarkService {
    fn default() -> Self {
        Self::new()
    }
}

fn accumulate(entries: &[SgsEntry]) -> Vec<BenchmarkPoint> {
    let mut accumulated = BENCHMARK_BASE_VALUE;
    entries
        .iter()
        .filter_map(|entry| {
            let date = NaiveDate::parse_from_str(&entry.data, "%d/%m/%Y").ok()?;
            let rate = Decimal::from_str(&entry.valor).unwrap_or(Decimal::ZERO);
            accumulated *= Decimal::ONE + rate / dec!(100);
            Some(BenchmarkPoint {
                date,
                value: accumulated,
                rate,
                simulated: false,
            })
        })
        .collect()
}

fn simulated_series(kind: BenchmarkKind, from: NaiveDate, to: NaiveDate) -> Vec<BenchmarkPoint> {
    // Monthly rate equivalent to the flat annual estimate.
    let monthly_rate =
        (Decimal::ONE + kind.fallback_annual_rate()).powf(1.0 / 12.0) - Decimal::ONE;

    let mut points = Vec::new();
    let mut accumulated = BENCHMARK_BASE_VALUE;
    let mut current = from;
    while current <= to {
        accumulated *= Decimal::ONE + monthly_rate;
        points.push(BenchmarkPoint {
            date: current,
            value: accumulated,
            rate: monthly_rate * dec!(100),
            simulated: true,
        });
        current = match current.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    points
}
