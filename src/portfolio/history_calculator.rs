use std::collections::BTreeMap;

use chrono::{Days, Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::portfolio_model::{EvolutionConfig, EvolutionPoint, HistoryPoint};
use crate::constants::DAYS_PER_YEAR;
use crate::prices::PricePoint;
use crate::transactions::{Transaction, TransactionType};

/// Replay accumulator for the history walk. Unlike the position fold, a sell
/// here rescales the cost basis proportionally: the invested total becomes
/// the remaining quantity at the unchanged average price, equivalent to
/// `cost x (quantity - sold) / quantity`.
#[derive(Debug, Clone, Default)]
struct ReplayState {
    quantity: Decimal,
    total_invested: Decimal,
    average_price: Decimal,
}

impl ReplayState {
    fn apply(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Buy => {
                self.quantity += transaction.quantity;
                self.total_invested += transaction.quantity * transaction.unit_price;
                if self.quantity > Decimal::ZERO {
                    self.average_price = self.total_invested / self.quantity;
                }
            }
            TransactionType::Sell => {
                self.quantity -= transaction.quantity;
                self.total_invested = self.quantity * self.average_price;
            }
        }
    }
}

/// Replays one asset's ledger against its recorded prices, emitting a
/// snapshot per price point within `[from, to]`.
///
/// The starting position is built from transactions dated strictly before
/// `from`; each price point then drains the transactions dated up to it.
/// Both inputs must be pre-sorted ascending by date.
pub fn calculate_asset_history(
    transactions: &[Transaction],
    prices: &[PricePoint],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<HistoryPoint> {
    let mut state = ReplayState::default();
    let mut next_transaction = 0;

    // Initial position: everything dated before the window.
    while next_transaction < transactions.len()
        && transactions[next_transaction].date < from
    {
        state.apply(&transactions[next_transaction]);
        next_transaction += 1;
    }

    let mut history = Vec::new();
    for price in prices.iter().filter(|p| p.date >= from && p.date <= to) {
        while next_transaction < transactions.len()
            && transactions[next_transaction].date <= price.date
        {
            state.apply(&transactions[next_transaction]);
            next_transaction += 1;
        }

        let current_total = state.quantity * price.price;
        let absolute_return = current_total - state.total_invested;
        let percent_return = if state.total_invested > Decimal::ZERO {
            absolute_return / state.total_invested * dec!(100)
        } else {
            Decimal::ZERO
        };

        history.push(HistoryPoint {
            date: price.date,
            price: price.price,
            quantity: state.quantity,
            average_price: state.average_price,
            total_invested: state.total_invested,
            current_total,
            absolute_return,
            percent_return,
            dividend_yield: price.dividend_yield,
        });
    }

    history
}

/// Aggregates per-asset histories into one portfolio series by calendar day:
/// snapshots sharing a date are summed, and an asset without a snapshot on a
/// date simply contributes nothing that day. No value is carried forward
/// between days.
pub fn aggregate_portfolio_history(histories: &[Vec<HistoryPoint>]) -> Vec<EvolutionPoint> {
    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for history in histories {
        for point in history {
            *totals.entry(point.date).or_insert(Decimal::ZERO) += point.current_total;
        }
    }
    totals
        .into_iter()
        .map(|(date, total)| EvolutionPoint {
            date,
            total,
            estimated: false,
        })
        .collect()
}

/// Growth factor `(1 + rate)^years` for a fractional number of years.
pub(crate) fn growth_factor(rate: Decimal, years: f64) -> Decimal {
    (Decimal::ONE + rate).powf(years)
}

/// Synthesizes an equity curve when real price history is too thin to chart.
///
/// Points step monthly (weekly for short horizons) from the first
/// transaction to `now`, compounding the invested total at the assumed
/// growth rate and blending toward the last real value as the date
/// approaches `now` (blend weight = elapsed-fraction squared). Real points
/// pass through unchanged; synthetic ones are flagged `estimated` and
/// floored at the invested total.
pub fn interpolate_sparse_history(
    real_points: &[EvolutionPoint],
    first_transaction: NaiveDate,
    total_invested: Decimal,
    now: NaiveDate,
    config: &EvolutionConfig,
) -> Vec<EvolutionPoint> {
    let current_value = real_points
        .last()
        .map(|p| p.total)
        .unwrap_or(Decimal::ZERO);

    let horizon_days = (now - first_transaction).num_days();
    let weekly = horizon_days < config.weekly_granularity_horizon_days;

    let mut interpolated = Vec::new();
    let mut current = first_transaction;
    while current <= now {
        if let Some(real) = real_points.iter().find(|p| p.date == current) {
            interpolated.push(real.clone());
        } else {
            let elapsed_days = (current - first_transaction).num_days();
            let years_elapsed = elapsed_days as f64 / DAYS_PER_YEAR;
            let estimate = total_invested * growth_factor(config.annual_growth_rate, years_elapsed);

            let value = if current_value > Decimal::ZERO && horizon_days > 0 {
                let progress = Decimal::from(elapsed_days) / Decimal::from(horizon_days);
                estimate + (current_value - estimate) * progress * progress
            } else {
                estimate
            };

            interpolated.push(EvolutionPoint {
                date: current,
                total: value.max(total_invested),
                estimated: true,
            });
        }

        current = if weekly {
            match current.checked_add_days(Days::new(7)) {
                Some(next) => next,
                None => break,
            }
        } else {
            match current.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            }
        };
    }

    interpolated
}
