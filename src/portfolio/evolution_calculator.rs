use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use super::history_calculator::growth_factor;
use super::portfolio_model::{AssetLedger, EvolutionConfig, WealthPoint};
use crate::constants::DAYS_PER_YEAR;
use crate::treasury::{semiannual_payment_schedule, SemiannualPayment};

struct ScheduledPayment {
    payment: SemiannualPayment,
    ticker: String,
}

/// Merges asset value and coupon income into one monthly wealth curve over
/// `[from, to]`.
///
/// The invested total is the net signed buy-minus-sell cash flow and is not
/// clamped at zero. Asset value per month is a compounding estimate from the
/// invested total, overridden by the real current value inside the recent
/// window before `to`. Coupon amounts accumulate by month-year, so the curve
/// shows capital growth and distributed income together. Outside the recent
/// window this is a model-based approximation, not ground truth.
pub fn calculate_wealth_curve(
    ledgers: &[AssetLedger],
    from: NaiveDate,
    to: NaiveDate,
    config: &EvolutionConfig,
) -> Vec<WealthPoint> {
    if from > to {
        return Vec::new();
    }

    let total_invested: Decimal = ledgers
        .iter()
        .flat_map(|l| l.transactions.iter())
        .map(|t| t.signed_cash_flow())
        .sum();

    let first_transaction = ledgers
        .iter()
        .flat_map(|l| l.transactions.iter())
        .map(|t| t.date)
        .min();

    // Real current value where any price is known; otherwise the same
    // growth model used for sparse charts, compounded since the first
    // transaction.
    let priced_value: Option<Decimal> = {
        let mut any_price = false;
        let mut sum = Decimal::ZERO;
        for ledger in ledgers {
            if let Some(latest) = &ledger.latest_price {
                any_price = true;
                let quantity: Decimal = ledger
                    .transactions
                    .iter()
                    .map(|t| t.signed_quantity())
                    .sum();
                sum += quantity * latest.price;
            }
        }
        any_price.then_some(sum)
    };
    let current_value = priced_value.unwrap_or_else(|| match first_transaction {
        Some(first) => {
            let years = (to - first).num_days() as f64 / DAYS_PER_YEAR;
            total_invested * growth_factor(config.annual_growth_rate, years)
        }
        None => Decimal::ZERO,
    });

    // Coupon events inside the window, ascending by payment date.
    let mut scheduled: Vec<ScheduledPayment> = ledgers
        .iter()
        .filter(|l| l.asset.pays_semiannual_interest)
        .flat_map(|ledger| {
            semiannual_payment_schedule(&ledger.asset, &ledger.transactions, to)
                .into_iter()
                .filter(|p| p.date >= from && p.date <= to)
                .map(|payment| ScheduledPayment {
                    payment,
                    ticker: ledger.asset.ticker.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    scheduled.sort_by_key(|s| s.payment.date);

    let mut curve = Vec::new();
    let mut payments_accumulated = Decimal::ZERO;
    let mut next_payment = 0;
    let mut current = from;

    while current <= to {
        let years_elapsed = (current - from).num_days() as f64 / DAYS_PER_YEAR;
        let mut asset_value =
            total_invested * growth_factor(config.annual_growth_rate, years_elapsed);

        if (to - current).num_days() <= config.recent_value_window_days {
            asset_value = current_value;
        }

        let mut events = Vec::new();
        let mut month_payment = Decimal::ZERO;
        while next_payment < scheduled.len()
            && month_key(scheduled[next_payment].payment.date) <= month_key(current)
        {
            let entry = &scheduled[next_payment];
            payments_accumulated += entry.payment.expected_amount;
            month_payment += entry.payment.expected_amount;
            events.push(format!(
                "Semiannual payment {} - {}",
                entry.payment.period, entry.ticker
            ));
            next_payment += 1;
        }

        curve.push(WealthPoint {
            date: current,
            total: asset_value + payments_accumulated,
            invested: total_invested,
            asset_value,
            payments_received: payments_accumulated,
            has_payment: !events.is_empty(),
            daily_payment: month_payment,
            events,
        });

        current = match current.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    curve
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Asset, AssetType, Currency, IndexKind};
    use crate::prices::PricePoint;
    use crate::transactions::{Transaction, TransactionType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bond_asset() -> Asset {
        let now = Utc::now().naive_utc();
        Asset {
            id: "bond-1".to_string(),
            ticker: "TESOURO-IPCA-2029".to_string(),
            name: "Tesouro IPCA+ 2029".to_string(),
            asset_type: AssetType::TreasuryBond,
            currency: Currency::Brl,
            description: None,
            sector: None,
            index: Some(IndexKind::Ipca),
            rate: Some(dec!(5.83)),
            maturity: NaiveDate::from_ymd_opt(2029, 8, 15),
            pays_semiannual_interest: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn buy(date: NaiveDate, quantity: Decimal, price: Decimal) -> Transaction {
        let now = Utc::now().naive_utc();
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id: "bond-1".to_string(),
            transaction_type: TransactionType::Buy,
            date,
            quantity,
            unit_price: price,
            fees: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn latest(date: NaiveDate, price: Decimal) -> PricePoint {
        PricePoint {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id: "bond-1".to_string(),
            date,
            price,
            volume: None,
            dividend_yield: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn accumulates_coupon_payments_into_the_curve() {
        let ledger = AssetLedger {
            asset: bond_asset(),
            transactions: vec![buy(date(2024, 1, 1), dec!(1), dec!(2500))],
            latest_price: Some(latest(date(2025, 8, 1), dec!(2600))),
        };
        let config = EvolutionConfig::default();

        let curve =
            calculate_wealth_curve(&[ledger], date(2024, 1, 1), date(2025, 9, 1), &config);

        // Monthly walk, inclusive on both ends.
        assert_eq!(curve.len(), 21);
        assert!(curve.iter().all(|p| p.invested == dec!(2500)));

        // Coupons: Jul-2024, Jan-2025, Jul-2025 at 72.875 each.
        let july_2024 = curve.iter().find(|p| p.date == date(2024, 7, 1)).unwrap();
        assert!(july_2024.has_payment);
        assert_eq!(july_2024.daily_payment, dec!(72.875));
        assert_eq!(july_2024.payments_received, dec!(72.875));
        assert_eq!(july_2024.events.len(), 1);

        let last = curve.last().unwrap();
        assert_eq!(last.payments_received, dec!(72.875) * dec!(3));
        // Inside the recent window the real value overrides the estimate.
        assert_eq!(last.asset_value, dec!(2600));
        assert_eq!(last.total, dec!(2600) + dec!(72.875) * dec!(3));
    }

    #[test]
    fn asset_value_grows_outside_the_recent_window() {
        let ledger = AssetLedger {
            asset: bond_asset(),
            transactions: vec![buy(date(2023, 1, 1), dec!(1), dec!(2500))],
            latest_price: Some(latest(date(2024, 12, 1), dec!(2900))),
        };
        let config = EvolutionConfig::default();

        let curve =
            calculate_wealth_curve(&[ledger], date(2023, 1, 1), date(2024, 12, 31), &config);

        let first = &curve[0];
        assert_eq!(first.asset_value, dec!(2500));

        let early = curve.iter().find(|p| p.date == date(2023, 8, 1)).unwrap();
        assert!(early.asset_value > dec!(2500));
        assert!(early.asset_value < dec!(2900));

        let last = curve.last().unwrap();
        assert_eq!(last.asset_value, dec!(2900));
    }

    #[test]
    fn invested_total_is_signed_and_not_clamped() {
        let sell = Transaction {
            transaction_type: TransactionType::Sell,
            quantity: dec!(2),
            unit_price: dec!(2000),
            ..buy(date(2024, 2, 1), dec!(2), dec!(2000))
        };
        let ledger = AssetLedger {
            asset: Asset {
                pays_semiannual_interest: false,
                ..bond_asset()
            },
            transactions: vec![buy(date(2024, 1, 1), dec!(1), dec!(1000)), sell],
            latest_price: None,
        };
        let config = EvolutionConfig::default();

        let curve =
            calculate_wealth_curve(&[ledger], date(2024, 1, 1), date(2024, 3, 1), &config);

        // 1000 bought minus 4000 sold.
        assert!(curve.iter().all(|p| p.invested == dec!(-3000)));
    }

    #[test]
    fn empty_window_produces_empty_curve() {
        let config = EvolutionConfig::default();
        assert!(
            calculate_wealth_curve(&[], date(2024, 2, 1), date(2024, 1, 1), &config).is_empty()
        );
    }
}
