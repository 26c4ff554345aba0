use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::treasury_constants::{
    ANNUAL_INFLATION_BY_YEAR, DEFAULT_ANNUAL_INFLATION, TREASURY_FACE_VALUE,
};
use super::treasury_model::AccumulatedReturn;
use crate::assets::Asset;
use crate::constants::{COUPON_MONTH_FIRST, COUPON_MONTH_SECOND, COUPON_PAYMENT_DAY, DAYS_PER_YEAR};

/// Annual inflation estimate for a year, in percent. Falls back to a flat
/// estimate when the year is absent from the historical table.
pub fn estimated_annual_inflation(year: i32) -> Decimal {
    ANNUAL_INFLATION_BY_YEAR
        .get(&year)
        .copied()
        .unwrap_or(DEFAULT_ANNUAL_INFLATION)
}

/// Annualized dividend-yield estimate for an inflation-indexed treasury bond,
/// in percent: contracted real rate plus the year's inflation estimate.
///
/// The expected annual income is taken as a fraction of the current price,
/// then expressed as a percentage of that same price, so the estimate is
/// independent of the quoted price. Returns `None` unless the asset is an
/// inflation-indexed treasury bond with a contracted rate and maturity, or
/// when no positive price is available.
pub fn inflation_linked_yield(
    asset: &Asset,
    current_price: Decimal,
    reference_date: NaiveDate,
) -> Option<Decimal> {
    if !asset.is_inflation_indexed_treasury() {
        return None;
    }
    if current_price <= Decimal::ZERO {
        return None;
    }
    let rate = asset.rate?;

    let total_rate = rate + estimated_annual_inflation(reference_date.year());

    let annual_income = (current_price * total_rate) / dec!(100);
    let dividend_yield = (annual_income / current_price) * dec!(100);

    Some(dividend_yield)
}

/// Variant for bonds paying coupons semiannually: half the total rate for
/// each of the year's coupon dates still ahead of the reference date. When
/// none remain this calendar year, the next cycle's two coupons are counted.
/// Like the annual variant, the result is independent of the quoted price.
pub fn inflation_linked_yield_semiannual(
    asset: &Asset,
    current_price: Decimal,
    reference_date: NaiveDate,
) -> Option<Decimal> {
    if !asset.is_inflation_indexed_treasury() || !asset.pays_semiannual_interest {
        return None;
    }
    if current_price <= Decimal::ZERO {
        return None;
    }
    let rate = asset.rate?;

    let total_rate = rate + estimated_annual_inflation(reference_date.year());

    let year = reference_date.year();
    let remaining = [COUPON_MONTH_FIRST, COUPON_MONTH_SECOND]
        .iter()
        .filter_map(|&month| NaiveDate::from_ymd_opt(year, month, COUPON_PAYMENT_DAY))
        .filter(|date| *date >= reference_date)
        .count();
    let remaining = if remaining == 0 { 2 } else { remaining };

    let income = current_price * (total_rate / dec!(2)) / dec!(100) * Decimal::from(remaining as i64);
    let dividend_yield = (income / current_price) * dec!(100);

    Some(dividend_yield)
}

/// Inflation accumulated between two dates, in percent, summing the yearly
/// table values with half weight for the boundary years. Years absent from
/// the table contribute nothing.
pub fn accumulated_inflation(from_date: NaiveDate, to_date: NaiveDate) -> Decimal {
    let mut accumulated = Decimal::ZERO;
    for year in from_date.year()..=to_date.year() {
        if let Some(rate) = ANNUAL_INFLATION_BY_YEAR.get(&year) {
            if year == from_date.year() || year == to_date.year() {
                accumulated += rate * dec!(0.5);
            } else {
                accumulated += rate;
            }
        }
    }
    accumulated
}

/// Compounded return of an inflation-indexed bond since purchase: the fixed
/// real rate compounded over the holding period, combined with the
/// accumulated inflation estimate via `(1+real)(1+inflation)-1`.
pub fn accumulated_return(
    asset: &Asset,
    purchase_date: NaiveDate,
    current_date: NaiveDate,
) -> Option<AccumulatedReturn> {
    if !asset.is_inflation_indexed_treasury() {
        return None;
    }
    let rate = asset.rate?;

    let years_held = (current_date - purchase_date).num_days() as f64 / DAYS_PER_YEAR;

    let real_return = (Decimal::ONE + rate / dec!(100)).powf(years_held) - Decimal::ONE;

    let inflation_return = accumulated_inflation(purchase_date, current_date) / dec!(100);

    let total_return =
        (Decimal::ONE + real_return) * (Decimal::ONE + inflation_return) - Decimal::ONE;

    Some(AccumulatedReturn {
        real_return: real_return * dec!(100),
        inflation_return: inflation_return * dec!(100),
        total_return: total_return * dec!(100),
    })
}

/// Present-value estimate of an inflation-indexed bond: the face value
/// discounted at the contracted real rate plus the inflation estimate over
/// the time remaining to maturity. Face value at or past maturity.
pub fn theoretical_price(asset: &Asset, reference_date: NaiveDate) -> Option<Decimal> {
    if !asset.is_inflation_indexed_treasury() {
        return None;
    }
    let rate = asset.rate?;
    let maturity = asset.maturity?;

    let time_to_maturity = (maturity - reference_date).num_days() as f64 / DAYS_PER_YEAR;
    if time_to_maturity <= 0.0 {
        return Some(TREASURY_FACE_VALUE);
    }

    let total_rate =
        rate / dec!(100) + estimated_annual_inflation(reference_date.year()) / dec!(100);
    let discount = (Decimal::ONE + total_rate).powf(time_to_maturity);
    if discount <= Decimal::ZERO {
        return None;
    }

    Some(TREASURY_FACE_VALUE / discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetType, Currency, IndexKind};
    use chrono::Utc;

    fn treasury_asset() -> Asset {
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
            pays_semiannual_interest: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn yield_is_rate_plus_table_inflation() {
        let asset = treasury_asset();
        // 5.83 + 4.62 (2023 table value)
        let result = inflation_linked_yield(&asset, dec!(2800.50), date(2023, 6, 1)).unwrap();
        assert_eq!(result, dec!(10.45));
    }

    #[test]
    fn yield_is_independent_of_price() {
        let asset = treasury_asset();
        let reference = date(2023, 6, 1);
        let at_low = inflation_linked_yield(&asset, dec!(100), reference).unwrap();
        let at_high = inflation_linked_yield(&asset, dec!(9876.54), reference).unwrap();
        assert_eq!(at_low, at_high);
        assert_eq!(at_low, dec!(10.45));
    }

    #[test]
    fn yield_uses_default_inflation_for_unknown_years() {
        let asset = treasury_asset();
        let result = inflation_linked_yield(&asset, dec!(2500), date(2031, 1, 1)).unwrap();
        assert_eq!(result, dec!(5.83) + DEFAULT_ANNUAL_INFLATION);
    }

    #[test]
    fn yield_not_applicable_outside_preconditions() {
        let mut stock = treasury_asset();
        stock.asset_type = AssetType::DomesticStock;
        assert!(inflation_linked_yield(&stock, dec!(100), date(2023, 6, 1)).is_none());

        let mut no_rate = treasury_asset();
        no_rate.rate = None;
        assert!(inflation_linked_yield(&no_rate, dec!(100), date(2023, 6, 1)).is_none());

        let mut cdi_indexed = treasury_asset();
        cdi_indexed.index = Some(IndexKind::Cdi);
        assert!(inflation_linked_yield(&cdi_indexed, dec!(100), date(2023, 6, 1)).is_none());

        assert!(inflation_linked_yield(&treasury_asset(), Decimal::ZERO, date(2023, 6, 1))
            .is_none());
    }

    #[test]
    fn semiannual_yield_counts_remaining_coupons() {
        let mut asset = treasury_asset();
        asset.pays_semiannual_interest = true;
        let half_total = (dec!(5.83) + dec!(4.62)) / dec!(2);

        // Before Jan 15: both coupons ahead.
        let both = inflation_linked_yield_semiannual(&asset, dec!(2500), date(2023, 1, 10));
        assert_eq!(both.unwrap(), half_total * dec!(2));

        // Between the coupons: only July ahead.
        let one = inflation_linked_yield_semiannual(&asset, dec!(2500), date(2023, 3, 1));
        assert_eq!(one.unwrap(), half_total);

        // After July 15: none left this year, next cycle's two count.
        let next_cycle = inflation_linked_yield_semiannual(&asset, dec!(2500), date(2023, 9, 1));
        assert_eq!(next_cycle.unwrap(), half_total * dec!(2));
    }

    #[test]
    fn semiannual_yield_requires_coupon_flag() {
        let asset = treasury_asset();
        assert!(
            inflation_linked_yield_semiannual(&asset, dec!(2500), date(2023, 3, 1)).is_none()
        );
    }

    #[test]
    fn accumulated_inflation_half_weights_boundary_years() {
        // 2021 and 2023 at half weight, 2022 in full.
        let expected = dec!(10.06) * dec!(0.5) + dec!(5.79) + dec!(4.62) * dec!(0.5);
        assert_eq!(
            accumulated_inflation(date(2021, 3, 1), date(2023, 10, 1)),
            expected
        );

        // Single-year span: one half-weight contribution.
        assert_eq!(
            accumulated_inflation(date(2022, 1, 1), date(2022, 12, 1)),
            dec!(5.79) * dec!(0.5)
        );
    }

    #[test]
    fn accumulated_return_combines_real_and_inflation() {
        let asset = treasury_asset();
        let result = accumulated_return(&asset, date(2021, 1, 1), date(2023, 1, 1)).unwrap();

        assert!(result.real_return > Decimal::ZERO);
        assert!(result.inflation_return > Decimal::ZERO);

        // total = (1+real)(1+inflation)-1, so it exceeds the sum of parts.
        let parts_sum = result.real_return + result.inflation_return;
        assert!(result.total_return > parts_sum);
    }

    #[test]
    fn theoretical_price_discounts_to_face_value() {
        let asset = treasury_asset();
        let price = theoretical_price(&asset, date(2024, 8, 15)).unwrap();
        assert!(price < TREASURY_FACE_VALUE);
        assert!(price > Decimal::ZERO);

        let at_maturity = theoretical_price(&asset, date(2029, 8, 15)).unwrap();
        assert_eq!(at_maturity, TREASURY_FACE_VALUE);
    }
}
