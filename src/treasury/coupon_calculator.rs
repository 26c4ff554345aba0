use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::treasury_model::{PaymentStatus, SemiannualPayment, UpcomingPayment};
use crate::assets::{Asset, AssetType};
use crate::constants::{COUPON_MONTH_FIRST, COUPON_MONTH_SECOND, COUPON_PAYMENT_DAY};
use crate::transactions::{Transaction, TransactionType};

fn coupon_month_name(month: u32) -> &'static str {
    if month == COUPON_MONTH_FIRST {
        "January"
    } else {
        "July"
    }
}

fn coupon_date(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, COUPON_PAYMENT_DAY)
}

/// Every semiannual coupon a treasury position should have produced from the
/// first purchase through `reference_date`.
///
/// Coupons fall on January 15 and July 15. The first coupon after a purchase
/// in January through July is July of the same year; for later purchases it
/// is January of the following year. The amount is an estimate: net quantity
/// times the first purchase price times half the contracted annual rate,
/// applied uniformly to every historical coupon. Quantity changes between
/// coupons and later lots at different prices are not tracked.
pub fn semiannual_payment_schedule(
    asset: &Asset,
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> Vec<SemiannualPayment> {
    if !asset.pays_semiannual_interest || asset.asset_type != AssetType::TreasuryBond {
        return Vec::new();
    }

    let first_purchase = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Buy)
        .min_by_key(|t| t.date);
    let first_purchase = match first_purchase {
        Some(purchase) => purchase,
        None => return Vec::new(),
    };

    let net_quantity: Decimal = transactions.iter().map(|t| t.signed_quantity()).sum();
    if net_quantity <= Decimal::ZERO {
        return Vec::new();
    }

    let semiannual_rate = asset.rate.unwrap_or(Decimal::ZERO) / dec!(2) / dec!(100);
    let expected_amount = net_quantity * first_purchase.unit_price * semiannual_rate;

    let mut year = first_purchase.date.year();
    let mut month = if first_purchase.date.month() <= COUPON_MONTH_SECOND {
        COUPON_MONTH_SECOND
    } else {
        year += 1;
        COUPON_MONTH_FIRST
    };

    let mut payments = Vec::new();
    while year < reference_date.year()
        || (year == reference_date.year() && month <= reference_date.month())
    {
        if let Some(date) = coupon_date(year, month) {
            payments.push(SemiannualPayment {
                date,
                expected_amount,
                period: format!("{} {}", coupon_month_name(month), year),
                status: PaymentStatus::Estimated,
            });
        }

        if month == COUPON_MONTH_FIRST {
            month = COUPON_MONTH_SECOND;
        } else {
            month = COUPON_MONTH_FIRST;
            year += 1;
        }
    }

    payments.sort_by_key(|p| p.date);
    payments
}

/// The next two coupon dates expected after `reference_date`.
pub fn upcoming_payments(asset: &Asset, reference_date: NaiveDate) -> Vec<UpcomingPayment> {
    if !asset.pays_semiannual_interest {
        return Vec::new();
    }

    let year = reference_date.year();
    let month = reference_date.month();
    let mut upcoming = Vec::new();

    if month <= COUPON_MONTH_FIRST {
        if let Some(date) = coupon_date(year, COUPON_MONTH_FIRST) {
            upcoming.push(UpcomingPayment {
                date,
                period: format!("January {}", year),
            });
        }
    }
    if month <= COUPON_MONTH_SECOND {
        if let Some(date) = coupon_date(year, COUPON_MONTH_SECOND) {
            upcoming.push(UpcomingPayment {
                date,
                period: format!("July {}", year),
            });
        }
    }

    if upcoming.is_empty() {
        // Past July: both of next year's coupons are ahead.
        if let Some(date) = coupon_date(year + 1, COUPON_MONTH_FIRST) {
            upcoming.push(UpcomingPayment {
                date,
                period: format!("January {}", year + 1),
            });
        }
        if let Some(date) = coupon_date(year + 1, COUPON_MONTH_SECOND) {
            upcoming.push(UpcomingPayment {
                date,
                period: format!("July {}", year + 1),
            });
        }
    } else if upcoming.len() == 1 {
        if let Some(date) = coupon_date(year + 1, COUPON_MONTH_FIRST) {
            upcoming.push(UpcomingPayment {
                date,
                period: format!("January {}", year + 1),
            });
        }
    }

    upcoming.truncate(2);
    upcoming
}

/// Sum of all coupon amounts in a schedule.
pub fn total_payments(payments: &[SemiannualPayment]) -> Decimal {
    payments.iter().map(|p| p.expected_amount).sum()
}
