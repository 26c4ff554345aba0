use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::portfolio_model::AssetPosition;
use crate::assets::Asset;
use crate::prices::PricePoint;
use crate::transactions::{Transaction, TransactionType};

/// Folds an asset's full transaction list into its current position.
///
/// The cost basis accumulates from buys only: sells reduce the quantity but
/// never the average price or the invested total. This intentionally differs
/// from the history replay in `history_calculator`, which rescales the cost
/// basis proportionally on each sell; the two call sites have different
/// semantics and must stay separate.
///
/// Transactions must be pre-sorted ascending by date. Returns `None` when the
/// asset has no transactions. Without a price, value and return fields are
/// `None` while quantity and cost fields stay populated.
pub fn calculate_position(
    asset: &Asset,
    transactions: &[Transaction],
    latest_price: Option<&PricePoint>,
) -> Option<AssetPosition> {
    if transactions.is_empty() {
        return None;
    }

    let mut quantity = Decimal::ZERO;
    let mut total_quantity_bought = Decimal::ZERO;
    let mut total_cost_bought = Decimal::ZERO;

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Buy => {
                quantity += transaction.quantity;
                total_quantity_bought += transaction.quantity;
                total_cost_bought += transaction.quantity * transaction.unit_price;
            }
            TransactionType::Sell => {
                quantity -= transaction.quantity;
            }
        }
    }

    let average_price = if total_quantity_bought > Decimal::ZERO {
        total_cost_bought / total_quantity_bought
    } else {
        Decimal::ZERO
    };
    let total_invested = total_cost_bought;

    let current_price = latest_price.map(|p| p.price);
    let current_total = current_price.map(|price| quantity * price);
    let absolute_return = current_total.map(|current| current - total_invested);
    let percent_return = absolute_return.and_then(|absolute| {
        if total_invested > Decimal::ZERO {
            Some(absolute / total_invested * dec!(100))
        } else {
            None
        }
    });

    Some(AssetPosition {
        asset: asset.clone(),
        quantity,
        average_price,
        total_invested,
        current_price,
        current_total,
        absolute_return,
        percent_return,
        last_dividend_yield: latest_price.and_then(|p| p.dividend_yield),
    })
}
