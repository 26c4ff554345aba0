use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::transactions_errors::{Result, TransactionError};
use super::transactions_model::{
    NewTransaction, Transaction, TransactionType, TransactionUpdate,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};

/// Service enforcing the ledger balance invariant: replaying an asset's
/// transactions in ascending date order must never drive the cumulative
/// quantity negative at any prefix. Mutations that would violate this for
/// any date, including dates after the mutated entry, are rejected before
/// they reach the repository.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        TransactionService { repository }
    }

    fn sorted_ledger(&self, asset_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions = self.repository.get_by_asset(asset_id)?;
        sort_ledger(&mut transactions);
        Ok(transactions)
    }
}

/// Ascending by date; entries on the same day keep insertion order.
pub fn sort_ledger(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
}

/// Date of the first prefix whose running balance dips below zero, if any.
pub fn first_negative_prefix(transactions: &[Transaction]) -> Option<NaiveDate> {
    let mut balance = Decimal::ZERO;
    for transaction in transactions {
        balance += transaction.signed_quantity();
        if balance < Decimal::ZERO {
            return Some(transaction.date);
        }
    }
    None
}

/// Largest quantity that could be sold on `date` without driving the balance
/// negative on that date or on any later prefix. A sell placed after all
/// entries dated <= `date` reduces every subsequent prefix equally, so the
/// bound is the minimum of the as-of-date balance and all later balances.
pub fn available_for_sale(transactions: &[Transaction], date: NaiveDate) -> Decimal {
    let mut balance = Decimal::ZERO;
    let mut as_of_date = Decimal::ZERO;
    let mut later_min: Option<Decimal> = None;
    for transaction in transactions {
        balance += transaction.signed_quantity();
        if transaction.date <= date {
            as_of_date = balance;
        } else {
            later_min = Some(match later_min {
                Some(current) if current <= balance => current,
                _ => balance,
            });
        }
    }
    match later_min {
        Some(min) if min < as_of_date => min,
        _ => as_of_date,
    }
}

impl TransactionServiceTrait for TransactionService {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get_by_id(transaction_id)
    }

    fn get_transactions_for_asset(&self, asset_id: &str) -> Result<Vec<Transaction>> {
        self.sorted_ledger(asset_id)
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.repository.get_all()
    }

    fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        if new_transaction.transaction_type == TransactionType::Sell {
            let ledger = self.sorted_ledger(&new_transaction.asset_id)?;
            let available = available_for_sale(&ledger, new_transaction.date);
            if new_transaction.quantity > available {
                return Err(TransactionError::InsufficientQuantity { available });
            }
        }

        let mut new_transaction = new_transaction;
        if new_transaction.id.is_none() {
            new_transaction.id = Some(Uuid::new_v4().to_string());
        }
        debug!(
            "Recording {} of {} for asset {} on {}",
            new_transaction.transaction_type,
            new_transaction.quantity,
            new_transaction.asset_id,
            new_transaction.date
        );
        self.repository.create(new_transaction)
    }

    fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;

        let original = self.repository.get_by_id(&update.id)?;

        // Moving the entry to another asset leaves a hole in the old ledger;
        // that ledger must stay valid too.
        if original.asset_id != update.asset_id {
            let old_ledger: Vec<Transaction> = self
                .sorted_ledger(&original.asset_id)?
                .into_iter()
                .filter(|t| t.id != update.id)
                .collect();
            if let Some(date) = first_negative_prefix(&old_ledger) {
                return Err(TransactionError::WouldBreakBalance { date });
            }
        }

        let mut hypothetical: Vec<Transaction> = self
            .sorted_ledger(&update.asset_id)?
            .into_iter()
            .filter(|t| t.id != update.id)
            .collect();

        if update.transaction_type == TransactionType::Sell {
            let available = available_for_sale(&hypothetical, update.date);
            if update.quantity > available {
                return Err(TransactionError::InsufficientQuantity { available });
            }
        }

        hypothetical.push(Transaction {
            id: update.id.clone(),
            asset_id: update.asset_id.clone(),
            transaction_type: update.transaction_type,
            date: update.date,
            quantity: update.quantity,
            unit_price: update.unit_price,
            fees: update.fees,
            notes: update.notes.clone(),
            created_at: original.created_at,
            updated_at: original.updated_at,
        });
        sort_ledger(&mut hypothetical);

        if let Some(date) = first_negative_prefix(&hypothetical) {
            return Err(TransactionError::WouldBreakBalance { date });
        }

        self.repository.update(update)
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let transaction = self.repository.get_by_id(transaction_id)?;
        let remaining: Vec<Transaction> = self
            .sorted_ledger(&transaction.asset_id)?
            .into_iter()
            .filter(|t| t.id != transaction_id)
            .collect();

        if let Some(date) = first_negative_prefix(&remaining) {
            return Err(TransactionError::WouldBreakBalance { date });
        }

        self.repository.delete(transaction_id)
    }

    fn available_quantity(&self, asset_id: &str) -> Result<Decimal> {
        let transactions = self.repository.get_by_asset(asset_id)?;
        Ok(transactions.iter().map(|t| t.signed_quantity()).sum())
    }
}
