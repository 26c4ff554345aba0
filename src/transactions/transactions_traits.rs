use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::transactions_errors::Result;
use super::transactions_model::{NewTransaction, Transaction, TransactionUpdate};

/// Trait defining the contract for Transaction repository operations.
///
/// Per-asset listings are returned ascending by date; the calculators rely
/// on this ordering.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;
    fn get_by_asset(&self, asset_id: &str) -> Result<Vec<Transaction>>;
    fn get_all(&self) -> Result<Vec<Transaction>>;
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    fn update(&self, update: TransactionUpdate) -> Result<Transaction>;
    fn delete(&self, transaction_id: &str) -> Result<Transaction>;
    /// Removes every transaction. Only the backup restore path uses this.
    fn delete_all(&self) -> Result<()>;
    /// Date of the earliest transaction across the whole portfolio.
    fn first_transaction_date(&self) -> Result<Option<NaiveDate>>;
}

/// Trait defining the contract for Transaction service operations.
pub trait TransactionServiceTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn get_transactions_for_asset(&self, asset_id: &str) -> Result<Vec<Transaction>>;
    fn list_transactions(&self) -> Result<Vec<Transaction>>;
    fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    /// Net quantity currently held for the asset.
    fn available_quantity(&self, asset_id: &str) -> Result<Decimal>;
}
