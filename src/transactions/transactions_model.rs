use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::transactions_errors::{Result, TransactionError};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }
}

impl FromStr for TransactionType {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            other => Err(TransactionError::InvalidData(format!(
                "Unknown transaction type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model representing an atomic buy or sell event for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub asset_id: String,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fees: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Signed quantity contribution of this entry to a running balance.
    pub fn signed_quantity(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Buy => self.quantity,
            TransactionType::Sell => -self.quantity,
        }
    }

    /// Signed cash flow of this entry (positive for buys, negative for sells).
    pub fn signed_cash_flow(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Buy => self.quantity * self.unit_price,
            TransactionType::Sell => -(self.quantity * self.unit_price),
        }
    }
}

/// Input model for creating a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub id: Option<String>,
    pub asset_id: String,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fees: Option<Decimal>,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Validates the new transaction data
    pub fn validate(&self) -> Result<()> {
        validate_entry(
            &self.asset_id,
            self.date,
            self.quantity,
            self.unit_price,
            self.fees,
        )
    }
}

/// Input model for updating an existing transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub asset_id: String,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fees: Option<Decimal>,
    pub notes: Option<String>,
}

impl TransactionUpdate {
    /// Validates the transaction update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Transaction ID cannot be empty".to_string(),
            ));
        }
        validate_entry(
            &self.asset_id,
            self.date,
            self.quantity,
            self.unit_price,
            self.fees,
        )
    }
}

fn validate_entry(
    asset_id: &str,
    date: NaiveDate,
    quantity: Decimal,
    unit_price: Decimal,
    fees: Option<Decimal>,
) -> Result<()> {
    if asset_id.trim().is_empty() {
        return Err(TransactionError::InvalidData(
            "Asset ID cannot be empty".to_string(),
        ));
    }
    if quantity <= Decimal::ZERO {
        return Err(TransactionError::InvalidData(
            "Quantity must be positive".to_string(),
        ));
    }
    if unit_price <= Decimal::ZERO {
        return Err(TransactionError::InvalidData(
            "Unit price must be positive".to_string(),
        ));
    }
    if let Some(fees) = fees {
        if fees < Decimal::ZERO {
            return Err(TransactionError::InvalidData(
                "Fees cannot be negative".to_string(),
            ));
        }
    }
    if date > Utc::now().date_naive() {
        return Err(TransactionError::InvalidData(
            "Transaction date cannot be in the future".to_string(),
        ));
    }
    Ok(())
}
