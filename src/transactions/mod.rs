pub(crate) mod transactions_errors;
pub(crate) mod transactions_model;
pub(crate) mod transactions_service;
pub(crate) mod transactions_traits;

// Re-export the public interface
pub use transactions_model::{NewTransaction, Transaction, TransactionType, TransactionUpdate};
pub use transactions_service::{
    available_for_sale, first_negative_prefix, sort_ledger, TransactionService,
};
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};

// Re-export error types for convenience
pub use transactions_errors::{Result, TransactionError};
