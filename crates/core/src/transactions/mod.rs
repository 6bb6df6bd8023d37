//! Ledger entries module - deposits and withdrawals against one account.
//!
//! The pure signed-amount/delta arithmetic of the balance accumulator lives
//! here; the atomic application of a delta to the stored balance is the
//! storage layer's job.

mod transactions_model;
mod transactions_service;
mod transactions_traits;



// Re-export the public interface
pub use transactions_model::{
    amend_delta, signed_amount, NewTransaction, Transaction, TransactionFilters, TransactionType,
    TransactionUpdate,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
