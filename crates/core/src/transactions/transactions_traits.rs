//! Ledger entry repository and service traits.
//!
//! The repository contract couples every entry mutation to exactly one
//! balance adjustment: implementations must persist the entry and apply the
//! corresponding signed delta to the account balance as one atomic unit.
//! Partial application (entry persisted but balance not adjusted, or vice
//! versa) is the failure mode this contract exists to rule out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::transactions_model::{
    NewTransaction, Transaction, TransactionFilters, TransactionUpdate,
};
use crate::errors::Result;

/// Trait defining the contract for ledger entry repository operations.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Persists a new ledger entry and applies its signed amount to the
    /// account balance in the same atomic unit.
    ///
    /// Fails with `AccountNotFound` when the referenced account is missing;
    /// nothing is persisted in that case.
    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Amends an entry and applies the compensating balance delta in the
    /// same atomic unit. The original entry is read before being
    /// overwritten.
    async fn update(&self, update: TransactionUpdate) -> Result<Transaction>;

    /// Reverses the entry's balance effect, then removes it. Returns the
    /// removed entry.
    async fn delete(&self, transaction_id: &str) -> Result<Transaction>;

    /// Retrieves a ledger entry by its ID.
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    /// Lists an account's ledger entries, newest first.
    fn list_by_account(
        &self,
        account_id: &str,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>>;

    /// Entries with `start <= date < end` for one account, used by the
    /// snapshot builder.
    fn get_in_range(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;
}

/// Trait defining the contract for ledger entry service operations.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Records a deposit or withdrawal and adjusts the account balance.
    ///
    /// No overdraft check is performed: a withdrawal larger than the current
    /// balance is accepted and drives the balance negative.
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Amends an entry with a compensating balance adjustment.
    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;

    /// Removes an entry, reversing its balance effect first.
    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    /// Retrieves a ledger entry by ID.
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    /// Lists an account's ledger entries, newest first.
    fn list_transactions_by_account(
        &self,
        account_id: &str,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>>;
}
