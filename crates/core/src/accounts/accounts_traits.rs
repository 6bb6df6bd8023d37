//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Creates a new account.
    async fn create(&self, new_account: NewAccount) -> Result<Account>;

    /// Updates an existing account's mutable attributes. The balance is not
    /// among them; it belongs to the balance accumulator.
    async fn update(&self, account_update: AccountUpdate) -> Result<Account>;

    /// Deletes an account and returns the removed record.
    ///
    /// Fails with a foreign-key violation while ledger entries or trades
    /// still reference the account.
    async fn delete(&self, account_id: &str) -> Result<Account>;

    /// Retrieves an account by its ID.
    fn get_by_id(&self, account_id: &str) -> Result<Account>;

    /// Lists all accounts owned by a user.
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Account>>;
}

/// Trait defining the contract for Account service operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Creates a new account with business validation.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;

    /// Updates an existing account with business validation.
    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account>;

    /// Deletes an account and returns the removed record.
    async fn delete_account(&self, account_id: &str) -> Result<Account>;

    /// Retrieves an account by ID.
    fn get_account(&self, account_id: &str) -> Result<Account>;

    /// Lists all accounts owned by a user.
    fn list_accounts_by_user(&self, user_id: &str) -> Result<Vec<Account>>;
}
