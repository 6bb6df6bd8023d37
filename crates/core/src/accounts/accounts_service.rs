use log::debug;
use std::sync::Arc;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::Result;

/// Service for managing accounts.
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    /// Creates a new AccountService instance.
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!(
            "Creating account '{}' for user {}",
            new_account.name, new_account.user_id
        );
        new_account.validate()?;
        self.repository.create(new_account).await
    }

    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;
        self.repository.update(account_update).await
    }

    async fn delete_account(&self, account_id: &str) -> Result<Account> {
        debug!("Deleting account {}", account_id);
        self.repository.delete(account_id).await
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    fn list_accounts_by_user(&self, user_id: &str) -> Result<Vec<Account>> {
        self.repository.list_by_user(user_id)
    }
}
