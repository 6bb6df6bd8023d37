use log::debug;
use std::sync::Arc;

use super::transactions_model::{
    NewTransaction, Transaction, TransactionFilters, TransactionUpdate,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::errors::Result;

/// Service for managing ledger entries.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    /// Creates a new TransactionService instance.
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        debug!(
            "Recording {} of {} for account {}",
            new_transaction.transaction_type.as_str(),
            new_transaction.amount,
            new_transaction.account_id
        );
        self.repository.create(new_transaction).await
    }

    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;
        debug!("Amending transaction {}", update.id);
        self.repository.update(update).await
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        debug!("Removing transaction {}", transaction_id);
        self.repository.delete(transaction_id).await
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get_by_id(transaction_id)
    }

    fn list_transactions_by_account(
        &self,
        account_id: &str,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>> {
        self.repository.list_by_account(account_id, filters)
    }
}
