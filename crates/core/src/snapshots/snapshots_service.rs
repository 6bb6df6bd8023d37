use chrono::{NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::snapshots_model::{AccountSnapshot, NewSnapshot, SnapshotUpdate};
use super::snapshots_traits::{SnapshotRepositoryTrait, SnapshotServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, Result};
use crate::trades::TradeRepositoryTrait;
use crate::transactions::{TransactionRepositoryTrait, TransactionType};
use crate::utils::time_utils::day_window_utc;

/// Service building and managing daily account snapshots.
///
/// The builder reads ledger entries, closed trades and the prior snapshot; it
/// never mutates the live account balance maintained by the accumulator.
pub struct SnapshotService {
    repository: Arc<dyn SnapshotRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    trade_repository: Arc<dyn TradeRepositoryTrait>,
}

impl SnapshotService {
    /// Creates a new SnapshotService instance.
    pub fn new(
        repository: Arc<dyn SnapshotRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        trade_repository: Arc<dyn TradeRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            account_repository,
            transaction_repository,
            trade_repository,
        }
    }

    /// Fails with `AccountNotFound` unless the account resolves.
    fn ensure_account_exists(&self, account_id: &str) -> Result<()> {
        self.account_repository
            .get_by_id(account_id)
            .map(|_| ())
            .map_err(|e| match e {
                Error::NotFound(_) => Error::AccountNotFound(account_id.to_string()),
                other => other,
            })
    }

    /// Fails with `DuplicateSnapshot` when the (account, day) key is already
    /// materialized. The storage unique constraint backs this check against
    /// racing builders.
    fn ensure_day_is_absent(&self, account_id: &str, date: NaiveDate) -> Result<()> {
        if self
            .repository
            .find_by_account_and_date(account_id, date)?
            .is_some()
        {
            return Err(Error::DuplicateSnapshot(format!(
                "account {} on {}",
                account_id, date
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotServiceTrait for SnapshotService {
    async fn create_snapshot(&self, new_snapshot: NewSnapshot) -> Result<AccountSnapshot> {
        new_snapshot.validate()?;
        self.ensure_account_exists(&new_snapshot.account_id)?;
        self.ensure_day_is_absent(&new_snapshot.account_id, new_snapshot.date)?;

        let now = Utc::now();
        let snapshot = AccountSnapshot {
            id: new_snapshot
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: new_snapshot.account_id,
            date: new_snapshot.date,
            balance: new_snapshot.balance,
            daily_pnl: new_snapshot.daily_pnl,
            deposits: new_snapshot.deposits,
            withdrawals: new_snapshot.withdrawals,
            notes: new_snapshot.notes,
            created_at: now,
            updated_at: now,
        };
        self.repository.create(snapshot).await
    }

    async fn build_snapshot(&self, account_id: &str, date: NaiveDate) -> Result<AccountSnapshot> {
        let (start, end) = day_window_utc(date);

        self.ensure_day_is_absent(account_id, date)?;
        self.ensure_account_exists(account_id)?;

        let closed_trades = self
            .trade_repository
            .get_closed_in_range(account_id, start, end)?;
        // Closed trades without a recorded P&L contribute zero.
        let daily_pnl: Decimal = closed_trades.iter().filter_map(|t| t.pnl).sum();

        let entries = self
            .transaction_repository
            .get_in_range(account_id, start, end)?;
        let mut deposits = Decimal::ZERO;
        let mut withdrawals = Decimal::ZERO;
        for entry in &entries {
            match entry.transaction_type {
                TransactionType::Deposit => deposits += entry.amount,
                TransactionType::Withdrawal => withdrawals += entry.amount,
            }
        }

        let previous_balance = self
            .repository
            .get_latest_before(account_id, date)?
            .map(|s| s.balance)
            .unwrap_or(Decimal::ZERO);

        let balance = previous_balance + deposits - withdrawals + daily_pnl;

        debug!(
            "Building snapshot for account {} on {}: previous {}, deposits {}, withdrawals {}, pnl {} => {}",
            account_id, date, previous_balance, deposits, withdrawals, daily_pnl, balance
        );

        let now = Utc::now();
        let snapshot = AccountSnapshot {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            date,
            balance,
            daily_pnl,
            deposits: (deposits > Decimal::ZERO).then_some(deposits),
            withdrawals: (withdrawals > Decimal::ZERO).then_some(withdrawals),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        self.repository.create(snapshot).await
    }

    async fn update_snapshot(&self, update: SnapshotUpdate) -> Result<AccountSnapshot> {
        update.validate()?;
        self.repository.update(update).await
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<AccountSnapshot> {
        debug!("Deleting snapshot {}", snapshot_id);
        self.repository.delete(snapshot_id).await
    }

    fn get_snapshot(&self, snapshot_id: &str) -> Result<AccountSnapshot> {
        self.repository.get_by_id(snapshot_id)
    }

    fn list_snapshots_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AccountSnapshot>> {
        self.repository
            .list_by_account(account_id, start_date, end_date)
    }
}
