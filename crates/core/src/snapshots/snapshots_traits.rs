//! Snapshot repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::snapshots_model::{AccountSnapshot, NewSnapshot, SnapshotUpdate};
use crate::errors::Result;

/// Trait defining the contract for snapshot repository operations.
///
/// Implementations back the service's precondition check with a storage-level
/// unique constraint on (account, day): a racing insert for the same key must
/// fail with `DuplicateSnapshot` rather than persist a second row.
#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Persists a snapshot.
    ///
    /// Fails with `DuplicateSnapshot` when the (account, day) key is already
    /// materialized.
    async fn create(&self, snapshot: AccountSnapshot) -> Result<AccountSnapshot>;

    /// Applies a direct edit to a snapshot.
    async fn update(&self, update: SnapshotUpdate) -> Result<AccountSnapshot>;

    /// Removes a snapshot and returns the removed record.
    async fn delete(&self, snapshot_id: &str) -> Result<AccountSnapshot>;

    /// Retrieves a snapshot by its ID.
    fn get_by_id(&self, snapshot_id: &str) -> Result<AccountSnapshot>;

    /// The snapshot materialized for an (account, day) key, if any.
    fn find_by_account_and_date(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AccountSnapshot>>;

    /// The most recent snapshot strictly before `date` for the account.
    fn get_latest_before(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AccountSnapshot>>;

    /// An account's snapshots in ascending date order (chart order), with
    /// optional inclusive date bounds.
    fn list_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AccountSnapshot>>;
}

/// Trait defining the contract for snapshot service operations.
#[async_trait]
pub trait SnapshotServiceTrait: Send + Sync {
    /// Records a snapshot supplied by the caller.
    async fn create_snapshot(&self, new_snapshot: NewSnapshot) -> Result<AccountSnapshot>;

    /// Builds the snapshot for an (account, day) key from that day's ledger
    /// entries and closed trades plus the previous snapshot's balance.
    async fn build_snapshot(&self, account_id: &str, date: NaiveDate) -> Result<AccountSnapshot>;

    /// Applies a direct edit; dependent snapshots are not re-derived.
    async fn update_snapshot(&self, update: SnapshotUpdate) -> Result<AccountSnapshot>;

    /// Removes a snapshot.
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<AccountSnapshot>;

    /// Retrieves a snapshot by ID.
    fn get_snapshot(&self, snapshot_id: &str) -> Result<AccountSnapshot>;

    /// Lists an account's snapshots in ascending date order.
    fn list_snapshots_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AccountSnapshot>>;
}
