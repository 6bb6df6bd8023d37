use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::debug;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::account_snapshots;
use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{Error, Result};
use tradebook_core::snapshots::{
    AccountSnapshot, SnapshotRepositoryTrait, SnapshotUpdate,
};

use super::model::{SnapshotDB, DATE_FORMAT};

/// Repository for managing snapshot rows.
///
/// The unique index on (account_id, date) backs the service's duplicate
/// check: a racing insert for the same key surfaces as `DuplicateSnapshot`
/// instead of persisting a second row.
pub struct SnapshotRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository instance.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Maps the (account_id, date) unique-index violation to `DuplicateSnapshot`;
/// everything else converts through the usual storage error path.
fn map_snapshot_insert_error(err: DieselError, account_id: &str, date: &str) -> Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            Error::DuplicateSnapshot(format!("account {} on {}", account_id, date))
        }
        other => StorageError::from(other).into(),
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for SnapshotRepository {
    async fn create(&self, snapshot: AccountSnapshot) -> Result<AccountSnapshot> {
        let snapshot_db: SnapshotDB = snapshot.into();
        debug!(
            "Persisting snapshot for account {} on {}",
            snapshot_db.account_id, snapshot_db.date
        );

        self.writer
            .exec(move |conn| {
                diesel::insert_into(account_snapshots::table)
                    .values(&snapshot_db)
                    .execute(conn)
                    .map_err(|e| {
                        map_snapshot_insert_error(e, &snapshot_db.account_id, &snapshot_db.date)
                    })?;

                snapshot_db.try_into()
            })
            .await
    }

    async fn update(&self, update: SnapshotUpdate) -> Result<AccountSnapshot> {
        self.writer
            .exec(move |conn| {
                let mut existing = account_snapshots::table
                    .select(SnapshotDB::as_select())
                    .find(&update.id)
                    .first::<SnapshotDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Snapshot {}", update.id)))?;

                if let Some(date) = update.date {
                    existing.date = date.format(DATE_FORMAT).to_string();
                }
                if let Some(balance) = update.balance {
                    existing.balance = balance.round_dp(DECIMAL_PRECISION).to_string();
                }
                if let Some(daily_pnl) = update.daily_pnl {
                    existing.daily_pnl = daily_pnl.round_dp(DECIMAL_PRECISION).to_string();
                }
                if let Some(deposits) = update.deposits {
                    existing.deposits = Some(deposits.round_dp(DECIMAL_PRECISION).to_string());
                }
                if let Some(withdrawals) = update.withdrawals {
                    existing.withdrawals =
                        Some(withdrawals.round_dp(DECIMAL_PRECISION).to_string());
                }
                if let Some(notes) = update.notes {
                    existing.notes = Some(notes);
                }
                existing.updated_at = Utc::now().naive_utc();

                diesel::update(account_snapshots::table.find(&existing.id))
                    .set((
                        account_snapshots::date.eq(existing.date.clone()),
                        account_snapshots::balance.eq(existing.balance.clone()),
                        account_snapshots::daily_pnl.eq(existing.daily_pnl.clone()),
                        account_snapshots::deposits.eq(existing.deposits.clone()),
                        account_snapshots::withdrawals.eq(existing.withdrawals.clone()),
                        account_snapshots::notes.eq(existing.notes.clone()),
                        account_snapshots::updated_at.eq(existing.updated_at),
                    ))
                    .execute(conn)
                    .map_err(|e| {
                        // Moving a snapshot onto an already-materialized day
                        // trips the same unique index as an insert.
                        map_snapshot_insert_error(e, &existing.account_id, &existing.date)
                    })?;

                existing.try_into()
            })
            .await
    }

    async fn delete(&self, snapshot_id: &str) -> Result<AccountSnapshot> {
        let id_owned = snapshot_id.to_string();
        self.writer
            .exec(move |conn| {
                let existing = account_snapshots::table
                    .select(SnapshotDB::as_select())
                    .find(&id_owned)
                    .first::<SnapshotDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Snapshot {}", id_owned)))?;

                diesel::delete(account_snapshots::table.find(&id_owned))
                    .execute(conn)
                    .into_core()?;

                existing.try_into()
            })
            .await
    }

    fn get_by_id(&self, snapshot_id: &str) -> Result<AccountSnapshot> {
        let mut conn = get_connection(&self.pool)?;

        account_snapshots::table
            .select(SnapshotDB::as_select())
            .find(snapshot_id)
            .first::<SnapshotDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Snapshot {}", snapshot_id)))?
            .try_into()
    }

    fn find_by_account_and_date(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AccountSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        account_snapshots::table
            .filter(account_snapshots::account_id.eq(account_id))
            .filter(account_snapshots::date.eq(date.format(DATE_FORMAT).to_string()))
            .select(SnapshotDB::as_select())
            .first::<SnapshotDB>(&mut conn)
            .optional()
            .into_core()?
            .map(AccountSnapshot::try_from)
            .transpose()
    }

    fn get_latest_before(
        &self,
        account_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AccountSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        account_snapshots::table
            .filter(account_snapshots::account_id.eq(account_id))
            .filter(account_snapshots::date.lt(date.format(DATE_FORMAT).to_string()))
            .order(account_snapshots::date.desc())
            .select(SnapshotDB::as_select())
            .first::<SnapshotDB>(&mut conn)
            .optional()
            .into_core()?
            .map(AccountSnapshot::try_from)
            .transpose()
    }

    fn list_by_account(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AccountSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = account_snapshots::table
            .filter(account_snapshots::account_id.eq(account_id))
            .into_boxed();

        if let Some(start) = start_date {
            query = query.filter(account_snapshots::date.ge(start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = end_date {
            query = query.filter(account_snapshots::date.le(end.format(DATE_FORMAT).to_string()));
        }

        // Ascending date order: the shape chart consumers expect.
        query
            .select(SnapshotDB::as_select())
            .order(account_snapshots::date.asc())
            .load::<SnapshotDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(AccountSnapshot::try_from)
            .collect()
    }
}
