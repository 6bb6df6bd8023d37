use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use crate::accounts::{apply_balance_delta, ensure_account_exists};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::trades;
use tradebook_core::errors::{Error, Result};
use tradebook_core::trades::{Trade, TradeRepositoryTrait, TradeStatus};

use super::model::TradeDB;

/// Repository for managing trade rows.
///
/// The close and delete paths touch the account balance; they run as single
/// write-actor jobs so the trade write and the P&L application commit or
/// roll back together.
pub struct TradeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TradeRepository {
    /// Creates a new TradeRepository instance.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl TradeRepositoryTrait for TradeRepository {
    async fn insert(&self, trade: Trade) -> Result<Trade> {
        let trade_db: TradeDB = trade.into();
        debug!(
            "Inserting trade {} for account {}",
            trade_db.id, trade_db.account_id
        );

        self.writer
            .exec(move |conn| {
                ensure_account_exists(conn, &trade_db.account_id)?;

                diesel::insert_into(trades::table)
                    .values(&trade_db)
                    .execute(conn)
                    .into_core()?;

                trade_db.try_into()
            })
            .await
    }

    async fn update(&self, trade: Trade) -> Result<Trade> {
        let trade_db: TradeDB = trade.into();

        self.writer
            .exec(move |conn| {
                let affected = diesel::update(trades::table.find(&trade_db.id))
                    .set(&trade_db)
                    .execute(conn)
                    .into_core()?;
                if affected == 0 {
                    return Err(Error::NotFound(format!("Trade {}", trade_db.id)));
                }

                trade_db.try_into()
            })
            .await
    }

    async fn close(&self, trade: Trade) -> Result<Trade> {
        let pnl_delta = trade.pnl.unwrap_or_default();
        let trade_db: TradeDB = trade.into();

        self.writer
            .exec(move |conn| {
                let current = trades::table
                    .select(TradeDB::as_select())
                    .find(&trade_db.id)
                    .first::<TradeDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Trade {}", trade_db.id)))?;

                // The service checked the status before computing the close;
                // re-check under the write lock to catch racing closers.
                if current.status != TradeStatus::Open.as_str() {
                    return Err(Error::Conflict(format!(
                        "Trade {} is no longer open (status: {})",
                        trade_db.id, current.status
                    )));
                }

                diesel::update(trades::table.find(&trade_db.id))
                    .set(&trade_db)
                    .execute(conn)
                    .into_core()?;

                apply_balance_delta(conn, &trade_db.account_id, pnl_delta)?;

                trade_db.try_into()
            })
            .await
    }

    async fn cancel(&self, trade_id: &str) -> Result<Trade> {
        let id_owned = trade_id.to_string();
        self.writer
            .exec(move |conn| {
                let mut current = trades::table
                    .select(TradeDB::as_select())
                    .find(&id_owned)
                    .first::<TradeDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Trade {}", id_owned)))?;

                if current.status != TradeStatus::Open.as_str() {
                    return Err(Error::Conflict(format!(
                        "Trade {} is no longer open (status: {})",
                        id_owned, current.status
                    )));
                }

                let now = Utc::now().naive_utc();
                diesel::update(trades::table.find(&id_owned))
                    .set((
                        trades::status.eq(TradeStatus::Cancelled.as_str()),
                        trades::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .into_core()?;

                current.status = TradeStatus::Cancelled.as_str().to_string();
                current.updated_at = now;
                current.try_into()
            })
            .await
    }

    async fn delete(&self, trade_id: &str) -> Result<Trade> {
        let id_owned = trade_id.to_string();
        self.writer
            .exec(move |conn| {
                let existing: Trade = trades::table
                    .select(TradeDB::as_select())
                    .find(&id_owned)
                    .first::<TradeDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Trade {}", id_owned)))?
                    .try_into()?;

                // A closed trade already moved the balance; reverse that
                // before the record disappears.
                if existing.status == TradeStatus::Closed {
                    if let Some(pnl) = existing.pnl {
                        if !pnl.is_zero() {
                            apply_balance_delta(conn, &existing.account_id, -pnl)?;
                        }
                    }
                }

                diesel::delete(trades::table.find(&id_owned))
                    .execute(conn)
                    .into_core()?;

                Ok(existing)
            })
            .await
    }

    fn get_by_id(&self, trade_id: &str) -> Result<Trade> {
        let mut conn = get_connection(&self.pool)?;

        trades::table
            .select(TradeDB::as_select())
            .find(trade_id)
            .first::<TradeDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Trade {}", trade_id)))?
            .try_into()
    }

    fn list_by_account(
        &self,
        account_id: &str,
        status: Option<TradeStatus>,
    ) -> Result<Vec<Trade>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = trades::table
            .filter(trades::account_id.eq(account_id))
            .into_boxed();

        if let Some(status_filter) = status {
            query = query.filter(trades::status.eq(status_filter.as_str()));
        }

        query
            .select(TradeDB::as_select())
            .order(trades::open_date.desc())
            .load::<TradeDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Trade::try_from)
            .collect()
    }

    fn list_by_accounts(
        &self,
        account_ids: &[String],
        status: Option<TradeStatus>,
    ) -> Result<Vec<Trade>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = trades::table
            .filter(trades::account_id.eq_any(account_ids))
            .into_boxed();

        if let Some(status_filter) = status {
            query = query.filter(trades::status.eq(status_filter.as_str()));
        }

        query
            .select(TradeDB::as_select())
            .order(trades::open_date.desc())
            .load::<TradeDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Trade::try_from)
            .collect()
    }

    fn get_closed_in_range(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Trade>> {
        let mut conn = get_connection(&self.pool)?;

        trades::table
            .filter(trades::account_id.eq(account_id))
            .filter(trades::status.eq(TradeStatus::Closed.as_str()))
            .filter(trades::exit_date.ge(start.naive_utc()))
            .filter(trades::exit_date.lt(end.naive_utc()))
            .select(TradeDB::as_select())
            .order(trades::exit_date.asc())
            .load::<TradeDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Trade::try_from)
            .collect()
    }
}
