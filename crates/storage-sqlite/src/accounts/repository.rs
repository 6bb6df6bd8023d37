use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::accounts;
use crate::utils::parse_decimal;
use tradebook_core::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount};
use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{Error, Result};

use super::model::AccountDB;

/// Repository for managing account rows.
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    /// Creates a new AccountRepository instance.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// The single balance-mutation entry point.
///
/// Reads the current balance, adds `delta` and writes the result back, all on
/// the caller's write-actor connection, i.e. inside the same immediate
/// transaction as the ledger write that produced the delta. Every mutating
/// operation (transaction create/amend/remove, trade close/delete) routes
/// through here; no call site maintains its own increment.
pub(crate) fn apply_balance_delta(
    conn: &mut SqliteConnection,
    target_account_id: &str,
    delta: Decimal,
) -> Result<Account> {
    let account_db = accounts::table
        .select(AccountDB::as_select())
        .find(target_account_id)
        .first::<AccountDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::AccountNotFound(target_account_id.to_string()))?;

    let current = parse_decimal(&account_db.balance, "accounts.balance")?;
    let next = (current + delta).round_dp(DECIMAL_PRECISION);
    let now = chrono::Utc::now().naive_utc();

    diesel::update(accounts::table.find(target_account_id))
        .set((
            accounts::balance.eq(next.to_string()),
            accounts::updated_at.eq(now),
        ))
        .execute(conn)
        .into_core()?;

    let mut updated = account_db;
    updated.balance = next.to_string();
    updated.updated_at = now;
    updated.try_into()
}

/// Fails with `AccountNotFound` unless the account row exists.
pub(crate) fn ensure_account_exists(
    conn: &mut SqliteConnection,
    target_account_id: &str,
) -> Result<()> {
    let present: i64 = accounts::table
        .filter(accounts::id.eq(target_account_id))
        .count()
        .get_result(conn)
        .into_core()?;
    if present == 0 {
        return Err(Error::AccountNotFound(target_account_id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        let mut account_db: AccountDB = new_account.into();
        if account_db.id.is_empty() {
            account_db.id = Uuid::new_v4().to_string();
        }
        debug!("Creating account {}", account_db.id);

        self.writer
            .exec(move |conn| {
                diesel::insert_into(accounts::table)
                    .values(&account_db)
                    .execute(conn)
                    .into_core()?;

                account_db.try_into()
            })
            .await
    }

    async fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        self.writer
            .exec(move |conn| {
                let mut existing = accounts::table
                    .select(AccountDB::as_select())
                    .find(&account_update.id)
                    .first::<AccountDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Account {}", account_update.id)))?;

                if let Some(new_name) = account_update.name {
                    existing.name = new_name.trim().to_string();
                }
                if let Some(unit) = account_update.position_unit {
                    existing.position_unit = unit.as_str().to_string();
                }
                existing.updated_at = chrono::Utc::now().naive_utc();

                diesel::update(accounts::table.find(&existing.id))
                    .set((
                        accounts::name.eq(existing.name.clone()),
                        accounts::position_unit.eq(existing.position_unit.clone()),
                        accounts::updated_at.eq(existing.updated_at),
                    ))
                    .execute(conn)
                    .into_core()?;

                existing.try_into()
            })
            .await
    }

    async fn delete(&self, account_id: &str) -> Result<Account> {
        let id_owned = account_id.to_string();
        self.writer
            .exec(move |conn| {
                let existing = accounts::table
                    .select(AccountDB::as_select())
                    .find(&id_owned)
                    .first::<AccountDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Account {}", id_owned)))?;

                diesel::delete(accounts::table.find(&id_owned))
                    .execute(conn)
                    .into_core()?;

                existing.try_into()
            })
            .await
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .select(AccountDB::as_select())
            .find(account_id)
            .first::<AccountDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Account {}", account_id)))?
            .try_into()
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .filter(accounts::user_id.eq(user_id))
            .select(AccountDB::as_select())
            .order(accounts::name.asc())
            .load::<AccountDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }
}
