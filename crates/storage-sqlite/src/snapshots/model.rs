//! Database model for account snapshots.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{DatabaseError, Error, Result};
use tradebook_core::snapshots::AccountSnapshot;

use crate::utils::{parse_decimal, parse_decimal_opt, utc};

/// Day-key storage format for snapshot dates; lexicographic order matches
/// chronological order.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database representation of a snapshot row.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::account_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDB {
    pub id: String,
    pub account_id: String,
    pub date: String,
    pub balance: String,
    pub daily_pnl: String,
    pub deposits: Option<String>,
    pub withdrawals: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<SnapshotDB> for AccountSnapshot {
    type Error = Error;

    fn try_from(db: SnapshotDB) -> Result<Self> {
        Ok(Self {
            date: parse_date(&db.date)?,
            balance: parse_decimal(&db.balance, "account_snapshots.balance")?,
            daily_pnl: parse_decimal(&db.daily_pnl, "account_snapshots.daily_pnl")?,
            deposits: parse_decimal_opt(db.deposits.as_deref(), "account_snapshots.deposits")?,
            withdrawals: parse_decimal_opt(
                db.withdrawals.as_deref(),
                "account_snapshots.withdrawals",
            )?,
            id: db.id,
            account_id: db.account_id,
            notes: db.notes,
            created_at: utc(db.created_at),
            updated_at: utc(db.updated_at),
        })
    }
}

impl From<AccountSnapshot> for SnapshotDB {
    fn from(domain: AccountSnapshot) -> Self {
        Self {
            id: domain.id,
            account_id: domain.account_id,
            date: domain.date.format(DATE_FORMAT).to_string(),
            balance: money(domain.balance),
            daily_pnl: money(domain.daily_pnl),
            deposits: domain.deposits.map(money),
            withdrawals: domain.withdrawals.map(money),
            notes: domain.notes,
            created_at: domain.created_at.naive_utc(),
            updated_at: domain.updated_at.naive_utc(),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        Error::Database(DatabaseError::Internal(format!(
            "Column account_snapshots.date holds a non-date value '{}': {}",
            raw, e
        )))
    })
}

fn money(value: rust_decimal::Decimal) -> String {
    value.round_dp(DECIMAL_PRECISION).to_string()
}
