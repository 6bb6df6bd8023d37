//! Database model for ledger entries.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{Error, Result};
use tradebook_core::transactions::{NewTransaction, Transaction};

use crate::utils::{parse_decimal, utc};

/// Database representation of a ledger entry row.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::account_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct TransactionDB {
    pub id: String,
    pub account_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub date: NaiveDateTime,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Self> {
        Ok(Self {
            transaction_type: db.transaction_type.parse()?,
            amount: parse_decimal(&db.amount, "account_transactions.amount")?,
            id: db.id,
            account_id: db.account_id,
            date: utc(db.date),
            description: db.description,
            created_at: utc(db.created_at),
            updated_at: utc(db.updated_at),
        })
    }
}

impl From<NewTransaction> for TransactionDB {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            account_id: domain.account_id,
            transaction_type: domain.transaction_type.as_str().to_string(),
            amount: domain.amount.round_dp(DECIMAL_PRECISION).to_string(),
            date: domain.date.naive_utc(),
            description: domain.description,
            created_at: now,
            updated_at: now,
        }
    }
}
