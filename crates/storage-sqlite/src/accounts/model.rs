//! Database model for accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use tradebook_core::accounts::{Account, NewAccount};
use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{Error, Result};

use crate::utils::{parse_decimal, utc};

/// Database representation of an account row. The balance is stored as a
/// TEXT decimal string.
#[derive(
    Debug, Clone, Queryable, Identifiable, Insertable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AccountDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub balance: String,
    pub position_unit: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AccountDB> for Account {
    type Error = Error;

    fn try_from(db: AccountDB) -> Result<Self> {
        Ok(Self {
            balance: parse_decimal(&db.balance, "accounts.balance")?,
            position_unit: db.position_unit.parse()?,
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            created_at: utc(db.created_at),
            updated_at: utc(db.updated_at),
        })
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            user_id: domain.user_id,
            name: domain.name.trim().to_string(),
            balance: domain
                .balance
                .unwrap_or_default()
                .round_dp(DECIMAL_PRECISION)
                .to_string(),
            position_unit: domain.position_unit.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
