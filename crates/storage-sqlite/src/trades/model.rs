//! Database model for trade records.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{Error, Result};
use tradebook_core::trades::Trade;

use crate::utils::{parse_decimal, parse_decimal_opt, utc};

/// Database representation of a trade row. Prices, sizes and derived money
/// amounts are stored as TEXT decimal strings; the duration is kept in
/// milliseconds.
#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct TradeDB {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub position_size: String,
    pub leverage: Option<String>,
    pub open_date: NaiveDateTime,
    pub status: String,
    pub exit_date: Option<NaiveDateTime>,
    pub pnl: Option<String>,
    pub result: Option<String>,
    pub notes: Option<String>,
    pub direction: String,
    pub exposure: String,
    pub margin_used: Option<String>,
    pub risk_reward_ratio: String,
    pub duration: Option<i64>,
    pub r_multiple: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TradeDB> for Trade {
    type Error = Error;

    fn try_from(db: TradeDB) -> Result<Self> {
        Ok(Self {
            entry_price: parse_decimal(&db.entry_price, "trades.entry_price")?,
            stop_loss: parse_decimal(&db.stop_loss, "trades.stop_loss")?,
            take_profit: parse_decimal(&db.take_profit, "trades.take_profit")?,
            position_size: parse_decimal(&db.position_size, "trades.position_size")?,
            leverage: parse_decimal_opt(db.leverage.as_deref(), "trades.leverage")?,
            status: db.status.parse()?,
            pnl: parse_decimal_opt(db.pnl.as_deref(), "trades.pnl")?,
            result: db.result.as_deref().map(str::parse).transpose()?,
            direction: db.direction.parse()?,
            exposure: parse_decimal(&db.exposure, "trades.exposure")?,
            margin_used: parse_decimal_opt(db.margin_used.as_deref(), "trades.margin_used")?,
            risk_reward_ratio: parse_decimal(&db.risk_reward_ratio, "trades.risk_reward_ratio")?,
            duration: db.duration,
            r_multiple: parse_decimal_opt(db.r_multiple.as_deref(), "trades.r_multiple")?,
            id: db.id,
            account_id: db.account_id,
            symbol: db.symbol,
            open_date: utc(db.open_date),
            exit_date: db.exit_date.map(utc),
            notes: db.notes,
            created_at: utc(db.created_at),
            updated_at: utc(db.updated_at),
        })
    }
}

impl From<Trade> for TradeDB {
    fn from(domain: Trade) -> Self {
        Self {
            id: domain.id,
            account_id: domain.account_id,
            symbol: domain.symbol,
            entry_price: money(domain.entry_price),
            stop_loss: money(domain.stop_loss),
            take_profit: money(domain.take_profit),
            position_size: money(domain.position_size),
            leverage: domain.leverage.map(money),
            open_date: domain.open_date.naive_utc(),
            status: domain.status.as_str().to_string(),
            exit_date: domain.exit_date.map(|d| d.naive_utc()),
            pnl: domain.pnl.map(money),
            result: domain.result.map(|r| r.as_str().to_string()),
            notes: domain.notes,
            direction: domain.direction.as_str().to_string(),
            exposure: money(domain.exposure),
            margin_used: domain.margin_used.map(money),
            risk_reward_ratio: money(domain.risk_reward_ratio),
            duration: domain.duration,
            r_multiple: domain.r_multiple.map(money),
            created_at: domain.created_at.naive_utc(),
            updated_at: domain.updated_at.naive_utc(),
        }
    }
}

fn money(value: rust_decimal::Decimal) -> String {
    value.round_dp(DECIMAL_PRECISION).to_string()
}
