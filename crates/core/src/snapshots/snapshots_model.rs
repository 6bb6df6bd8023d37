use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_SNAPSHOT_NOTES_LEN;
use crate::errors::{Error, Result, ValidationError};

/// Closing state of one account at the end of one calendar day.
///
/// Reconstructed from the day's ledger entries and closed trades plus the
/// previous snapshot; at most one exists per (account, day).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub id: String,
    pub account_id: String,
    /// Day the snapshot closes, at day granularity.
    pub date: NaiveDate,
    /// Closing balance for the day.
    pub balance: Decimal,
    /// Sum of P&L over the day's closed trades.
    pub daily_pnl: Decimal,
    /// Day's deposit total; absent when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposits: Option<Decimal>,
    /// Day's withdrawal total; absent when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for recording a snapshot manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    pub date: NaiveDate,
    pub balance: Decimal,
    pub daily_pnl: Decimal,
    pub deposits: Option<Decimal>,
    pub withdrawals: Option<Decimal>,
    pub notes: Option<String>,
}

impl NewSnapshot {
    /// Validates the snapshot data.
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        if self.balance < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Balance cannot be negative".to_string(),
            )));
        }
        validate_flow("Deposits", self.deposits)?;
        validate_flow("Withdrawals", self.withdrawals)?;
        validate_notes(self.notes.as_deref())
    }
}

/// Input model for editing a snapshot directly.
///
/// Later snapshots built on top of the edited one are not re-derived; that is
/// the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUpdate {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub balance: Option<Decimal>,
    pub daily_pnl: Option<Decimal>,
    pub deposits: Option<Decimal>,
    pub withdrawals: Option<Decimal>,
    pub notes: Option<String>,
}

impl SnapshotUpdate {
    /// Validates the snapshot update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if let Some(balance) = self.balance {
            if balance < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Balance cannot be negative".to_string(),
                )));
            }
        }
        validate_flow("Deposits", self.deposits)?;
        validate_flow("Withdrawals", self.withdrawals)?;
        validate_notes(self.notes.as_deref())
    }
}

fn validate_flow(field: &str, value: Option<Decimal>) -> Result<()> {
    if let Some(amount) = value {
        if amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "{} cannot be negative",
                field
            ))));
        }
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<()> {
    if let Some(text) = notes {
        if text.len() > MAX_SNAPSHOT_NOTES_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Notes cannot be more than {} characters",
                MAX_SNAPSHOT_NOTES_LEN
            ))));
        }
    }
    Ok(())
}
