use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_ACCOUNT_NAME_LEN;
use crate::errors::{Error, Result, ValidationError};

/// Unit in which position sizes on an account are expressed.
///
/// Carried as a label only; the core performs no unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PositionUnit {
    #[default]
    Usd,
    Lot,
}

impl PositionUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionUnit::Usd => "usd",
            PositionUnit::Lot => "lot",
        }
    }
}

impl std::str::FromStr for PositionUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "usd" => Ok(PositionUnit::Usd),
            "lot" => Ok(PositionUnit::Lot),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown position unit: {}",
                other
            )))),
        }
    }
}

/// Domain model representing a trading account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Materialized aggregate over the account's ledger entries and closed
    /// trades. Mutated only by the balance accumulator.
    pub balance: Decimal,
    pub position_unit: PositionUnit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    /// Opening balance; defaults to zero when absent.
    pub balance: Option<Decimal>,
    pub position_unit: PositionUnit,
}

impl NewAccount {
    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.name.trim().len() > MAX_ACCOUNT_NAME_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Account name cannot be more than {} characters",
                MAX_ACCOUNT_NAME_LEN
            ))));
        }
        if let Some(balance) = self.balance {
            if balance < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Balance cannot be negative".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Input model for updating an existing account.
///
/// The balance is deliberately absent: only the balance accumulator mutates
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: String,
    pub name: Option<String>,
    pub position_unit: Option<PositionUnit>,
}

impl AccountUpdate {
    /// Validates the account update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Account name cannot be empty".to_string(),
                )));
            }
            if name.trim().len() > MAX_ACCOUNT_NAME_LEN {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Account name cannot be more than {} characters",
                    MAX_ACCOUNT_NAME_LEN
                ))));
            }
        }
        Ok(())
    }
}
