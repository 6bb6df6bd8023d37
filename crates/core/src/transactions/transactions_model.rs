use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TRANSACTION_DESCRIPTION_LEN;
use crate::errors::{Error, Result, ValidationError};

/// Kind of ledger entry affecting an account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown transaction type: {}",
                other
            )))),
        }
    }
}

/// A deposit or withdrawal recorded against one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// The entry's contribution to the account balance: positive for
    /// deposits, negative for withdrawals.
    pub fn signed_amount(&self) -> Decimal {
        signed_amount(self.transaction_type, self.amount)
    }
}

/// Signed balance contribution of a ledger entry.
pub fn signed_amount(transaction_type: TransactionType, amount: Decimal) -> Decimal {
    match transaction_type {
        TransactionType::Deposit => amount,
        TransactionType::Withdrawal => -amount,
    }
}

/// Compensating delta the balance accumulator applies when an entry is
/// amended: the new signed amount minus the original one.
pub fn amend_delta(
    original: &Transaction,
    new_type: TransactionType,
    new_amount: Decimal,
) -> Decimal {
    signed_amount(new_type, new_amount) - original.signed_amount()
}

/// Input model for recording a new ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Validates the new ledger entry data.
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Amount must be positive".to_string(),
            )));
        }
        validate_description(self.description.as_deref())
    }
}

/// Input model for amending a ledger entry. Absent fields stay unchanged; the
/// account reference is not amendable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl TransactionUpdate {
    /// Validates the amendment data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Amount must be positive".to_string(),
                )));
            }
        }
        validate_description(self.description.as_deref())
    }
}

/// Filters for listing the ledger entries of an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub transaction_type: Option<TransactionType>,
    /// Inclusive lower bound on the entry date.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the entry date.
    pub end_date: Option<DateTime<Utc>>,
}

fn validate_description(description: Option<&str>) -> Result<()> {
    if let Some(text) = description {
        if text.len() > MAX_TRANSACTION_DESCRIPTION_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Description cannot be more than {} characters",
                MAX_TRANSACTION_DESCRIPTION_LEN
            ))));
        }
    }
    Ok(())
}
