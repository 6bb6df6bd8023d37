//! Small conversion helpers shared by the storage models.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use tradebook_core::errors::{DatabaseError, Error, Result};

/// Interprets a stored naive timestamp as UTC.
pub(crate) fn utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive, Utc)
}

/// Parses a TEXT decimal column, naming the column on failure.
pub(crate) fn parse_decimal(raw: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| {
        Error::Database(DatabaseError::Internal(format!(
            "Column {} holds a non-decimal value '{}': {}",
            column, raw, e
        )))
    })
}

/// Parses an optional TEXT decimal column.
pub(crate) fn parse_decimal_opt(raw: Option<&str>, column: &str) -> Result<Option<Decimal>> {
    raw.map(|value| parse_decimal(value, column)).transpose()
}
