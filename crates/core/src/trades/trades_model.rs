use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::trades_calculator::{MetricsInput, TradeMetrics};
use crate::constants::MAX_TRADE_NOTES_LEN;
use crate::errors::{Error, Result, ValidationError};

/// Lifecycle state of a trade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    #[default]
    Open,
    Closed,
    Cancelled,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
            TradeStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for TradeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            "cancelled" => Ok(TradeStatus::Cancelled),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown trade status: {}",
                other
            )))),
        }
    }
}

/// Side of the position, derived from the take-profit placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Long => "long",
            TradeDirection::Short => "short",
        }
    }
}

impl std::str::FromStr for TradeDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "long" => Ok(TradeDirection::Long),
            "short" => Ok(TradeDirection::Short),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown trade direction: {}",
                other
            )))),
        }
    }
}

/// Outcome the trader assigns when closing a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeResult {
    Win,
    Loss,
    Breakeven,
    PartialWin,
}

impl TradeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeResult::Win => "win",
            TradeResult::Loss => "loss",
            TradeResult::Breakeven => "breakeven",
            TradeResult::PartialWin => "partial-win",
        }
    }
}

impl std::str::FromStr for TradeResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "win" => Ok(TradeResult::Win),
            "loss" => Ok(TradeResult::Loss),
            "breakeven" => Ok(TradeResult::Breakeven),
            "partial-win" => Ok(TradeResult::PartialWin),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown trade result: {}",
                other
            )))),
        }
    }
}

/// Domain model representing a journaled trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub position_size: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<Decimal>,
    pub open_date: DateTime<Utc>,
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TradeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    // Derived fields. Recomputed from the raw inputs on every write; stored
    // values are never trusted.
    pub direction: TradeDirection,
    pub exposure: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_used: Option<Decimal>,
    pub risk_reward_ratio: Decimal,
    /// Time in the trade, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_multiple: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// The raw fields the metrics calculator derives from.
    pub fn metrics_input(&self) -> MetricsInput {
        MetricsInput {
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            position_size: self.position_size,
            leverage: self.leverage,
            open_date: self.open_date,
            exit_date: self.exit_date,
            pnl: self.pnl,
        }
    }

    /// Copies a freshly computed metric set onto the record.
    pub fn apply_metrics(&mut self, metrics: TradeMetrics) {
        self.direction = metrics.direction;
        self.exposure = metrics.exposure;
        self.margin_used = metrics.margin_used;
        self.risk_reward_ratio = metrics.risk_reward_ratio;
        self.duration = metrics.duration;
        self.r_multiple = metrics.r_multiple;
    }
}

/// Input model for opening a new trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    pub symbol: String,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub position_size: Decimal,
    pub leverage: Option<Decimal>,
    pub open_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewTrade {
    /// Validates the new trade data.
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Symbol is required".to_string(),
            )));
        }
        validate_price("entryPrice", self.entry_price)?;
        validate_price("stopLoss", self.stop_loss)?;
        validate_price("takeProfit", self.take_profit)?;
        validate_price("positionSize", self.position_size)?;
        validate_leverage(self.leverage)?;
        validate_notes(self.notes.as_deref())
    }
}

/// Input model for updating an open trade's raw fields. Absent fields stay
/// unchanged; status transitions go through close/cancel instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    pub id: String,
    pub symbol: Option<String>,
    pub entry_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub position_size: Option<Decimal>,
    pub leverage: Option<Decimal>,
    pub open_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl TradeUpdate {
    /// Validates the trade update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if let Some(symbol) = &self.symbol {
            if symbol.trim().is_empty() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Symbol is required".to_string(),
                )));
            }
        }
        if let Some(price) = self.entry_price {
            validate_price("entryPrice", price)?;
        }
        if let Some(price) = self.stop_loss {
            validate_price("stopLoss", price)?;
        }
        if let Some(price) = self.take_profit {
            validate_price("takeProfit", price)?;
        }
        if let Some(size) = self.position_size {
            validate_price("positionSize", size)?;
        }
        validate_leverage(self.leverage)?;
        validate_notes(self.notes.as_deref())
    }
}

/// Input model for closing an open trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTrade {
    pub id: String,
    pub exit_date: DateTime<Utc>,
    pub pnl: Decimal,
    pub result: TradeResult,
}

impl CloseTrade {
    /// Validates the close data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        Ok(())
    }
}

fn validate_price(field: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "{} must be positive",
            field
        ))));
    }
    Ok(())
}

fn validate_leverage(leverage: Option<Decimal>) -> Result<()> {
    if let Some(value) = leverage {
        if value < Decimal::ONE {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Leverage must be at least 1".to_string(),
            )));
        }
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<()> {
    if let Some(text) = notes {
        if text.len() > MAX_TRADE_NOTES_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Notes cannot be more than {} characters",
                MAX_TRADE_NOTES_LEN
            ))));
        }
    }
    Ok(())
}
