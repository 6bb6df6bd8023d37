//! Pure derivation of trade risk/performance metrics.
//!
//! The trade service invokes this calculator immediately before every
//! persistence call, including close. Stored derived values are never
//! trusted: every write recomputes the full set from the raw inputs, so the
//! derivation cannot be bypassed by a direct field update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::trades_model::TradeDirection;
use crate::errors::{Error, Result, ValidationError};

/// Raw trade fields the calculator derives from.
#[derive(Debug, Clone)]
pub struct MetricsInput {
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub position_size: Decimal,
    pub leverage: Option<Decimal>,
    pub open_date: DateTime<Utc>,
    pub exit_date: Option<DateTime<Utc>>,
    pub pnl: Option<Decimal>,
}

/// Derived trade fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeMetrics {
    pub direction: TradeDirection,
    pub exposure: Decimal,
    pub margin_used: Option<Decimal>,
    pub risk_reward_ratio: Decimal,
    /// Time in the trade, in milliseconds.
    pub duration: Option<i64>,
    pub r_multiple: Option<Decimal>,
}

/// Derives the full metric set from raw trade fields.
///
/// Direction compares the take-profit to the entry price only; the stop-loss
/// placement is not cross-checked. A zero risk distance
/// (`entry_price == stop_loss`) is rejected rather than mapped to an infinite
/// ratio — `Decimal` carries no infinity, and the same rule applies to both
/// `risk_reward_ratio` and `r_multiple`.
pub fn calculate_metrics(input: &MetricsInput) -> Result<TradeMetrics> {
    let direction = if input.take_profit > input.entry_price {
        TradeDirection::Long
    } else {
        TradeDirection::Short
    };

    let exposure = input.position_size * input.entry_price;

    let margin_used = match input.leverage {
        Some(leverage) => Some(exposure.checked_div(leverage).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(
                "Leverage must be non-zero".to_string(),
            ))
        })?),
        None => None,
    };

    let risk = (input.entry_price - input.stop_loss).abs();
    let reward = (input.take_profit - input.entry_price).abs();
    let risk_reward_ratio = reward.checked_div(risk).ok_or_else(zero_risk_error)?;

    let duration = input
        .exit_date
        .map(|exit| (exit - input.open_date).num_milliseconds());

    let r_multiple = match input.pnl {
        Some(pnl) => {
            let initial_risk = risk * input.position_size;
            Some(pnl.checked_div(initial_risk).ok_or_else(zero_risk_error)?)
        }
        None => None,
    };

    Ok(TradeMetrics {
        direction,
        exposure,
        margin_used,
        risk_reward_ratio,
        duration,
        r_multiple,
    })
}

fn zero_risk_error() -> Error {
    Error::Validation(ValidationError::InvalidInput(
        "Stop loss equals entry price: risk distance is zero".to_string(),
    ))
}
