use chrono::Utc;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::trades_calculator::{calculate_metrics, MetricsInput};
use super::trades_model::{CloseTrade, NewTrade, Trade, TradeStatus, TradeUpdate};
use super::trades_traits::{TradeRepositoryTrait, TradeServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};

/// Service for managing trade records.
///
/// Every path that persists a trade runs the metrics calculator first, so
/// derived fields always reflect the raw inputs being written.
pub struct TradeService {
    repository: Arc<dyn TradeRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
}

impl TradeService {
    /// Creates a new TradeService instance.
    pub fn new(
        repository: Arc<dyn TradeRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            account_repository,
        }
    }
}

#[async_trait::async_trait]
impl TradeServiceTrait for TradeService {
    async fn create_trade(&self, new_trade: NewTrade) -> Result<Trade> {
        new_trade.validate()?;

        let metrics = calculate_metrics(&MetricsInput {
            entry_price: new_trade.entry_price,
            stop_loss: new_trade.stop_loss,
            take_profit: new_trade.take_profit,
            position_size: new_trade.position_size,
            leverage: new_trade.leverage,
            open_date: new_trade.open_date,
            exit_date: None,
            pnl: None,
        })?;

        let now = Utc::now();
        let trade = Trade {
            id: new_trade
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: new_trade.account_id,
            symbol: new_trade.symbol.trim().to_string(),
            entry_price: new_trade.entry_price,
            stop_loss: new_trade.stop_loss,
            take_profit: new_trade.take_profit,
            position_size: new_trade.position_size,
            leverage: new_trade.leverage,
            open_date: new_trade.open_date,
            status: TradeStatus::Open,
            exit_date: None,
            pnl: None,
            result: None,
            notes: new_trade.notes,
            direction: metrics.direction,
            exposure: metrics.exposure,
            margin_used: metrics.margin_used,
            risk_reward_ratio: metrics.risk_reward_ratio,
            duration: metrics.duration,
            r_multiple: metrics.r_multiple,
            created_at: now,
            updated_at: now,
        };

        debug!(
            "Opening {} trade on {} for account {}",
            trade.direction.as_str(),
            trade.symbol,
            trade.account_id
        );
        self.repository.insert(trade).await
    }

    async fn update_trade(&self, update: TradeUpdate) -> Result<Trade> {
        update.validate()?;

        let mut trade = self.repository.get_by_id(&update.id)?;

        if let Some(symbol) = update.symbol {
            trade.symbol = symbol.trim().to_string();
        }
        if let Some(entry_price) = update.entry_price {
            trade.entry_price = entry_price;
        }
        if let Some(stop_loss) = update.stop_loss {
            trade.stop_loss = stop_loss;
        }
        if let Some(take_profit) = update.take_profit {
            trade.take_profit = take_profit;
        }
        if let Some(position_size) = update.position_size {
            trade.position_size = position_size;
        }
        if let Some(leverage) = update.leverage {
            trade.leverage = Some(leverage);
        }
        if let Some(open_date) = update.open_date {
            trade.open_date = open_date;
        }
        if let Some(notes) = update.notes {
            trade.notes = Some(notes);
        }

        let metrics = calculate_metrics(&trade.metrics_input())?;
        trade.apply_metrics(metrics);
        trade.updated_at = Utc::now();

        self.repository.update(trade).await
    }

    async fn close_trade(&self, close: CloseTrade) -> Result<Trade> {
        close.validate()?;

        let mut trade = self.repository.get_by_id(&close.id)?;
        if trade.status != TradeStatus::Open {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Trade {} is not open and cannot be closed",
                trade.id
            ))));
        }

        trade.status = TradeStatus::Closed;
        trade.exit_date = Some(close.exit_date);
        trade.pnl = Some(close.pnl);
        trade.result = Some(close.result);

        let metrics = calculate_metrics(&trade.metrics_input())?;
        trade.apply_metrics(metrics);
        trade.updated_at = Utc::now();

        debug!("Closing trade {} with pnl {}", trade.id, close.pnl);
        self.repository.close(trade).await
    }

    async fn cancel_trade(&self, trade_id: &str) -> Result<Trade> {
        let trade = self.repository.get_by_id(trade_id)?;
        if trade.status != TradeStatus::Open {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Trade {} is not open and cannot be cancelled",
                trade.id
            ))));
        }

        self.repository.cancel(trade_id).await
    }

    async fn delete_trade(&self, trade_id: &str) -> Result<Trade> {
        debug!("Deleting trade {}", trade_id);
        self.repository.delete(trade_id).await
    }

    fn get_trade(&self, trade_id: &str) -> Result<Trade> {
        self.repository.get_by_id(trade_id)
    }

    fn list_trades_by_account(
        &self,
        account_id: &str,
        status: Option<TradeStatus>,
    ) -> Result<Vec<Trade>> {
        self.repository.list_by_account(account_id, status)
    }

    fn list_trades_by_user(
        &self,
        user_id: &str,
        status: Option<TradeStatus>,
    ) -> Result<Vec<Trade>> {
        let accounts = self.account_repository.list_by_user(user_id)?;
        let account_ids: Vec<String> = accounts.into_iter().map(|a| a.id).collect();
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.list_by_accounts(&account_ids, status)
    }
}
