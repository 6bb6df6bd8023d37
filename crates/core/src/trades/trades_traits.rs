//! Trade repository and service traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::trades_model::{CloseTrade, NewTrade, Trade, TradeStatus, TradeUpdate};
use crate::errors::Result;

/// Trait defining the contract for trade repository operations.
///
/// The service computes derived fields before every write; implementations
/// persist records as given. Operations that touch the account balance
/// (close, delete of a closed trade) apply the P&L delta in the same atomic
/// unit as the trade write.
#[async_trait]
pub trait TradeRepositoryTrait: Send + Sync {
    /// Persists a freshly created trade record.
    ///
    /// Fails with `AccountNotFound` when the referenced account is missing.
    async fn insert(&self, trade: Trade) -> Result<Trade>;

    /// Persists an updated trade record. Does not touch the account balance.
    async fn update(&self, trade: Trade) -> Result<Trade>;

    /// Persists the open-to-closed transition and applies the realized P&L
    /// to the account balance in the same atomic unit.
    ///
    /// Fails with `Conflict` when the stored record is no longer open.
    async fn close(&self, trade: Trade) -> Result<Trade>;

    /// Marks an open trade as cancelled.
    ///
    /// Fails with `Conflict` when the stored record is no longer open.
    async fn cancel(&self, trade_id: &str) -> Result<Trade>;

    /// Removes a trade. For a closed trade the applied P&L is reversed from
    /// the account balance first, in the same atomic unit.
    async fn delete(&self, trade_id: &str) -> Result<Trade>;

    /// Retrieves a trade by its ID.
    fn get_by_id(&self, trade_id: &str) -> Result<Trade>;

    /// Lists an account's trades, newest open date first.
    fn list_by_account(&self, account_id: &str, status: Option<TradeStatus>)
        -> Result<Vec<Trade>>;

    /// Lists trades across several accounts, newest open date first.
    fn list_by_accounts(
        &self,
        account_ids: &[String],
        status: Option<TradeStatus>,
    ) -> Result<Vec<Trade>>;

    /// Closed trades with `start <= exit_date < end` for one account, used by
    /// the snapshot builder.
    fn get_closed_in_range(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Trade>>;
}

/// Trait defining the contract for trade service operations.
#[async_trait]
pub trait TradeServiceTrait: Send + Sync {
    /// Opens a new trade with derived fields computed from the raw inputs.
    async fn create_trade(&self, new_trade: NewTrade) -> Result<Trade>;

    /// Updates a trade's raw fields, recomputing every derived field.
    async fn update_trade(&self, update: TradeUpdate) -> Result<Trade>;

    /// Closes an open trade; the realized P&L is applied to the account
    /// balance.
    async fn close_trade(&self, close: CloseTrade) -> Result<Trade>;

    /// Cancels an open trade.
    async fn cancel_trade(&self, trade_id: &str) -> Result<Trade>;

    /// Deletes a trade, reversing its applied P&L when it was closed.
    async fn delete_trade(&self, trade_id: &str) -> Result<Trade>;

    /// Retrieves a trade by ID.
    fn get_trade(&self, trade_id: &str) -> Result<Trade>;

    /// Lists an account's trades with an optional status filter.
    fn list_trades_by_account(
        &self,
        account_id: &str,
        status: Option<TradeStatus>,
    ) -> Result<Vec<Trade>>;

    /// Lists the trades of every account a user owns.
    fn list_trades_by_user(&self, user_id: &str, status: Option<TradeStatus>)
        -> Result<Vec<Trade>>;
}
