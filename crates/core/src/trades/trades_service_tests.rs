//! Tests for the trade service against in-memory repositories.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount, PositionUnit};
    use crate::errors::{Error, Result};
    use crate::trades::{
        CloseTrade, NewTrade, Trade, TradeDirection, TradeRepositoryTrait, TradeResult,
        TradeService, TradeServiceTrait, TradeStatus, TradeUpdate,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Mock AccountRepository ---

    #[derive(Clone, Default)]
    struct MockAccountRepository {
        accounts: Arc<Mutex<Vec<Account>>>,
    }

    impl MockAccountRepository {
        fn add_account(&self, id: &str, user_id: &str) {
            let now = Utc::now();
            self.accounts.lock().unwrap().push(Account {
                id: id.to_string(),
                user_id: user_id.to_string(),
                name: format!("Account {}", id),
                balance: Decimal::ZERO,
                position_unit: PositionUnit::Usd,
                created_at: now,
                updated_at: now,
            });
        }
    }

    #[async_trait]
    impl AccountRepositoryTrait for MockAccountRepository {
        async fn create(&self, _new_account: NewAccount) -> Result<Account> {
            unimplemented!()
        }

        async fn update(&self, _account_update: AccountUpdate) -> Result<Account> {
            unimplemented!()
        }

        async fn delete(&self, _account_id: &str) -> Result<Account> {
            unimplemented!()
        }

        fn get_by_id(&self, account_id: &str) -> Result<Account> {
            self.accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == account_id)
                .cloned()
                .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))
        }

        fn list_by_user(&self, user_id: &str) -> Result<Vec<Account>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    // --- Mock TradeRepository ---

    /// In-memory trade store mirroring the balance discipline of the real
    /// repository: close applies the P&L, delete of a closed trade reverses
    /// it.
    #[derive(Clone, Default)]
    struct MockTradeRepository {
        trades: Arc<Mutex<Vec<Trade>>>,
        balances: Arc<Mutex<HashMap<String, Decimal>>>,
    }

    impl MockTradeRepository {
        fn balance(&self, account_id: &str) -> Decimal {
            self.balances
                .lock()
                .unwrap()
                .get(account_id)
                .copied()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl TradeRepositoryTrait for MockTradeRepository {
        async fn insert(&self, trade: Trade) -> Result<Trade> {
            self.trades.lock().unwrap().push(trade.clone());
            Ok(trade)
        }

        async fn update(&self, trade: Trade) -> Result<Trade> {
            let mut trades = self.trades.lock().unwrap();
            let stored = trades
                .iter_mut()
                .find(|t| t.id == trade.id)
                .ok_or_else(|| Error::NotFound(format!("Trade {}", trade.id)))?;
            *stored = trade.clone();
            Ok(trade)
        }

        async fn close(&self, trade: Trade) -> Result<Trade> {
            let mut trades = self.trades.lock().unwrap();
            let stored = trades
                .iter_mut()
                .find(|t| t.id == trade.id)
                .ok_or_else(|| Error::NotFound(format!("Trade {}", trade.id)))?;
            if stored.status != TradeStatus::Open {
                return Err(Error::Conflict(format!("Trade {} is not open", trade.id)));
            }
            *stored = trade.clone();

            *self
                .balances
                .lock()
                .unwrap()
                .entry(trade.account_id.clone())
                .or_default() += trade.pnl.unwrap_or_default();
            Ok(trade)
        }

        async fn cancel(&self, trade_id: &str) -> Result<Trade> {
            let mut trades = self.trades.lock().unwrap();
            let stored = trades
                .iter_mut()
                .find(|t| t.id == trade_id)
                .ok_or_else(|| Error::NotFound(format!("Trade {}", trade_id)))?;
            if stored.status != TradeStatus::Open {
                return Err(Error::Conflict(format!("Trade {} is not open", trade_id)));
            }
            stored.status = TradeStatus::Cancelled;
            Ok(stored.clone())
        }

        async fn delete(&self, trade_id: &str) -> Result<Trade> {
            let mut trades = self.trades.lock().unwrap();
            let position = trades
                .iter()
                .position(|t| t.id == trade_id)
                .ok_or_else(|| Error::NotFound(format!("Trade {}", trade_id)))?;
            let removed = trades.remove(position);

            if removed.status == TradeStatus::Closed {
                *self
                    .balances
                    .lock()
                    .unwrap()
                    .entry(removed.account_id.clone())
                    .or_default() -= removed.pnl.unwrap_or_default();
            }
            Ok(removed)
        }

        fn get_by_id(&self, trade_id: &str) -> Result<Trade> {
            self.trades
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == trade_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Trade {}", trade_id)))
        }

        fn list_by_account(
            &self,
            account_id: &str,
            status: Option<TradeStatus>,
        ) -> Result<Vec<Trade>> {
            Ok(self
                .trades
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.account_id == account_id)
                .filter(|t| status.map_or(true, |s| t.status == s))
                .cloned()
                .collect())
        }

        fn list_by_accounts(
            &self,
            account_ids: &[String],
            status: Option<TradeStatus>,
        ) -> Result<Vec<Trade>> {
            Ok(self
                .trades
                .lock()
                .unwrap()
                .iter()
                .filter(|t| account_ids.contains(&t.account_id))
                .filter(|t| status.map_or(true, |s| t.status == s))
                .cloned()
                .collect())
        }

        fn get_closed_in_range(
            &self,
            account_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Trade>> {
            Ok(self
                .trades
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.account_id == account_id && t.status == TradeStatus::Closed)
                .filter(|t| t.exit_date.map_or(false, |d| d >= start && d < end))
                .cloned()
                .collect())
        }
    }

    fn setup() -> (TradeService, MockTradeRepository, MockAccountRepository) {
        let trade_repository = MockTradeRepository::default();
        let account_repository = MockAccountRepository::default();
        account_repository.add_account("acct-1", "user-1");
        let service = TradeService::new(
            Arc::new(trade_repository.clone()),
            Arc::new(account_repository.clone()),
        );
        (service, trade_repository, account_repository)
    }

    fn new_trade(account_id: &str) -> NewTrade {
        NewTrade {
            id: None,
            account_id: account_id.to_string(),
            symbol: "EURUSD".to_string(),
            entry_price: dec!(1.1000),
            stop_loss: dec!(1.0950),
            take_profit: dec!(1.1100),
            position_size: dec!(10000),
            leverage: None,
            open_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_trade_computes_derived_fields() {
        let (service, _, _) = setup();

        let trade = service.create_trade(new_trade("acct-1")).await.unwrap();

        assert_eq!(trade.status, TradeStatus::Open);
        assert_eq!(trade.direction, TradeDirection::Long);
        assert_eq!(trade.exposure, dec!(11000));
        assert_eq!(trade.risk_reward_ratio, dec!(2));
        assert_eq!(trade.exit_date, None);
        assert_eq!(trade.pnl, None);
        assert_eq!(trade.r_multiple, None);
    }

    #[tokio::test]
    async fn test_create_trade_rejects_non_positive_price() {
        let (service, _, _) = setup();

        let mut invalid = new_trade("acct-1");
        invalid.entry_price = dec!(0);
        assert!(matches!(
            service.create_trade(invalid).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_close_trade_recomputes_and_applies_pnl() {
        let (service, trade_repository, _) = setup();

        let trade = service.create_trade(new_trade("acct-1")).await.unwrap();
        let closed = service
            .close_trade(CloseTrade {
                id: trade.id.clone(),
                exit_date: Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap(),
                pnl: dec!(50),
                result: TradeResult::Win,
            })
            .await
            .unwrap();

        assert_eq!(closed.status, TradeStatus::Closed);
        assert_eq!(closed.pnl, Some(dec!(50)));
        // 6 hours in the trade.
        assert_eq!(closed.duration, Some(6 * 60 * 60 * 1000));
        // Initial risk 0.0050 * 10000 = 50 => exactly 1R.
        assert_eq!(closed.r_multiple, Some(dec!(1)));
        assert_eq!(trade_repository.balance("acct-1"), dec!(50));
    }

    #[tokio::test]
    async fn test_close_trade_twice_is_rejected() {
        let (service, _, _) = setup();

        let trade = service.create_trade(new_trade("acct-1")).await.unwrap();
        let close = CloseTrade {
            id: trade.id.clone(),
            exit_date: Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap(),
            pnl: dec!(50),
            result: TradeResult::Win,
        };
        service.close_trade(close.clone()).await.unwrap();

        assert!(matches!(
            service.close_trade(close).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_only_from_open() {
        let (service, _, _) = setup();

        let trade = service.create_trade(new_trade("acct-1")).await.unwrap();
        let cancelled = service.cancel_trade(&trade.id).await.unwrap();
        assert_eq!(cancelled.status, TradeStatus::Cancelled);

        assert!(matches!(
            service.cancel_trade(&trade.id).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_trade_recomputes_direction() {
        let (service, _, _) = setup();

        let trade = service.create_trade(new_trade("acct-1")).await.unwrap();
        assert_eq!(trade.direction, TradeDirection::Long);

        let updated = service
            .update_trade(TradeUpdate {
                id: trade.id.clone(),
                symbol: None,
                entry_price: None,
                stop_loss: Some(dec!(1.1100)),
                take_profit: Some(dec!(1.0900)),
                position_size: None,
                leverage: None,
                open_date: None,
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.direction, TradeDirection::Short);
        assert_eq!(updated.risk_reward_ratio, dec!(1));
    }

    #[tokio::test]
    async fn test_delete_closed_trade_reverses_pnl() {
        let (service, trade_repository, _) = setup();

        let trade = service.create_trade(new_trade("acct-1")).await.unwrap();
        service
            .close_trade(CloseTrade {
                id: trade.id.clone(),
                exit_date: Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap(),
                pnl: dec!(75),
                result: TradeResult::Win,
            })
            .await
            .unwrap();
        assert_eq!(trade_repository.balance("acct-1"), dec!(75));

        service.delete_trade(&trade.id).await.unwrap();
        assert_eq!(trade_repository.balance("acct-1"), dec!(0));
    }

    #[tokio::test]
    async fn test_list_trades_by_user_spans_accounts() {
        let (service, _, account_repository) = setup();
        account_repository.add_account("acct-2", "user-1");
        account_repository.add_account("acct-3", "user-2");

        service.create_trade(new_trade("acct-1")).await.unwrap();
        service.create_trade(new_trade("acct-2")).await.unwrap();
        service.create_trade(new_trade("acct-3")).await.unwrap();

        let trades = service.list_trades_by_user("user-1", None).unwrap();
        assert_eq!(trades.len(), 2);

        let trades = service.list_trades_by_user("user-3", None).unwrap();
        assert!(trades.is_empty());
    }
}
