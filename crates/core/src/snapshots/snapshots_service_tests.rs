//! Tests for the snapshot builder against in-memory repositories.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountRepositoryTrait, AccountUpdate, NewAccount, PositionUnit};
    use crate::errors::{Error, Result};
    use crate::snapshots::{
        AccountSnapshot, NewSnapshot, SnapshotRepositoryTrait, SnapshotService,
        SnapshotServiceTrait, SnapshotUpdate,
    };
    use crate::trades::{
        Trade, TradeDirection, TradeRepositoryTrait, TradeResult, TradeStatus,
    };
    use crate::transactions::{
        NewTransaction, Transaction, TransactionFilters, TransactionRepositoryTrait,
        TransactionType, TransactionUpdate,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    // --- Mock AccountRepository ---

    #[derive(Clone, Default)]
    struct MockAccountRepository {
        accounts: Arc<Mutex<Vec<Account>>>,
    }

    impl MockAccountRepository {
        fn add_account(&self, id: &str) {
            let now = Utc::now();
            self.accounts.lock().unwrap().push(Account {
                id: id.to_string(),
                user_id: "user-1".to_string(),
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
                .ok_or_else(|| Error::NotFound(format!("Account {}", account_id)))
        }

        fn list_by_user(&self, _user_id: &str) -> Result<Vec<Account>> {
            Ok(self.accounts.lock().unwrap().clone())
        }
    }

    // --- Mock TransactionRepository ---

    #[derive(Clone, Default)]
    struct MockTransactionRepository {
        entries: Arc<Mutex<Vec<Transaction>>>,
    }

    impl MockTransactionRepository {
        fn add_entry(
            &self,
            account_id: &str,
            transaction_type: TransactionType,
            amount: Decimal,
            date: DateTime<Utc>,
        ) {
            self.entries.lock().unwrap().push(Transaction {
                id: uuid::Uuid::new_v4().to_string(),
                account_id: account_id.to_string(),
                transaction_type,
                amount,
                date,
                description: None,
                created_at: date,
                updated_at: date,
            });
        }
    }

    #[async_trait]
    impl TransactionRepositoryTrait for MockTransactionRepository {
        async fn create(&self, _new_transaction: NewTransaction) -> Result<Transaction> {
            unimplemented!()
        }

        async fn update(&self, _update: TransactionUpdate) -> Result<Transaction> {
            unimplemented!()
        }

        async fn delete(&self, _transaction_id: &str) -> Result<Transaction> {
            unimplemented!()
        }

        fn get_by_id(&self, _transaction_id: &str) -> Result<Transaction> {
            unimplemented!()
        }

        fn list_by_account(
            &self,
            _account_id: &str,
            _filters: &TransactionFilters,
        ) -> Result<Vec<Transaction>> {
            unimplemented!()
        }

        fn get_in_range(
            &self,
            account_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Transaction>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.account_id == account_id && t.date >= start && t.date < end)
                .cloned()
                .collect())
        }
    }

    // --- Mock TradeRepository ---

    #[derive(Clone, Default)]
    struct MockTradeRepository {
        trades: Arc<Mutex<Vec<Trade>>>,
    }

    impl MockTradeRepository {
        fn add_closed_trade(
            &self,
            account_id: &str,
            exit_date: DateTime<Utc>,
            pnl: Option<Decimal>,
        ) {
            let open_date = exit_date - chrono::Duration::hours(4);
            self.trades.lock().unwrap().push(Trade {
                id: uuid::Uuid::new_v4().to_string(),
                account_id: account_id.to_string(),
                symbol: "EURUSD".to_string(),
                entry_price: dec!(1.1000),
                stop_loss: dec!(1.0950),
                take_profit: dec!(1.1100),
                position_size: dec!(10000),
                leverage: None,
                open_date,
                status: TradeStatus::Closed,
                exit_date: Some(exit_date),
                pnl,
                result: Some(TradeResult::Win),
                notes: None,
                direction: TradeDirection::Long,
                exposure: dec!(11000),
                margin_used: None,
                risk_reward_ratio: dec!(2),
                duration: Some(4 * 60 * 60 * 1000),
                r_multiple: None,
                created_at: open_date,
                updated_at: exit_date,
            });
        }
    }

    #[async_trait]
    impl TradeRepositoryTrait for MockTradeRepository {
        async fn insert(&self, _trade: Trade) -> Result<Trade> {
            unimplemented!()
        }

        async fn update(&self, _trade: Trade) -> Result<Trade> {
            unimplemented!()
        }

        async fn close(&self, _trade: Trade) -> Result<Trade> {
            unimplemented!()
        }

        async fn cancel(&self, _trade_id: &str) -> Result<Trade> {
            unimplemented!()
        }

        async fn delete(&self, _trade_id: &str) -> Result<Trade> {
            unimplemented!()
        }

        fn get_by_id(&self, _trade_id: &str) -> Result<Trade> {
            unimplemented!()
        }

        fn list_by_account(
            &self,
            _account_id: &str,
            _status: Option<TradeStatus>,
        ) -> Result<Vec<Trade>> {
            unimplemented!()
        }

        fn list_by_accounts(
            &self,
            _account_ids: &[String],
            _status: Option<TradeStatus>,
        ) -> Result<Vec<Trade>> {
            unimplemented!()
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

    // --- Mock SnapshotRepository ---

    /// In-memory snapshot store enforcing the (account, day) unique key, the
    /// same defense in depth the SQLite index provides.
    #[derive(Clone, Default)]
    struct MockSnapshotRepository {
        snapshots: Arc<Mutex<Vec<AccountSnapshot>>>,
    }

    #[async_trait]
    impl SnapshotRepositoryTrait for MockSnapshotRepository {
        async fn create(&self, snapshot: AccountSnapshot) -> Result<AccountSnapshot> {
            let mut snapshots = self.snapshots.lock().unwrap();
            if snapshots
                .iter()
                .any(|s| s.account_id == snapshot.account_id && s.date == snapshot.date)
            {
                return Err(Error::DuplicateSnapshot(format!(
                    "account {} on {}",
                    snapshot.account_id, snapshot.date
                )));
            }
            snapshots.push(snapshot.clone());
            Ok(snapshot)
        }

        async fn update(&self, _update: SnapshotUpdate) -> Result<AccountSnapshot> {
            unimplemented!()
        }

        async fn delete(&self, _snapshot_id: &str) -> Result<AccountSnapshot> {
            unimplemented!()
        }

        fn get_by_id(&self, snapshot_id: &str) -> Result<AccountSnapshot> {
            self.snapshots
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == snapshot_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Snapshot {}", snapshot_id)))
        }

        fn find_by_account_and_date(
            &self,
            account_id: &str,
            date: NaiveDate,
        ) -> Result<Option<AccountSnapshot>> {
            Ok(self
                .snapshots
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.account_id == account_id && s.date == date)
                .cloned())
        }

        fn get_latest_before(
            &self,
            account_id: &str,
            date: NaiveDate,
        ) -> Result<Option<AccountSnapshot>> {
            Ok(self
                .snapshots
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.account_id == account_id && s.date < date)
                .max_by_key(|s| s.date)
                .cloned())
        }

        fn list_by_account(
            &self,
            account_id: &str,
            start_date: Option<NaiveDate>,
            end_date: Option<NaiveDate>,
        ) -> Result<Vec<AccountSnapshot>> {
            let mut matching: Vec<AccountSnapshot> = self
                .snapshots
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.account_id == account_id)
                .filter(|s| start_date.map_or(true, |d| s.date >= d))
                .filter(|s| end_date.map_or(true, |d| s.date <= d))
                .cloned()
                .collect();
            matching.sort_by_key(|s| s.date);
            Ok(matching)
        }
    }

    struct Fixture {
        service: SnapshotService,
        transactions: MockTransactionRepository,
        trades: MockTradeRepository,
    }

    fn setup() -> Fixture {
        let accounts = MockAccountRepository::default();
        accounts.add_account("acct-1");
        let transactions = MockTransactionRepository::default();
        let trades = MockTradeRepository::default();
        let service = SnapshotService::new(
            Arc::new(MockSnapshotRepository::default()),
            Arc::new(accounts),
            Arc::new(transactions.clone()),
            Arc::new(trades.clone()),
        );
        Fixture {
            service,
            transactions,
            trades,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_build_matches_worked_example() {
        let fixture = setup();
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Deposit,
            dec!(10000),
            at(2024, 3, 1, 9),
        );
        fixture
            .trades
            .add_closed_trade("acct-1", at(2024, 3, 1, 15), Some(dec!(50)));

        let snapshot = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(snapshot.deposits, Some(dec!(10000)));
        assert_eq!(snapshot.withdrawals, None);
        assert_eq!(snapshot.daily_pnl, dec!(50));
        assert_eq!(snapshot.balance, dec!(10050));
    }

    #[tokio::test]
    async fn test_build_twice_fails_with_duplicate() {
        let fixture = setup();
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Deposit,
            dec!(100),
            at(2024, 3, 1, 9),
        );

        let first = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();

        let second = fixture.service.build_snapshot("acct-1", day(2024, 3, 1)).await;
        assert!(matches!(second, Err(Error::DuplicateSnapshot(_))));

        // The first result is unaffected by the failed rebuild.
        let stored = fixture.service.get_snapshot(&first.id).unwrap();
        assert_eq!(stored.balance, first.balance);
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_account() {
        let fixture = setup();
        let result = fixture.service.build_snapshot("ghost", day(2024, 3, 1)).await;
        assert!(matches!(result, Err(Error::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_build_chains_previous_balance() {
        let fixture = setup();
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Deposit,
            dec!(100),
            at(2024, 3, 1, 9),
        );
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Withdrawal,
            dec!(40),
            at(2024, 3, 2, 11),
        );

        let first = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();
        assert_eq!(first.balance, dec!(100));

        let second = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 2))
            .await
            .unwrap();
        assert_eq!(second.deposits, None);
        assert_eq!(second.withdrawals, Some(dec!(40)));
        assert_eq!(second.balance, dec!(60));
    }

    #[tokio::test]
    async fn test_build_ignores_events_outside_the_day_window() {
        let fixture = setup();
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Deposit,
            dec!(100),
            at(2024, 3, 1, 9),
        );
        // Midnight belongs to the next day; the builder's window is half-open.
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Deposit,
            dec!(999),
            at(2024, 3, 2, 0),
        );
        fixture
            .trades
            .add_closed_trade("acct-1", at(2024, 3, 3, 10), Some(dec!(7)));

        let snapshot = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(snapshot.deposits, Some(dec!(100)));
        assert_eq!(snapshot.daily_pnl, dec!(0));
        assert_eq!(snapshot.balance, dec!(100));
    }

    #[tokio::test]
    async fn test_closed_trades_without_pnl_contribute_zero() {
        let fixture = setup();
        fixture
            .trades
            .add_closed_trade("acct-1", at(2024, 3, 1, 10), None);
        fixture
            .trades
            .add_closed_trade("acct-1", at(2024, 3, 1, 16), Some(dec!(25)));

        let snapshot = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(snapshot.daily_pnl, dec!(25));
        assert_eq!(snapshot.balance, dec!(25));
    }

    #[tokio::test]
    async fn test_first_snapshot_starts_from_zero() {
        let fixture = setup();

        let snapshot = fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(snapshot.balance, dec!(0));
        assert_eq!(snapshot.daily_pnl, dec!(0));
        assert_eq!(snapshot.deposits, None);
        assert_eq!(snapshot.withdrawals, None);
    }

    #[tokio::test]
    async fn test_manual_create_enforces_uniqueness() {
        let fixture = setup();
        let new_snapshot = NewSnapshot {
            id: None,
            account_id: "acct-1".to_string(),
            date: day(2024, 3, 1),
            balance: dec!(500),
            daily_pnl: dec!(0),
            deposits: Some(dec!(500)),
            withdrawals: None,
            notes: Some("opening snapshot".to_string()),
        };

        fixture
            .service
            .create_snapshot(new_snapshot.clone())
            .await
            .unwrap();
        let second = fixture.service.create_snapshot(new_snapshot).await;
        assert!(matches!(second, Err(Error::DuplicateSnapshot(_))));
    }

    #[tokio::test]
    async fn test_manual_create_rejects_negative_balance() {
        let fixture = setup();
        let new_snapshot = NewSnapshot {
            id: None,
            account_id: "acct-1".to_string(),
            date: day(2024, 3, 1),
            balance: dec!(-1),
            daily_pnl: dec!(0),
            deposits: None,
            withdrawals: None,
            notes: None,
        };

        let result = fixture.service.create_snapshot(new_snapshot).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_returns_chart_order() {
        let fixture = setup();
        fixture.transactions.add_entry(
            "acct-1",
            TransactionType::Deposit,
            dec!(10),
            at(2024, 3, 2, 9),
        );

        fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 2))
            .await
            .unwrap();
        fixture
            .service
            .build_snapshot("acct-1", day(2024, 3, 1))
            .await
            .unwrap();

        let snapshots = fixture
            .service
            .list_snapshots_by_account("acct-1", None, None)
            .unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].date < snapshots[1].date);
    }
}
