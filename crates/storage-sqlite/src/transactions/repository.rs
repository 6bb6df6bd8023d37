use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::{apply_balance_delta, ensure_account_exists};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::account_transactions;
use tradebook_core::constants::DECIMAL_PRECISION;
use tradebook_core::errors::{Error, Result};
use tradebook_core::transactions::{
    amend_delta, signed_amount, NewTransaction, Transaction, TransactionFilters,
    TransactionRepositoryTrait, TransactionUpdate,
};

use super::model::TransactionDB;

/// Repository for managing ledger entry rows.
///
/// Every mutation runs as one write-actor job: the entry write and the
/// balance adjustment commit or roll back together.
pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance.
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let signed = signed_amount(new_transaction.transaction_type, new_transaction.amount);
        let mut transaction_db: TransactionDB = new_transaction.into();
        if transaction_db.id.is_empty() {
            transaction_db.id = Uuid::new_v4().to_string();
        }
        debug!(
            "Recording transaction {} for account {}",
            transaction_db.id, transaction_db.account_id
        );

        self.writer
            .exec(move |conn| {
                ensure_account_exists(conn, &transaction_db.account_id)?;

                diesel::insert_into(account_transactions::table)
                    .values(&transaction_db)
                    .execute(conn)
                    .into_core()?;

                apply_balance_delta(conn, &transaction_db.account_id, signed)?;

                transaction_db.try_into()
            })
            .await
    }

    async fn update(&self, update: TransactionUpdate) -> Result<Transaction> {
        self.writer
            .exec(move |conn| {
                let original: Transaction = account_transactions::table
                    .select(TransactionDB::as_select())
                    .find(&update.id)
                    .first::<TransactionDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Transaction {}", update.id)))?
                    .try_into()?;

                let new_type = update.transaction_type.unwrap_or(original.transaction_type);
                let new_amount = update.amount.unwrap_or(original.amount);
                let new_date = update.date.unwrap_or(original.date);
                let new_description = update.description.or_else(|| original.description.clone());

                let delta = amend_delta(&original, new_type, new_amount);

                let now = Utc::now().naive_utc();
                diesel::update(account_transactions::table.find(&original.id))
                    .set((
                        account_transactions::transaction_type.eq(new_type.as_str()),
                        account_transactions::amount
                            .eq(new_amount.round_dp(DECIMAL_PRECISION).to_string()),
                        account_transactions::date.eq(new_date.naive_utc()),
                        account_transactions::description.eq(new_description.clone()),
                        account_transactions::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .into_core()?;

                if !delta.is_zero() {
                    apply_balance_delta(conn, &original.account_id, delta)?;
                }

                Ok(Transaction {
                    transaction_type: new_type,
                    amount: new_amount,
                    date: new_date,
                    description: new_description,
                    updated_at: crate::utils::utc(now),
                    ..original
                })
            })
            .await
    }

    async fn delete(&self, transaction_id: &str) -> Result<Transaction> {
        let id_owned = transaction_id.to_string();
        self.writer
            .exec(move |conn| {
                let existing: Transaction = account_transactions::table
                    .select(TransactionDB::as_select())
                    .find(&id_owned)
                    .first::<TransactionDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::NotFound(format!("Transaction {}", id_owned)))?
                    .try_into()?;

                // Reverse the balance effect before removing the entry.
                apply_balance_delta(conn, &existing.account_id, -existing.signed_amount())?;

                diesel::delete(account_transactions::table.find(&id_owned))
                    .execute(conn)
                    .into_core()?;

                Ok(existing)
            })
            .await
    }

    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        account_transactions::table
            .select(TransactionDB::as_select())
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", transaction_id)))?
            .try_into()
    }

    fn list_by_account(
        &self,
        account_id: &str,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = account_transactions::table
            .filter(account_transactions::account_id.eq(account_id))
            .into_boxed();

        if let Some(kind) = filters.transaction_type {
            query = query.filter(account_transactions::transaction_type.eq(kind.as_str()));
        }
        if let Some(start) = filters.start_date {
            query = query.filter(account_transactions::date.ge(start.naive_utc()));
        }
        if let Some(end) = filters.end_date {
            query = query.filter(account_transactions::date.le(end.naive_utc()));
        }

        query
            .select(TransactionDB::as_select())
            .order(account_transactions::date.desc())
            .load::<TransactionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    fn get_in_range(
        &self,
        account_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        account_transactions::table
            .filter(account_transactions::account_id.eq(account_id))
            .filter(account_transactions::date.ge(start.naive_utc()))
            .filter(account_transactions::date.lt(end.naive_utc()))
            .select(TransactionDB::as_select())
            .order(account_transactions::date.asc())
            .load::<TransactionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }
}
