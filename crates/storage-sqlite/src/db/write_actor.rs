//! Single-writer actor serializing every database mutation.
//!
//! One background task owns one SQLite connection and processes write jobs
//! strictly in submission order, each inside an immediate transaction. A
//! ledger-entry write and its balance adjustment therefore commit or roll
//! back together, and no two writers ever observe each other's half-applied
//! state.

use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use tradebook_core::errors::{Error, Result};

type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for submitting write jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, Reply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; any error returned by
    /// the closure rolls the transaction back and is surfaced to the caller
    /// with its original type.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + Any + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| {
                Error::Unexpected("Database writer actor is no longer running".to_string())
            })?;

        let result = ret_rx.await.map_err(|_| {
            Error::Unexpected("Database writer actor dropped the reply".to_string())
        })?;

        result.map(|boxed| {
            *boxed
                .downcast::<T>()
                .unwrap_or_else(|_| panic!("Writer actor returned an unexpected result type"))
        })
    }
}

/// Spawns the writer actor. It acquires one pooled connection and holds it
/// for its entire lifetime; the actor terminates when the last `WriteHandle`
/// is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, Reply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                log::error!("Writer actor could not acquire a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(Error::from);

            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
