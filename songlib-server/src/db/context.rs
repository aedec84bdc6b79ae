//! Execution context carrying an optional open transaction
//!
//! A [`DbContext`] is passed explicitly from the service down to every
//! repository call. It is a plain value: deriving a context with a
//! transaction never affects other callers holding their own context.

use std::fmt;
use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};

use super::DbError;

pub(crate) type PgTransaction = Transaction<'static, Postgres>;

/// Locked access to an open transaction
pub(crate) type TxGuard = OwnedMappedMutexGuard<Option<PgTransaction>, PgTransaction>;

/// Shared handle to one open store transaction.
///
/// The slot is emptied when the owning scope commits or rolls back, so a
/// handle that outlives its scope can no longer run statements.
#[derive(Clone)]
pub struct TxHandle {
    slot: Arc<Mutex<Option<PgTransaction>>>,
}

impl TxHandle {
    pub(crate) fn new(tx: PgTransaction) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Lock the transaction for the duration of one repository operation.
    pub(crate) async fn lock(&self) -> Result<TxGuard, DbError> {
        let guard = self.slot.clone().lock_owned().await;
        OwnedMutexGuard::try_map(guard, Option::as_mut).map_err(|_| DbError::TransactionClosed)
    }

    pub(crate) async fn commit(&self) -> Result<(), DbError> {
        self.take().await?.commit().await?;
        Ok(())
    }

    pub(crate) async fn rollback(&self) -> Result<(), DbError> {
        self.take().await?.rollback().await?;
        Ok(())
    }

    async fn take(&self) -> Result<PgTransaction, DbError> {
        self.slot.lock().await.take().ok_or(DbError::TransactionClosed)
    }
}

impl fmt::Debug for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxHandle").finish_non_exhaustive()
    }
}

/// Per-call execution context
#[derive(Debug, Clone, Default)]
pub struct DbContext {
    tx: Option<TxHandle>,
}

impl DbContext {
    /// Root context with no transaction; statements run on the pool.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose statements run inside `tx`.
    pub fn with_tx(&self, tx: TxHandle) -> Self {
        Self { tx: Some(tx) }
    }

    /// The attached transaction, if any.
    pub fn tx(&self) -> Option<&TxHandle> {
        self.tx.as_ref()
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }
}
