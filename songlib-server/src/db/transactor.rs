//! Transaction scopes for multi-step writes

use std::future::Future;

use async_trait::async_trait;

use super::context::TxHandle;
use super::{Database, DbContext, DbError};

/// Runs a closure inside one store transaction.
///
/// Repositories called with the context handed to the closure join the
/// transaction through [`Database::runner`] without any change.
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`, and
    /// returns `f`'s error unchanged. If `ctx` already carries a transaction
    /// `f` joins it and the outer scope decides the outcome.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or a converted [`DbError`] when the transaction
    /// cannot be opened or committed.
    async fn within_transaction<F, Fut, T, E>(&self, ctx: &DbContext, f: F) -> Result<T, E>
    where
        F: FnOnce(DbContext) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + Send;
}

#[async_trait]
impl Transactor for Database {
    async fn within_transaction<F, Fut, T, E>(&self, ctx: &DbContext, f: F) -> Result<T, E>
    where
        F: FnOnce(DbContext) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + Send,
    {
        if ctx.in_transaction() {
            return f(ctx.clone()).await;
        }

        let tx = self.pool().begin().await.map_err(DbError::from)?;
        let handle = TxHandle::new(tx);

        // A panic or a dropped future drops the transaction, and sqlx rolls
        // back a transaction that is dropped while still open.
        match f(ctx.with_tx(handle.clone())).await {
            Ok(value) => {
                handle.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = handle.rollback().await {
                    tracing::warn!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}
