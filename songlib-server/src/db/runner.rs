//! Query runner selection - pool connection or the context's transaction

use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};

use super::context::TxGuard;
use super::{DbContext, DbError};

/// Connection a repository operation runs all of its statements on.
///
/// Derefs to [`PgConnection`], so statements execute with
/// `.fetch_one(&mut *runner)` regardless of where the connection came from.
pub enum QueryRunner {
    /// Connection checked out of the shared pool for one operation
    Pool(PoolConnection<Postgres>),
    /// The context's open transaction, locked for one operation
    Tx(TxGuard),
}

impl Deref for QueryRunner {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Self::Pool(conn) => &**conn,
            Self::Tx(tx) => &***tx,
        }
    }
}

impl DerefMut for QueryRunner {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Self::Pool(conn) => &mut **conn,
            Self::Tx(tx) => &mut ***tx,
        }
    }
}

/// Shared database handle used by repositories and the transactor
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial statement on a pooled connection.
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Select where the next operation runs.
    ///
    /// Inside a transaction scope this is the scope's transaction;
    /// otherwise a connection is acquired from the pool.
    pub async fn runner(&self, ctx: &DbContext) -> Result<QueryRunner, DbError> {
        match ctx.tx() {
            Some(tx) => Ok(QueryRunner::Tx(tx.lock().await?)),
            None => Ok(QueryRunner::Pool(self.pool.acquire().await?)),
        }
    }
}
