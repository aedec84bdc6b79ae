//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and a bounded
//! number of connect attempts at startup.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connect attempts before giving up at startup.
const CONNECT_ATTEMPTS: u32 = 10;

/// Pause between connect attempts.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/songlib").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
///
/// The database may still be starting (e.g. under docker compose), so
/// connecting is retried up to `CONNECT_ATTEMPTS` times.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let mut attempts_left = CONNECT_ATTEMPTS;

    loop {
        let result = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(err) if attempts_left > 1 => {
                attempts_left -= 1;
                tracing::info!(
                    attempts_left,
                    error = %err,
                    "Postgres is not reachable yet, retrying"
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(err) => return Err(err),
        }
    }
}
