//! Schema bootstrap for the songs and couplets tables

use sqlx::PgPool;

use super::DbError;

/// Create the tables if they do not exist yet.
///
/// Idempotent; run once at startup before the server accepts requests.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Ensuring songlib schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id SERIAL PRIMARY KEY,
            song_name TEXT NOT NULL,
            group_name TEXT NOT NULL,
            link TEXT NOT NULL DEFAULT '',
            release_date DATE NOT NULL,
            UNIQUE (song_name, group_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No ON DELETE CASCADE: couplets are removed by the service first
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS couplets (
            song_id INTEGER NOT NULL REFERENCES songs(id),
            sequence_number INTEGER NOT NULL,
            couplet_text TEXT NOT NULL,
            PRIMARY KEY (song_id, sequence_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Schema ready");
    Ok(())
}
