//! Couplet repository
//!
//! Handles the ordered lyric rows of a song:
//! - Bulk insert in a single multi-row statement
//! - Paged reads ordered by sequence number

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::db::{Database, DbContext, DbError};
use crate::models::{Couplet, Page, SongId};

use super::CoupletRepository;

const RESOURCE: &str = "couplet";

/// PostgreSQL-backed [`CoupletRepository`]
#[derive(Debug, Clone)]
pub struct PgCoupletRepo {
    db: Database,
}

impl PgCoupletRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Build one multi-row INSERT for `couplets`.
fn insert_query(couplets: &[Couplet]) -> QueryBuilder<'static, Postgres> {
    let mut qb =
        QueryBuilder::new("INSERT INTO couplets (song_id, sequence_number, couplet_text) ");
    qb.push_values(couplets, |mut row, couplet| {
        row.push_bind(couplet.song_id)
            .push_bind(couplet.sequence_number)
            .push_bind(couplet.text.clone());
    });
    qb
}

#[async_trait]
impl CoupletRepository for PgCoupletRepo {
    async fn insert(&self, ctx: &DbContext, couplets: &[Couplet]) -> Result<(), DbError> {
        if couplets.is_empty() {
            return Ok(());
        }

        let mut qb = insert_query(couplets);
        tracing::debug!(rows = couplets.len(), "inserting couplets");

        let mut runner = self.db.runner(ctx).await?;
        qb.build()
            .execute(&mut *runner)
            .await
            .map_err(|e| DbError::from_write(e, RESOURCE))?;
        Ok(())
    }

    async fn get_by_song_id(
        &self,
        ctx: &DbContext,
        song_id: SongId,
        page: Page,
    ) -> Result<Vec<Couplet>, DbError> {
        let mut runner = self.db.runner(ctx).await?;

        let couplets = sqlx::query_as::<_, Couplet>(
            r#"
            SELECT song_id, sequence_number, couplet_text
            FROM couplets
            WHERE song_id = $1
            ORDER BY sequence_number
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(song_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *runner)
        .await?;

        Ok(couplets)
    }

    async fn get_available_sequence_number(
        &self,
        ctx: &DbContext,
        song_id: SongId,
    ) -> Result<i32, DbError> {
        let mut runner = self.db.runner(ctx).await?;

        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_number), 0) + 1 FROM couplets WHERE song_id = $1",
        )
        .bind(song_id)
        .fetch_one(&mut *runner)
        .await?;

        Ok(next)
    }

    async fn get_couplets_count(&self, ctx: &DbContext, song_id: SongId) -> Result<i64, DbError> {
        let mut runner = self.db.runner(ctx).await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM couplets WHERE song_id = $1")
            .bind(song_id)
            .fetch_one(&mut *runner)
            .await?;

        Ok(count)
    }

    async fn delete_by_song_id(&self, ctx: &DbContext, song_id: SongId) -> Result<u64, DbError> {
        let mut runner = self.db.runner(ctx).await?;

        let result = sqlx::query("DELETE FROM couplets WHERE song_id = $1")
            .bind(song_id)
            .execute(&mut *runner)
            .await?;

        tracing::debug!(song_id, rows = result.rows_affected(), "deleted couplets");
        Ok(result.rows_affected())
    }
}
