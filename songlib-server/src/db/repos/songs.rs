//! Song repository
//!
//! Metadata CRUD and whitelisted search over the `songs` table.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::db::{Database, DbContext, DbError};
use crate::models::{NewSong, SearchQuery, Song, SongId, SongUpdate};

use super::SongRepository;

const RESOURCE: &str = "song";

/// PostgreSQL-backed [`SongRepository`]
#[derive(Debug, Clone)]
pub struct PgSongRepo {
    db: Database,
}

impl PgSongRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Build `UPDATE songs SET ... WHERE id = $n` for the present columns.
///
/// Returns `None` for an empty update.
fn update_query(id: SongId, update: &SongUpdate) -> Option<QueryBuilder<'static, Postgres>> {
    if update.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("UPDATE songs SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &update.name {
            set.push("song_name = ").push_bind_unseparated(name.clone());
        }
        if let Some(group) = &update.group {
            set.push("group_name = ").push_bind_unseparated(group.clone());
        }
        if let Some(link) = &update.link {
            set.push("link = ").push_bind_unseparated(link.clone());
        }
        if let Some(release_date) = update.release_date {
            set.push("release_date = ").push_bind_unseparated(release_date);
        }
    }
    qb.push(" WHERE id = ").push_bind(id);

    Some(qb)
}

#[async_trait]
impl SongRepository for PgSongRepo {
    async fn insert(&self, ctx: &DbContext, song: &NewSong) -> Result<SongId, DbError> {
        let mut runner = self.db.runner(ctx).await?;

        let id: SongId = sqlx::query_scalar(
            r#"
            INSERT INTO songs (song_name, group_name, link, release_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&song.name)
        .bind(&song.group)
        .bind(&song.link)
        .bind(song.release_date)
        .fetch_one(&mut *runner)
        .await
        .map_err(|e| DbError::from_write(e, RESOURCE))?;

        tracing::debug!(id, group = %song.group, song = %song.name, "inserted song");
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &DbContext, id: SongId) -> Result<Song, DbError> {
        let mut runner = self.db.runner(ctx).await?;

        sqlx::query_as::<_, Song>(
            r#"
            SELECT id, song_name, group_name, link, release_date
            FROM songs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *runner)
        .await?
        .ok_or_else(|| DbError::not_found(RESOURCE, id))
    }

    async fn search(&self, ctx: &DbContext, query: &SearchQuery) -> Result<Vec<Song>, DbError> {
        let mut qb = query.to_query_builder();
        tracing::debug!(sql = qb.sql(), "searching songs");

        let mut runner = self.db.runner(ctx).await?;
        let songs = qb.build_query_as::<Song>().fetch_all(&mut *runner).await?;
        Ok(songs)
    }

    async fn update_by_id(
        &self,
        ctx: &DbContext,
        id: SongId,
        update: &SongUpdate,
    ) -> Result<(), DbError> {
        let Some(mut qb) = update_query(id, update) else {
            return Ok(());
        };
        tracing::debug!(sql = qb.sql(), id, "updating song");

        let mut runner = self.db.runner(ctx).await?;
        let result = qb
            .build()
            .execute(&mut *runner)
            .await
            .map_err(|e| DbError::from_write(e, RESOURCE))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(RESOURCE, id));
        }
        Ok(())
    }

    async fn delete_by_id(&self, ctx: &DbContext, id: SongId) -> Result<(), DbError> {
        let mut runner = self.db.runner(ctx).await?;

        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&mut *runner)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(RESOURCE, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_update_builds_nothing() {
        assert!(update_query(1, &SongUpdate::default()).is_none());
    }

    #[test]
    fn update_sets_only_present_columns() {
        let update = SongUpdate {
            group: Some("Muse".into()),
            release_date: NaiveDate::from_ymd_opt(2006, 7, 3),
            ..Default::default()
        };

        let qb = update_query(42, &update).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE songs SET group_name = $1, release_date = $2 WHERE id = $3"
        );
    }

    #[test]
    fn single_column_update_has_no_separator() {
        let update = SongUpdate {
            link: Some("https://example.com".into()),
            ..Default::default()
        };

        let qb = update_query(1, &update).unwrap();
        assert_eq!(qb.sql(), "UPDATE songs SET link = $1 WHERE id = $2");
    }
}
