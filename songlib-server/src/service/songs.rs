//! Song service - orchestrates repositories, transactions and song info
//!
//! Multi-step writes run inside one `Transactor` scope:
//! - insert: song row, then its couplets
//! - update_text: delete all couplets, then insert the new ones
//! - patch: metadata update, then the update_text steps
//! - delete: couplets first, then the song

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::{
    CoupletRepository, Database, DbContext, DbError, PgCoupletRepo, PgSongRepo, SongRepository,
    Transactor,
};
use crate::models::{couplets_from_text, Name, NewSong, Page, SearchQuery, Song, SongId, SongUpdate};
use crate::webapi::{SongInfoClient, SongInfoSource};

use super::SongError;

/// Release date format accepted by [`SongService::update`]
const UPDATE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Song to add to the catalogue; details are looked up by name
#[derive(Debug, Clone)]
pub struct InsertSongInput {
    pub group: Name,
    pub song: Name,
}

/// Metadata changes; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateSongInput {
    pub song: Option<Name>,
    pub group: Option<Name>,
    pub link: Option<String>,
    /// `YYYY-MM-DD`
    pub release_date: Option<String>,
}

impl UpdateSongInput {
    pub fn is_empty(&self) -> bool {
        self.song.is_none()
            && self.group.is_none()
            && self.link.is_none()
            && self.release_date.is_none()
    }
}

/// One page of a song's lyrics plus the song's total couplet count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongText {
    pub text: Vec<String>,
    pub count: i64,
}

/// Failure inside the insert transaction, tagged with the step that failed
enum InsertStep {
    Song(DbError),
    Couplets(DbError),
    Transaction(DbError),
}

impl From<DbError> for InsertStep {
    fn from(err: DbError) -> Self {
        Self::Transaction(err)
    }
}

impl From<InsertStep> for SongError {
    fn from(step: InsertStep) -> Self {
        match step {
            InsertStep::Song(err @ DbError::AlreadyExists { .. }) => Self::AlreadyExists(err),
            InsertStep::Song(err) | InsertStep::Transaction(err) => Self::CannotInsertSong(err),
            InsertStep::Couplets(err) => Self::CannotInsertCouplets(err),
        }
    }
}

/// Failure inside the combined patch transaction
enum PatchStep {
    Song(SongError),
    Transaction(DbError),
}

impl From<SongError> for PatchStep {
    fn from(err: SongError) -> Self {
        Self::Song(err)
    }
}

impl From<DbError> for PatchStep {
    fn from(err: DbError) -> Self {
        Self::Transaction(err)
    }
}

impl From<PatchStep> for SongError {
    fn from(step: PatchStep) -> Self {
        match step {
            PatchStep::Song(err) => err,
            PatchStep::Transaction(err) => Self::CannotUpdateSong(err),
        }
    }
}

/// Song catalogue operations
pub struct SongService<S, C, T, I> {
    songs: S,
    couplets: C,
    transactor: T,
    song_info: I,
}

/// Service wired to PostgreSQL and the HTTP song-info client
pub type PgSongService = SongService<PgSongRepo, PgCoupletRepo, Database, SongInfoClient>;

impl PgSongService {
    pub fn from_database(db: Database, song_info: SongInfoClient) -> Self {
        SongService::new(
            PgSongRepo::new(db.clone()),
            PgCoupletRepo::new(db.clone()),
            db,
            song_info,
        )
    }
}

impl<S, C, T, I> SongService<S, C, T, I>
where
    S: SongRepository,
    C: CoupletRepository,
    T: Transactor,
    I: SongInfoSource,
{
    pub fn new(songs: S, couplets: C, transactor: T, song_info: I) -> Self {
        Self {
            songs,
            couplets,
            transactor,
            song_info,
        }
    }

    /// Look up a song's details and store it with its couplets.
    ///
    /// The song row and its couplets are written in one transaction, so a
    /// failed couplet insert leaves no song behind.
    pub async fn insert(&self, ctx: &DbContext, input: InsertSongInput) -> Result<Song, SongError> {
        let info = self
            .song_info
            .get(input.group.as_str(), input.song.as_str())
            .await
            .map_err(SongError::CannotGetSongInfo)?;

        let new_song = NewSong {
            name: input.song.into_string(),
            group: input.group.into_string(),
            link: info.link,
            release_date: info.release_date,
        };
        let text = info.text;

        let song = self
            .transactor
            .within_transaction(ctx, |ctx| async move {
                let id = self
                    .songs
                    .insert(&ctx, &new_song)
                    .await
                    .map_err(InsertStep::Song)?;

                let couplets = couplets_from_text(id, &text);
                self.couplets
                    .insert(&ctx, &couplets)
                    .await
                    .map_err(InsertStep::Couplets)?;

                Ok::<_, InsertStep>(new_song.into_song(id))
            })
            .await?;

        tracing::info!(id = song.id, group = %song.group, song = %song.name, "song added");
        Ok(song)
    }

    pub async fn get(&self, ctx: &DbContext, id: SongId) -> Result<Song, SongError> {
        self.songs.get_by_id(ctx, id).await.map_err(|err| {
            if err.is_not_found() {
                SongError::NotFound { id }
            } else {
                SongError::CannotGetSong(err)
            }
        })
    }

    pub async fn search(&self, ctx: &DbContext, query: &SearchQuery) -> Result<Vec<Song>, SongError> {
        self.songs
            .search(ctx, query)
            .await
            .map_err(SongError::CannotGetSong)
    }

    /// One page of a song's couplet texts, with the total couplet count.
    ///
    /// A song without couplets yields empty text and a count of 0; a
    /// missing song is `NotFound`.
    pub async fn get_text(
        &self,
        ctx: &DbContext,
        id: SongId,
        page: Page,
    ) -> Result<SongText, SongError> {
        let count = self
            .couplets
            .get_couplets_count(ctx, id)
            .await
            .map_err(SongError::CannotGetText)?;

        if count == 0 {
            return match self.songs.get_by_id(ctx, id).await {
                Ok(_) => Ok(SongText {
                    text: Vec::new(),
                    count: 0,
                }),
                Err(err) if err.is_not_found() => Err(SongError::NotFound { id }),
                Err(err) => Err(SongError::CannotGetText(err)),
            };
        }

        let couplets = self
            .couplets
            .get_by_song_id(ctx, id, page)
            .await
            .map_err(SongError::CannotGetText)?;

        Ok(SongText {
            text: couplets.into_iter().map(|c| c.text).collect(),
            count,
        })
    }

    /// Apply a partial metadata update.
    pub async fn update(
        &self,
        ctx: &DbContext,
        id: SongId,
        input: UpdateSongInput,
    ) -> Result<(), SongError> {
        if input.is_empty() {
            return Err(SongError::FieldsMissing);
        }

        let release_date = input
            .release_date
            .map(|value| {
                NaiveDate::parse_from_str(&value, UPDATE_DATE_FORMAT)
                    .map_err(|source| SongError::InvalidReleaseDate { value, source })
            })
            .transpose()?;

        let update = SongUpdate {
            name: input.song.map(Name::into_string),
            group: input.group.map(Name::into_string),
            link: input.link,
            release_date,
        };

        self.songs
            .update_by_id(ctx, id, &update)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    SongError::NotFound { id }
                } else {
                    SongError::CannotUpdateSong(err)
                }
            })
    }

    /// Replace a song's lyrics.
    ///
    /// Deletes all couplets and inserts the new ones in one transaction;
    /// on failure the previous couplets remain.
    pub async fn update_text(&self, ctx: &DbContext, id: SongId, text: &str) -> Result<(), SongError> {
        let couplets = couplets_from_text(id, text);

        self.transactor
            .within_transaction(ctx, |ctx| async move {
                let removed = self.couplets.delete_by_song_id(&ctx, id).await?;
                self.couplets.insert(&ctx, &couplets).await?;
                tracing::debug!(id, removed, inserted = couplets.len(), "replaced couplets");
                Ok::<_, DbError>(())
            })
            .await
            .map_err(SongError::CannotUpdateCouplets)
    }

    /// Apply a metadata update and an optional lyrics replace together.
    ///
    /// With both present, the two run in one transaction: a failed lyrics
    /// replace also discards the metadata change.
    pub async fn patch(
        &self,
        ctx: &DbContext,
        id: SongId,
        input: UpdateSongInput,
        text: Option<String>,
    ) -> Result<(), SongError> {
        let Some(text) = text else {
            return self.update(ctx, id, input).await;
        };
        if input.is_empty() {
            return self.update_text(ctx, id, &text).await;
        }

        self.transactor
            .within_transaction(ctx, |ctx| async move {
                self.update(&ctx, id, input).await?;
                self.update_text(&ctx, id, &text).await?;
                Ok::<_, PatchStep>(())
            })
            .await
            .map_err(SongError::from)
    }

    /// Delete a song and its couplets in one transaction.
    pub async fn delete(&self, ctx: &DbContext, id: SongId) -> Result<(), SongError> {
        self.transactor
            .within_transaction(ctx, |ctx| async move {
                self.couplets.delete_by_song_id(&ctx, id).await?;
                self.songs.delete_by_id(&ctx, id).await
            })
            .await
            .map_err(|err: DbError| {
                if err.is_not_found() {
                    SongError::NotFound { id }
                } else {
                    SongError::CannotDeleteSong(err)
                }
            })
    }
}

/// Object-safe view of the song service, as used by HTTP handlers
#[async_trait]
pub trait SongCatalog: Send + Sync {
    async fn insert(&self, input: InsertSongInput) -> Result<Song, SongError>;
    async fn get(&self, id: SongId) -> Result<Song, SongError>;
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Song>, SongError>;
    async fn get_text(&self, id: SongId, page: Page) -> Result<SongText, SongError>;
    async fn update(&self, id: SongId, input: UpdateSongInput) -> Result<(), SongError>;
    async fn update_text(&self, id: SongId, text: &str) -> Result<(), SongError>;
    async fn patch(
        &self,
        id: SongId,
        input: UpdateSongInput,
        text: Option<String>,
    ) -> Result<(), SongError>;
    async fn delete(&self, id: SongId) -> Result<(), SongError>;
}

#[async_trait]
impl<S, C, T, I> SongCatalog for SongService<S, C, T, I>
where
    S: SongRepository,
    C: CoupletRepository,
    T: Transactor,
    I: SongInfoSource,
{
    async fn insert(&self, input: InsertSongInput) -> Result<Song, SongError> {
        SongService::insert(self, &DbContext::background(), input).await
    }

    async fn get(&self, id: SongId) -> Result<Song, SongError> {
        SongService::get(self, &DbContext::background(), id).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Song>, SongError> {
        SongService::search(self, &DbContext::background(), query).await
    }

    async fn get_text(&self, id: SongId, page: Page) -> Result<SongText, SongError> {
        SongService::get_text(self, &DbContext::background(), id, page).await
    }

    async fn update(&self, id: SongId, input: UpdateSongInput) -> Result<(), SongError> {
        SongService::update(self, &DbContext::background(), id, input).await
    }

    async fn update_text(&self, id: SongId, text: &str) -> Result<(), SongError> {
        SongService::update_text(self, &DbContext::background(), id, text).await
    }

    async fn patch(
        &self,
        id: SongId,
        input: UpdateSongInput,
        text: Option<String>,
    ) -> Result<(), SongError> {
        SongService::patch(self, &DbContext::background(), id, input, text).await
    }

    async fn delete(&self, id: SongId) -> Result<(), SongError> {
        SongService::delete(self, &DbContext::background(), id).await
    }
}
