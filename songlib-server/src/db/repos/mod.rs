//! Repository traits and their PostgreSQL implementations
//!
//! Each repository follows these patterns:
//! - Takes the caller's [`DbContext`] and runs on the runner it selects
//! - Relies on store constraints; unique violations surface as `AlreadyExists`
//! - Never opens transactions itself; multi-step writes go through `Transactor`

use async_trait::async_trait;

use crate::models::{Couplet, NewSong, Page, SearchQuery, Song, SongId, SongUpdate};

use super::{DbContext, DbError};

pub mod couplets;
pub mod songs;

pub use couplets::PgCoupletRepo;
pub use songs::PgSongRepo;

/// Song metadata storage
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Insert a song and return its store-assigned id.
    async fn insert(&self, ctx: &DbContext, song: &NewSong) -> Result<SongId, DbError>;

    async fn get_by_id(&self, ctx: &DbContext, id: SongId) -> Result<Song, DbError>;

    async fn search(&self, ctx: &DbContext, query: &SearchQuery) -> Result<Vec<Song>, DbError>;

    /// Update the present columns. An empty update touches nothing.
    async fn update_by_id(
        &self,
        ctx: &DbContext,
        id: SongId,
        update: &SongUpdate,
    ) -> Result<(), DbError>;

    async fn delete_by_id(&self, ctx: &DbContext, id: SongId) -> Result<(), DbError>;
}

/// Couplet storage
#[async_trait]
pub trait CoupletRepository: Send + Sync {
    /// Insert all couplets in one statement. An empty slice is a no-op.
    async fn insert(&self, ctx: &DbContext, couplets: &[Couplet]) -> Result<(), DbError>;

    /// One page of a song's couplets, ordered by sequence number.
    async fn get_by_song_id(
        &self,
        ctx: &DbContext,
        song_id: SongId,
        page: Page,
    ) -> Result<Vec<Couplet>, DbError>;

    /// Next free sequence number for a song: `max + 1`, or 1 when it has none.
    async fn get_available_sequence_number(
        &self,
        ctx: &DbContext,
        song_id: SongId,
    ) -> Result<i32, DbError>;

    async fn get_couplets_count(&self, ctx: &DbContext, song_id: SongId) -> Result<i64, DbError>;

    /// Delete all of a song's couplets, returning how many were removed.
    async fn delete_by_song_id(&self, ctx: &DbContext, song_id: SongId) -> Result<u64, DbError>;
}
