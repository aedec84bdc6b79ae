//! In-memory repositories, transactor and song-info source for tests

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{CoupletRepository, DbContext, DbError, SongRepository, Transactor};
use crate::models::{Column, Couplet, NewSong, Page, SearchQuery, Song, SongId, SongUpdate};
use crate::webapi::{SongInfo, SongInfoError, SongInfoSource};

use super::SongService;

/// Operation a test can make fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FailPoint {
    Begin,
    SongInsert,
    SongGet,
    SongSearch,
    SongUpdate,
    SongDelete,
    CoupletInsert,
    CoupletGet,
    CoupletCount,
    CoupletDelete,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    songs: BTreeMap<SongId, Song>,
    couplets: BTreeMap<(SongId, i32), String>,
    next_id: SongId,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    statements: usize,
    failures: HashSet<FailPoint>,
}

/// Shared in-memory store behind all fakes
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeStore(Arc<Mutex<Inner>>);

fn injected() -> DbError {
    DbError::Sqlx(sqlx::Error::Protocol("injected failure".into()))
}

impl FakeStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.0.lock().unwrap()
    }

    /// Count one statement and apply any injected failure.
    fn statement(&self, point: FailPoint) -> Result<MutexGuard<'_, Inner>, DbError> {
        let mut inner = self.lock();
        inner.statements += 1;
        if inner.failures.contains(&point) {
            return Err(injected());
        }
        Ok(inner)
    }

    pub(crate) fn fail(&self, point: FailPoint) {
        self.lock().failures.insert(point);
    }

    pub(crate) fn statements(&self) -> usize {
        self.lock().statements
    }

    /// Insert a song with its couplets directly, without counting statements.
    pub(crate) fn seed(&self, group: &str, name: &str, text: &str) -> SongId {
        let mut inner = self.lock();
        inner.tables.next_id += 1;
        let id = inner.tables.next_id;
        inner.tables.songs.insert(
            id,
            Song {
                id,
                name: name.into(),
                group: group.into(),
                link: format!("https://songs.example/{id}"),
                release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            },
        );
        if !text.is_empty() {
            for couplet in crate::models::couplets_from_text(id, text) {
                inner
                    .tables
                    .couplets
                    .insert((id, couplet.sequence_number), couplet.text);
            }
        }
        id
    }

    pub(crate) fn song(&self, id: SongId) -> Option<Song> {
        self.lock().tables.songs.get(&id).cloned()
    }

    pub(crate) fn song_count(&self) -> usize {
        self.lock().tables.songs.len()
    }

    /// Couplet texts of a song in sequence order.
    pub(crate) fn couplets(&self, song_id: SongId) -> Vec<(i32, String)> {
        self.lock()
            .tables
            .couplets
            .range((song_id, i32::MIN)..=(song_id, i32::MAX))
            .map(|((_, n), text)| (*n, text.clone()))
            .collect()
    }

    fn snapshot(&self) -> Tables {
        self.lock().tables.clone()
    }

    fn restore(&self, tables: Tables) {
        self.lock().tables = tables;
    }
}

fn column_value(song: &Song, column: Column) -> String {
    match column.name {
        "id" => song.id.to_string(),
        "song_name" => song.name.clone(),
        "group_name" => song.group.clone(),
        "link" => song.link.clone(),
        "release_date" => song.release_date.to_string(),
        other => panic!("unexpected column {other}"),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeSongRepo(pub(crate) FakeStore);

#[async_trait]
impl SongRepository for FakeSongRepo {
    async fn insert(&self, _ctx: &DbContext, song: &NewSong) -> Result<SongId, DbError> {
        let mut inner = self.0.statement(FailPoint::SongInsert)?;
        let tables = &mut inner.tables;
        if tables
            .songs
            .values()
            .any(|s| s.name == song.name && s.group == song.group)
        {
            return Err(DbError::AlreadyExists { resource: "song" });
        }
        tables.next_id += 1;
        let id = tables.next_id;
        tables.songs.insert(id, song.clone().into_song(id));
        Ok(id)
    }

    async fn get_by_id(&self, _ctx: &DbContext, id: SongId) -> Result<Song, DbError> {
        let inner = self.0.statement(FailPoint::SongGet)?;
        inner
            .tables
            .songs
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("song", id))
    }

    async fn search(&self, _ctx: &DbContext, query: &SearchQuery) -> Result<Vec<Song>, DbError> {
        let inner = self.0.statement(FailPoint::SongSearch)?;
        let filters: Vec<_> = query.accepted_filters().collect();
        Ok(inner
            .tables
            .songs
            .values()
            .filter(|song| {
                filters
                    .iter()
                    .all(|(column, value)| column_value(song, *column) == *value)
            })
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn update_by_id(
        &self,
        _ctx: &DbContext,
        id: SongId,
        update: &SongUpdate,
    ) -> Result<(), DbError> {
        if update.is_empty() {
            return Ok(());
        }
        let mut inner = self.0.statement(FailPoint::SongUpdate)?;
        let song = inner
            .tables
            .songs
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("song", id))?;
        if let Some(name) = &update.name {
            song.name = name.clone();
        }
        if let Some(group) = &update.group {
            song.group = group.clone();
        }
        if let Some(link) = &update.link {
            song.link = link.clone();
        }
        if let Some(release_date) = update.release_date {
            song.release_date = release_date;
        }
        Ok(())
    }

    async fn delete_by_id(&self, _ctx: &DbContext, id: SongId) -> Result<(), DbError> {
        let mut inner = self.0.statement(FailPoint::SongDelete)?;
        let tables = &mut inner.tables;
        if tables.couplets.keys().any(|(song_id, _)| *song_id == id) {
            return Err(DbError::Sqlx(sqlx::Error::Protocol(
                "couplets still reference song".into(),
            )));
        }
        tables
            .songs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("song", id))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeCoupletRepo(pub(crate) FakeStore);

#[async_trait]
impl CoupletRepository for FakeCoupletRepo {
    async fn insert(&self, _ctx: &DbContext, couplets: &[Couplet]) -> Result<(), DbError> {
        if couplets.is_empty() {
            return Ok(());
        }
        let mut inner = self.0.statement(FailPoint::CoupletInsert)?;
        let tables = &mut inner.tables;
        for couplet in couplets {
            let key = (couplet.song_id, couplet.sequence_number);
            if !tables.songs.contains_key(&couplet.song_id) || tables.couplets.contains_key(&key)
            {
                return Err(DbError::Sqlx(sqlx::Error::Protocol(
                    "constraint violation".into(),
                )));
            }
        }
        for couplet in couplets {
            tables.couplets.insert(
                (couplet.song_id, couplet.sequence_number),
                couplet.text.clone(),
            );
        }
        Ok(())
    }

    async fn get_by_song_id(
        &self,
        _ctx: &DbContext,
        song_id: SongId,
        page: Page,
    ) -> Result<Vec<Couplet>, DbError> {
        let inner = self.0.statement(FailPoint::CoupletGet)?;
        Ok(inner
            .tables
            .couplets
            .range((song_id, i32::MIN)..=(song_id, i32::MAX))
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|((song_id, n), text)| Couplet {
                song_id: *song_id,
                sequence_number: *n,
                text: text.clone(),
            })
            .collect())
    }

    async fn get_available_sequence_number(
        &self,
        _ctx: &DbContext,
        song_id: SongId,
    ) -> Result<i32, DbError> {
        let inner = self.0.statement(FailPoint::CoupletCount)?;
        Ok(inner
            .tables
            .couplets
            .range((song_id, i32::MIN)..=(song_id, i32::MAX))
            .map(|((_, n), _)| *n)
            .max()
            .unwrap_or(0)
            + 1)
    }

    async fn get_couplets_count(&self, _ctx: &DbContext, song_id: SongId) -> Result<i64, DbError> {
        let inner = self.0.statement(FailPoint::CoupletCount)?;
        Ok(inner
            .tables
            .couplets
            .range((song_id, i32::MIN)..=(song_id, i32::MAX))
            .count() as i64)
    }

    async fn delete_by_song_id(&self, _ctx: &DbContext, song_id: SongId) -> Result<u64, DbError> {
        let mut inner = self.0.statement(FailPoint::CoupletDelete)?;
        let before = inner.tables.couplets.len();
        inner.tables.couplets.retain(|(id, _), _| *id != song_id);
        Ok((before - inner.tables.couplets.len()) as u64)
    }
}

/// Transactor that snapshots the store and restores it when the scope fails
#[derive(Debug, Clone)]
pub(crate) struct FakeTransactor(pub(crate) FakeStore);

#[async_trait]
impl Transactor for FakeTransactor {
    async fn within_transaction<F, Fut, T, E>(&self, ctx: &DbContext, f: F) -> Result<T, E>
    where
        F: FnOnce(DbContext) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + Send,
    {
        if self.0.lock().failures.contains(&FailPoint::Begin) {
            return Err(E::from(injected()));
        }

        let snapshot = self.0.snapshot();
        let result = f(ctx.clone()).await;
        if result.is_err() {
            self.0.restore(snapshot);
        }
        result
    }
}

/// Song-info source answering every lookup with fixed details, or failing
#[derive(Debug, Clone)]
pub(crate) struct FakeSongInfo {
    info: Option<SongInfo>,
}

impl FakeSongInfo {
    pub(crate) fn with_text(text: &str) -> Self {
        Self {
            info: Some(SongInfo {
                release_date: NaiveDate::from_ymd_opt(1991, 9, 10).unwrap(),
                text: text.into(),
                link: "https://www.youtube.com/watch?v=hTWKbfoikeg".into(),
            }),
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self { info: None }
    }
}

#[async_trait]
impl SongInfoSource for FakeSongInfo {
    async fn get(&self, _group: &str, _song: &str) -> Result<SongInfo, SongInfoError> {
        self.info
            .clone()
            .ok_or(SongInfoError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }
}

pub(crate) type FakeSongService =
    SongService<FakeSongRepo, FakeCoupletRepo, FakeTransactor, FakeSongInfo>;

/// Service wired to fakes over `store`.
pub(crate) fn service(store: &FakeStore, info: FakeSongInfo) -> FakeSongService {
    SongService::new(
        FakeSongRepo(store.clone()),
        FakeCoupletRepo(store.clone()),
        FakeTransactor(store.clone()),
        info,
    )
}
