//! Song endpoints, mounted under `/api/v1`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::ValidSongId;
use crate::http::query::{parse_page, parse_search};
use crate::models::{Name, Song, ValidationError};
use crate::service::{InsertSongInput, SongText, UpdateSongInput};
use crate::state::AppState;

/// Raw query-string pairs, kept in request order
type QueryPairs = Query<Vec<(String, String)>>;

/// Add song request
#[derive(Deserialize)]
pub struct InsertSongRequest {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub song: String,
}

impl InsertSongRequest {
    fn validate(self) -> Result<InsertSongInput, ValidationError> {
        Ok(InsertSongInput {
            group: Name::new("group", &self.group)?,
            song: Name::new("song", &self.song)?,
        })
    }
}

/// Partial song update; `text` replaces the lyrics
#[derive(Deserialize)]
pub struct PatchSongRequest {
    pub song: Option<String>,
    pub group: Option<String>,
    pub link: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    pub text: Option<String>,
}

impl PatchSongRequest {
    fn validate(self) -> Result<(UpdateSongInput, Option<String>), ValidationError> {
        let input = UpdateSongInput {
            song: self.song.as_deref().map(|s| Name::new("song", s)).transpose()?,
            group: self.group.as_deref().map(|g| Name::new("group", g)).transpose()?,
            link: self.link,
            release_date: self.release_date,
        };
        Ok((input, self.text))
    }
}

/// Replace lyrics request
#[derive(Deserialize)]
pub struct ReplaceTextRequest {
    pub text: String,
}

/// GET /songs - search with filters, sorting and pagination
async fn search_songs(
    State(state): State<Arc<AppState>>,
    Query(pairs): QueryPairs,
) -> Result<Json<Vec<Song>>, ApiError> {
    let query = parse_search(&pairs);
    let songs = state.catalog().search(&query).await?;
    Ok(Json(songs))
}

/// POST /songs - look up song details and add the song
async fn insert_song(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InsertSongRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Song>), ApiError> {
    let Json(req) = payload?;
    let input = req.validate()?;

    let song = state.catalog().insert(input).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// GET /songs/{id}
async fn get_song(
    State(state): State<Arc<AppState>>,
    ValidSongId(id): ValidSongId,
) -> Result<Json<Song>, ApiError> {
    let song = state.catalog().get(id).await?;
    Ok(Json(song))
}

/// GET /songs/{id}/text - one page of couplets
async fn get_song_text(
    State(state): State<Arc<AppState>>,
    ValidSongId(id): ValidSongId,
    Query(pairs): QueryPairs,
) -> Result<Json<SongText>, ApiError> {
    let text = state.catalog().get_text(id, parse_page(&pairs)).await?;
    Ok(Json(text))
}

/// PATCH /songs/{id} - update metadata and/or lyrics
async fn patch_song(
    State(state): State<Arc<AppState>>,
    ValidSongId(id): ValidSongId,
    payload: Result<Json<PatchSongRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    let (input, text) = req.validate()?;

    state.catalog().patch(id, input, text).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /songs/{id}/text - replace lyrics
async fn replace_song_text(
    State(state): State<Arc<AppState>>,
    ValidSongId(id): ValidSongId,
    payload: Result<Json<ReplaceTextRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    state.catalog().update_text(id, &req.text).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /songs/{id}
async fn delete_song(
    State(state): State<Arc<AppState>>,
    ValidSongId(id): ValidSongId,
) -> Result<StatusCode, ApiError> {
    state.catalog().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Song routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/songs", get(search_songs).post(insert_song))
        .route(
            "/songs/{id}",
            get(get_song).patch(patch_song).delete(delete_song),
        )
        .route("/songs/{id}/text", put(replace_song_text).get(get_song_text))
}
