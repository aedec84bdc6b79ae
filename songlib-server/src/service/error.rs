//! Song service errors
//!
//! Messages are safe to show to API clients; the underlying store or
//! song-info failure is kept as the error source for logging.

use crate::db::DbError;
use crate::models::SongId;
use crate::webapi::SongInfoError;

/// Coarse classification of a [`SongError`], used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Validation,
    ExternalSource,
    Persistence,
}

#[derive(Debug, thiserror::Error)]
pub enum SongError {
    #[error("cannot get song info from external sources")]
    CannotGetSongInfo(#[source] SongInfoError),

    #[error("cannot insert song")]
    CannotInsertSong(#[source] DbError),

    #[error("song already exists")]
    AlreadyExists(#[source] DbError),

    #[error("cannot insert couplets")]
    CannotInsertCouplets(#[source] DbError),

    #[error("song not found")]
    NotFound { id: SongId },

    #[error("cannot get song")]
    CannotGetSong(#[source] DbError),

    #[error("cannot get text")]
    CannotGetText(#[source] DbError),

    #[error("fields are empty")]
    FieldsMissing,

    #[error("cannot update song")]
    InvalidReleaseDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("cannot update song")]
    CannotUpdateSong(#[source] DbError),

    #[error("cannot update couplets")]
    CannotUpdateCouplets(#[source] DbError),

    #[error("cannot delete song")]
    CannotDeleteSong(#[source] DbError),
}

impl SongError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::FieldsMissing | Self::InvalidReleaseDate { .. } => ErrorKind::Validation,
            Self::CannotGetSongInfo(_) => ErrorKind::ExternalSource,
            Self::CannotInsertSong(_)
            | Self::CannotInsertCouplets(_)
            | Self::CannotGetSong(_)
            | Self::CannotGetText(_)
            | Self::CannotUpdateSong(_)
            | Self::CannotUpdateCouplets(_)
            | Self::CannotDeleteSong(_) => ErrorKind::Persistence,
        }
    }
}
