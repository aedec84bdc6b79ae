//! Song service layer

pub mod error;
pub mod songs;

#[cfg(test)]
pub(crate) mod fakes;

pub use error::{ErrorKind, SongError};
pub use songs::{
    InsertSongInput, PgSongService, SongCatalog, SongService, SongText, UpdateSongInput,
};
