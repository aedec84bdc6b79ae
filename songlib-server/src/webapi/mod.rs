//! Clients for external web APIs

pub mod song_info;

pub use song_info::{SongInfo, SongInfoClient, SongInfoError, SongInfoSource};
