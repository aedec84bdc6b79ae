//! Song and couplet records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Store-assigned song identifier
pub type SongId = i32;

/// Song record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    #[sqlx(rename = "song_name")]
    #[serde(rename = "song")]
    pub name: String,
    #[sqlx(rename = "group_name")]
    pub group: String,
    pub link: String,
    #[serde(rename = "releaseDate")]
    pub release_date: NaiveDate,
}

/// Song row before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub name: String,
    pub group: String,
    pub link: String,
    pub release_date: NaiveDate,
}

impl NewSong {
    /// Attach the store-assigned id.
    pub fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            name: self.name,
            group: self.group,
            link: self.link,
            release_date: self.release_date,
        }
    }
}

/// Partial song update; `None` columns are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongUpdate {
    pub name: Option<String>,
    pub group: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<NaiveDate>,
}

impl SongUpdate {
    /// True when no column would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.group.is_none()
            && self.link.is_none()
            && self.release_date.is_none()
    }
}

/// One stanza of a song's lyrics
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Couplet {
    pub song_id: SongId,
    pub sequence_number: i32,
    #[sqlx(rename = "couplet_text")]
    pub text: String,
}
