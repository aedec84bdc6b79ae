//! Domain models with validation at construction
//!
//! Request input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod name;
pub mod song;
pub mod lyrics;
pub mod pagination;
pub mod search;

pub use validation::ValidationError;
pub use name::Name;
pub use song::{Couplet, NewSong, Song, SongId, SongUpdate};
pub use lyrics::{couplets_from_text, join_couplets, split_couplets, COUPLET_DELIMITER};
pub use pagination::{Page, DEFAULT_LIMIT, MAX_LIMIT};
pub use search::{column_for, Column, SearchQuery, SortCriterion, SortDirection, COLUMN_WHITELIST};
