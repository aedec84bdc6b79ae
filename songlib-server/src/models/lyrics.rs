//! Splitting lyric text into numbered couplets

use super::{Couplet, SongId};

/// Separator between couplets in full lyric text
pub const COUPLET_DELIMITER: &str = "\n\n";

/// Split lyric text into couplet texts, in order.
///
/// Always yields at least one piece; empty text is a single empty couplet.
pub fn split_couplets(text: &str) -> Vec<&str> {
    text.split(COUPLET_DELIMITER).collect()
}

/// Join couplet texts back into full lyric text.
pub fn join_couplets<S: AsRef<str>>(couplets: &[S]) -> String {
    couplets
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(COUPLET_DELIMITER)
}

/// Build couplet rows for a song, numbered 1..=N in split order.
pub fn couplets_from_text(song_id: SongId, text: &str) -> Vec<Couplet> {
    split_couplets(text)
        .into_iter()
        .zip(1..)
        .map(|(piece, sequence_number)| Couplet {
            song_id,
            sequence_number,
            text: piece.to_owned(),
        })
        .collect()
}
