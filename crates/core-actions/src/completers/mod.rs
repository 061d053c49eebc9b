//! Argument completers shared by built-in commands.

mod path;
mod torrent;

pub use path::{PathCompleteOptions, complete_path};
pub use torrent::{TorrentEntry, TorrentList, complete_torrent};

/// Split `s` after `n` chars (clamped).
fn split_chars(s: &str, n: usize) -> (&str, &str) {
    let idx = s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    s.split_at(idx)
}
