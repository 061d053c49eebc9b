//! Transcript: the scrollback of rendered markup lines above the input line.
//!
//! Invariants:
//! * At most `cap` lines are held; the oldest are dropped first.
//! * Every stored line measures below the terminal width it was written
//!   for (`columns - 1`), except lines that were already short enough.
//! * `offset` counts lines scrolled back from the bottom and is clamped so
//!   the view never runs past the oldest line.
//!
//! Lines with malformed markup are logged and skipped, never stored. Each
//! accepted logical line is handed to the [`HistoryStore`] when one is
//! attached, so the next session can replay it.

use std::collections::VecDeque;

use core_history::HistoryStore;
use core_text::markup;
use core_text::width::{split_at_width, str_width};
use core_text::display_width;
use tracing::{error, trace};

pub const LINES_BUFFER_SIZE: usize = 5000;

#[derive(Debug)]
pub struct Transcript {
    lines: VecDeque<String>,
    cap: usize,
    offset: usize,
    store: Option<HistoryStore>,
    batch: bool,
    redraw: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::with_cap(LINES_BUFFER_SIZE)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            cap: cap.max(1),
            offset: 0,
            store: None,
            batch: false,
            redraw: false,
        }
    }

    /// Persist accepted lines through `store`.
    pub fn with_store(mut self, store: HistoryStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn store(&self) -> Option<&HistoryStore> {
        self.store.as_ref()
    }

    /// Replace the content with previously persisted lines. Nothing is
    /// written back to the store.
    pub fn seed(&mut self, lines: Vec<String>) {
        self.lines = lines.into();
        self.enforce_cap();
        self.offset = 0;
        self.redraw = true;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Append `text` (may hold several `\n` separated lines) for a terminal
    /// `columns` wide. Returns the number of stored lines added.
    pub fn write(&mut self, text: &str, columns: usize) -> usize {
        let limit = columns.saturating_sub(1).max(1);
        let mut added = 0;
        for line in text.lines() {
            let width = match display_width(line) {
                Ok(w) => w,
                Err(e) => {
                    error!(target: "render.transcript", line, error = %e, "bad_colour_string");
                    continue;
                }
            };
            if let Some(store) = self.store.as_mut() {
                store.append(line);
            }
            if width >= limit {
                let pieces = split_line(line, limit);
                added += pieces.len();
                self.lines.extend(pieces);
            } else {
                self.lines.push_back(line.to_string());
                added += 1;
            }
        }
        self.enforce_cap();
        trace!(target: "render.transcript", added, total = self.lines.len(), "lines_written");
        if !self.batch {
            self.redraw = true;
        }
        added
    }

    /// While on, writes do not request a redraw. Turning it off does.
    pub fn set_batch(&mut self, on: bool) {
        self.batch = on;
        if !on {
            self.redraw = true;
        }
    }

    /// Whether a redraw was requested since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn page_up(&mut self, rows: usize) {
        let max = self.lines.len().saturating_sub(rows);
        self.offset = (self.offset + rows).min(max);
        self.redraw = true;
    }

    pub fn page_down(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
        self.redraw = true;
    }

    /// Exactly `rows` lines ending `offset` lines above the newest, padded
    /// at the top with empty lines.
    pub fn visible(&self, rows: usize) -> Vec<&str> {
        let end = self.lines.len().saturating_sub(self.offset);
        let start = end.saturating_sub(rows);
        let mut out: Vec<&str> = std::iter::repeat_n("", rows - (end - start)).collect();
        out.extend(self.lines.range(start..end).map(String::as_str));
        out
    }

    fn enforce_cap(&mut self) {
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
        self.offset = self.offset.min(self.lines.len());
    }
}

/// `(tag, text)` chunks of a markup line; text before the first tag has an
/// empty tag.
fn chunks(line: &str) -> Vec<(&str, &str)> {
    let tags: Vec<(usize, &str)> = markup::tags(line).collect();
    let mut out = Vec::with_capacity(tags.len() + 1);
    let first = tags.first().map_or(line.len(), |(at, _)| *at);
    if first > 0 {
        out.push(("", &line[..first]));
    }
    for (i, (at, tag)) in tags.iter().enumerate() {
        let start = at + tag.len();
        let end = tags.get(i + 1).map_or(line.len(), |(next, _)| *next);
        out.push((*tag, &line[start..end]));
    }
    out
}

/// Split a wide markup line into pieces of at most `limit` columns, each
/// continuation starting with the colour tag of the chunk it resumes.
fn split_line(line: &str, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut used = 0;
    for (tag, text) in chunks(line) {
        cur.push_str(tag);
        let mut rest = text;
        while used + str_width(rest) > limit {
            let room = limit - used;
            let cut = if room == 0 { 0 } else { split_at_width(rest, room) };
            let (head, tail) = rest.split_at(cut);
            // a wide char that cannot fit moves to the next piece unless the piece is empty
            let (head, tail) = if used > 0 && str_width(head) > room { ("", rest) } else { (head, tail) };
            cur.push_str(head);
            out.push(std::mem::take(&mut cur));
            cur.push_str(tag);
            used = 0;
            rest = tail;
        }
        cur.push_str(rest);
        used += str_width(rest);
    }
    if !markup::remove_formatting(&cur).is_empty() {
        out.push(cur);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_lines_stored_as_is() {
        let mut t = Transcript::new();
        assert_eq!(t.write("{!info!}one\ntwo", 80), 2);
        assert_eq!(t.lines().collect::<Vec<_>>(), vec!["{!info!}one", "two"]);
    }

    #[test]
    fn long_line_split_reemits_colour() {
        let mut t = Transcript::new();
        t.write("{!red!}abcdefgh{!info!}ij", 6);
        assert_eq!(
            t.lines().collect::<Vec<_>>(),
            vec!["{!red!}abcde", "{!red!}fgh{!info!}ij"]
        );
    }

    #[test]
    fn split_never_cuts_wide_chars() {
        let pieces = split_line("日本語日本", 5);
        assert_eq!(pieces, vec!["日本", "語日", "本"]);
        assert!(pieces.iter().all(|p| str_width(p) <= 5));
    }

    #[test]
    fn bad_markup_is_skipped() {
        let mut t = Transcript::new();
        assert_eq!(t.write("{!info oops\nfine", 80), 1);
        assert_eq!(t.lines().collect::<Vec<_>>(), vec!["fine"]);
    }

    #[test]
    fn cap_drops_oldest() {
        let mut t = Transcript::with_cap(3);
        t.write("1\n2\n3\n4", 80);
        assert_eq!(t.lines().collect::<Vec<_>>(), vec!["2", "3", "4"]);
    }

    #[test]
    fn visible_pads_and_scrolls() {
        let mut t = Transcript::new();
        t.write("a\nb\nc\nd\ne", 80);
        assert_eq!(t.visible(7), vec!["", "", "a", "b", "c", "d", "e"]);
        assert_eq!(t.visible(2), vec!["d", "e"]);
        t.page_up(2);
        assert_eq!(t.visible(2), vec!["b", "c"]);
        t.page_up(2);
        t.page_up(2);
        assert_eq!(t.offset(), 3);
        assert_eq!(t.visible(2), vec!["a", "b"]);
        t.page_down(10);
        assert_eq!(t.visible(2), vec!["d", "e"]);
    }

    #[test]
    fn batch_mode_defers_redraw() {
        let mut t = Transcript::new();
        t.set_batch(true);
        t.take_redraw();
        t.write("x", 80);
        assert!(!t.take_redraw());
        t.set_batch(false);
        assert!(t.take_redraw());
    }

    #[test]
    fn accepted_lines_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let paths = core_config::history_paths(dir.path());
        let mut t = Transcript::new().with_store(HistoryStore::new(paths.clone()));
        t.write("kept\n{!bad", 80);
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "kept\n");
        assert_eq!(t.store().map(HistoryStore::counts), Some([1, 0]));
    }
}
