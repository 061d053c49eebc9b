use std::collections::VecDeque;

use tracing::trace;

/// Default cap on committed input lines kept for Up/Down browsing.
pub const INPUT_HISTORY_SIZE: usize = 500;

/// Committed input lines plus a browsing cursor.
///
/// `index == len()` means "editing live, not browsing". The line being typed
/// when browsing starts is kept as the incomplete snapshot and restored when
/// browsing returns past the newest entry. Browsing never mutates the
/// entries themselves.
#[derive(Debug, Clone)]
pub struct InputHistory {
    entries: VecDeque<String>,
    index: usize,
    incomplete: String,
    cap: usize,
    ignore_duplicates: bool,
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new(INPUT_HISTORY_SIZE, false)
    }
}

impl InputHistory {
    pub fn new(cap: usize, ignore_duplicates: bool) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            incomplete: String::new(),
            cap: cap.max(1),
            ignore_duplicates,
        }
    }

    /// Seed from recovered entries (oldest first), keeping the newest `cap`.
    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        let skip = entries.len().saturating_sub(self.cap);
        self.entries = entries.into_iter().skip(skip).collect();
        self.index = self.entries.len();
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Oldest first.
    pub fn entries(&self) -> &VecDeque<String> {
        &self.entries
    }

    pub fn is_browsing(&self) -> bool {
        self.index < self.entries.len()
    }

    /// Record a committed line and return to live editing. With
    /// duplicate skipping on, a line equal to the newest entry is not stored.
    pub fn push(&mut self, line: &str) {
        let duplicate = self.entries.back().is_some_and(|l| l == line);
        if !(self.ignore_duplicates && duplicate) {
            if self.entries.len() == self.cap {
                self.entries.pop_front();
            }
            self.entries.push_back(line.to_string());
        }
        self.index = self.entries.len();
        self.incomplete.clear();
        trace!(target: "editor.input", history_len = self.entries.len(), duplicate, "history_push");
    }

    /// Step back. `current` is the live buffer, snapshotted only when
    /// leaving live editing. Returns the entry to show.
    pub fn prev(&mut self, current: &str) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        if self.index == self.entries.len() {
            self.incomplete = current.to_string();
        }
        self.index -= 1;
        self.entries.get(self.index).map(String::as_str)
    }

    /// Step forward; past the newest entry the incomplete snapshot comes back.
    pub fn next(&mut self) -> Option<&str> {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
            return self.entries.get(self.index).map(String::as_str);
        }
        if self.index + 1 == self.entries.len() {
            self.index += 1;
            return Some(&self.incomplete);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_then_down_restores_incomplete() {
        let mut h = InputHistory::default();
        h.push("first");
        h.push("second");
        assert_eq!(h.prev("typing"), Some("second"));
        assert_eq!(h.prev("ignored"), Some("first"));
        assert_eq!(h.prev("ignored"), None);
        assert_eq!(h.next(), Some("second"));
        assert_eq!(h.next(), Some("typing"));
        assert_eq!(h.next(), None);
        assert!(!h.is_browsing());
    }

    #[test]
    fn snapshot_captured_once_per_excursion() {
        let mut h = InputHistory::default();
        h.push("a");
        h.push("b");
        h.prev("live");
        // buffer now shows "b"; pressing Up again must not overwrite "live"
        h.prev("b");
        h.next();
        assert_eq!(h.next(), Some("live"));
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut h = InputHistory::new(2, false);
        h.push("a");
        h.push("b");
        h.push("c");
        assert_eq!(*h.entries(), ["b", "c"]);
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn long_session_keeps_newest_window() {
        let mut h = InputHistory::new(3, false);
        for i in 0..1000 {
            h.push(&format!("line {i}"));
        }
        assert_eq!(*h.entries(), ["line 997", "line 998", "line 999"]);
        assert_eq!(h.prev(""), Some("line 999"));
        assert_eq!(h.prev(""), Some("line 998"));
        assert_eq!(h.prev(""), Some("line 997"));
        assert_eq!(h.prev(""), None);
    }

    #[test]
    fn duplicates_skipped_only_when_enabled() {
        let mut h = InputHistory::new(10, true);
        h.push("x");
        h.push("x");
        assert_eq!(h.len(), 1);
        let mut h = InputHistory::new(10, false);
        h.push("x");
        h.push("x");
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn skipped_duplicate_does_not_evict() {
        let mut h = InputHistory::new(2, true);
        h.push("a");
        h.push("b");
        h.push("b");
        assert_eq!(*h.entries(), ["a", "b"]);
    }

    #[test]
    fn seeded_entries_keep_newest() {
        let h = InputHistory::new(2, false).with_entries(vec!["1".into(), "2".into(), "3".into()]);
        assert_eq!(*h.entries(), ["2", "3"]);
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn empty_history_browsing_is_inert() {
        let mut h = InputHistory::default();
        assert_eq!(h.prev("x"), None);
        assert_eq!(h.next(), None);
        assert_eq!(h.index(), 0);
    }
}
