//! Editable line state: the input buffer with its cursor, and the committed
//! input history the editor browses with Up/Down.

mod history;

pub use history::{INPUT_HISTORY_SIZE, InputHistory};

use core_text::word;

/// The uncommitted input line.
///
/// Stored as code points so the cursor is a character index, never a byte
/// offset. Invariant: `cursor <= len()` after every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `text` with the cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Text before the cursor.
    pub fn head(&self) -> String {
        self.chars[..self.cursor].iter().collect()
    }

    /// Text from the cursor to the end.
    pub fn tail(&self) -> String {
        self.chars[self.cursor..].iter().collect()
    }

    pub fn char_at_cursor(&self) -> Option<char> {
        self.chars.get(self.cursor).copied()
    }

    /// Replace the whole content; the cursor moves to the end.
    pub fn set(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    /// Replace the whole content and place the cursor at `cursor` (clamped).
    pub fn set_with_cursor(&mut self, text: &str, cursor: usize) {
        self.chars = text.chars().collect();
        self.cursor = cursor.min(self.chars.len());
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    /// Remove the char before the cursor. No-op at the start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Remove the char under the cursor. No-op at the end.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub fn delete_word_back(&mut self) {
        self.cursor = word::delete_alt_backspace(&mut self.chars, self.cursor);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Remove a trailing unescaped backslash (an odd-length run of `\` at the
    /// end of the line). Returns whether one was removed.
    pub fn strip_line_continuation(&mut self) -> bool {
        let run = self.chars.iter().rev().take_while(|c| **c == '\\').count();
        if run % 2 == 1 {
            self.chars.pop();
            self.cursor = self.cursor.min(self.chars.len());
            return true;
        }
        false
    }
}
