//! Escaped-space handling for command lines.
//!
//! A backslash followed by a space (`\ `) is one logical space that does not
//! separate words.

/// Split on spaces not preceded by a backslash. Separators are not
/// collapsed: `"a  b"` yields `["a", "", "b"]`.
pub fn split_unescaped(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (idx, c) in line.char_indices() {
        if c == ' ' && prev != Some('\\') {
            out.push(&line[start..idx]);
            start = idx + 1;
        }
        prev = Some(c);
    }
    out.push(&line[start..]);
    out
}

/// Byte offset just past the last unescaped space, or 0.
pub fn last_word_start(line: &str) -> usize {
    let mut start = 0;
    let mut prev = None;
    for (idx, c) in line.char_indices() {
        if c == ' ' && prev != Some('\\') {
            start = idx + 1;
        }
        prev = Some(c);
    }
    start
}

pub fn escape_spaces(text: &str) -> String {
    text.replace(' ', "\\ ")
}

pub fn unescape_spaces(text: &str) -> String {
    text.replace("\\ ", " ")
}
