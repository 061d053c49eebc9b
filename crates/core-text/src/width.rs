//! Display width measurement and column fitting.
//!
//! Width model: every `char` occupies one terminal column except East Asian
//! Wide / Fullwidth code points which occupy two. Zero-width and control
//! characters are counted as one column; the console never emits them
//! deliberately and over-estimating keeps the cursor from drifting left.
//!
//! Functions taking markup (`display_width`) strip colour tags first and fail
//! on unbalanced markup. The fitting helpers (`pad`, `trim`, `format_column`)
//! operate on plain cell text.

use unicode_normalization::UnicodeNormalization;
use unicode_width::UnicodeWidthChar;

use crate::markup::{self, MarkupError};

/// Column width of a single code point (1 or 2).
#[inline]
pub fn char_width(c: char) -> usize {
    match UnicodeWidthChar::width(c) {
        Some(2) => 2,
        _ => 1,
    }
}

#[inline]
pub fn is_wide(c: char) -> bool {
    char_width(c) == 2
}

/// Width of plain text (no markup interpretation).
pub fn str_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Width of `text` once colour markup is removed.
pub fn display_width(text: &str) -> Result<usize, MarkupError> {
    Ok(str_width(&markup::strip(text)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Left,
    #[default]
    Right,
}

/// Pad `text` on `side` with `fill` until it is `width` columns wide.
/// Text already at least `width` wide is returned unchanged.
pub fn pad(text: &str, width: usize, fill: char, side: Side) -> String {
    let have = str_width(&markup::remove_formatting(text));
    let diff = width.saturating_sub(have);
    if diff == 0 {
        return text.to_string();
    }
    let filler: String = std::iter::repeat_n(fill, diff).collect();
    match side {
        Side::Left => filler + text,
        Side::Right => format!("{text}{filler}"),
    }
}

/// Cut `text` so the result is at most `width` columns, always ending in a
/// single space column.
///
/// When `has_wide` is set the cut is computed per character and a wide char
/// that would straddle the last column is replaced by `.` so the result
/// keeps its exact width. Without wide chars the fast path keeps the first
/// `width - 1` characters.
pub fn trim(text: &str, width: usize, has_wide: bool) -> String {
    match width {
        0 => String::new(),
        1 => " ".to_string(),
        _ if !has_wide => {
            let mut out: String = text.chars().take(width - 1).collect();
            out.push(' ');
            out
        }
        _ => {
            let budget = width - 1;
            let mut used = 0;
            let mut out = String::with_capacity(text.len().min(width * 4));
            for c in text.chars() {
                let w = char_width(c);
                if used + w > budget {
                    if used < budget {
                        out.push('.');
                    }
                    break;
                }
                out.push(c);
                used += w;
            }
            out.push(' ');
            out
        }
    }
}

/// Fit a table cell into exactly `width` columns: NFC-normalise, then pad
/// when it fits with room to spare or [`trim`] otherwise.
pub fn format_column(text: &str, width: usize) -> String {
    let col: String = text.nfc().collect();
    let size = str_width(&col);
    let has_wide = col.chars().any(is_wide);
    if size + 1 >= width {
        trim(&col, width, has_wide)
    } else {
        pad(&col, width, ' ', Side::Right)
    }
}

/// Concatenate cells formatted with [`format_column`]. Extra cells without
/// a width are ignored.
pub fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format_column(cell.as_ref(), *w))
        .collect()
}

/// Shorten a long identifier by removing characters from its middle,
/// leaving `placeholder` in the gap, so it fits in `space_left` columns.
///
/// When `space_left < min_width` the identifier is not shortened; it is
/// prefixed with `space_left` spaces instead so it starts on the next line
/// of a wrapped cell. An identifier that already fits is returned trimmed
/// of surrounding whitespace and otherwise unchanged.
pub fn shorten_middle(text: &str, space_left: usize, min_width: usize, placeholder: &str) -> String {
    let tid: Vec<char> = text.trim().chars().collect();
    let len = tid.len();
    if space_left < min_width {
        let mut out: String = std::iter::repeat_n(' ', space_left).collect();
        out.extend(tid.iter());
        return out;
    }
    if len <= space_left {
        return tid.into_iter().collect();
    }
    let ph = placeholder.chars().count();
    let excess = (len + ph).saturating_sub(space_left);
    let (cut, remain) = (excess / 2, excess % 2);
    let mid = len / 2;
    let head_end = mid.saturating_sub(cut);
    let tail_start = (mid + cut + remain).min(len);
    let mut out: String = tid[..head_end].iter().collect();
    out.push_str(placeholder);
    out.extend(tid[tail_start..].iter());
    out
}

/// Byte index splitting `text` after at most `cols` display columns. Always
/// advances at least one char for non-empty input so callers make progress
/// even when a wide char cannot fit.
pub fn split_at_width(text: &str, cols: usize) -> usize {
    let mut used = 0;
    for (idx, c) in text.char_indices() {
        let w = char_width(c);
        if used + w > cols {
            return if idx == 0 { c.len_utf8() } else { idx };
        }
        used += w;
    }
    text.len()
}
