//! Horizontal windowing of the input line.

use core_text::width::char_width;

/// Visible part of the input line and where the cursor sits in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputWindow {
    pub text: String,
    /// Display column of the cursor inside `text`.
    pub cursor_col: usize,
}

impl InputWindow {
    /// Window over `chars` for a line `cols` wide keeping the char at
    /// `cursor` on screen. The last column is reserved for the cursor
    /// when it sits past the end.
    pub fn compute(chars: &[char], cursor: usize, cols: usize) -> Self {
        let cursor = cursor.min(chars.len());
        let cols = cols.max(2);
        let cursor_w = chars.get(cursor).map_or(1, |c| char_width(*c));

        // leftmost start such that [start, cursor] fits
        let mut start = cursor;
        let mut used = cursor_w;
        while start > 0 {
            let w = char_width(chars[start - 1]);
            if used + w > cols {
                break;
            }
            used += w;
            start -= 1;
        }

        let cursor_col: usize = chars[start..cursor].iter().map(|c| char_width(*c)).sum();
        let mut width = 0;
        let text: String = chars[start..]
            .iter()
            .take_while(|c| {
                width += char_width(**c);
                width <= cols
            })
            .collect();
        Self { text, cursor_col }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn short_line_is_whole() {
        let w = InputWindow::compute(&chars("info"), 4, 80);
        assert_eq!(w, InputWindow { text: "info".into(), cursor_col: 4 });
    }

    #[test]
    fn long_line_scrolls_to_cursor() {
        let w = InputWindow::compute(&chars("abcdefghij"), 10, 5);
        assert_eq!(w.text, "ghij");
        assert_eq!(w.cursor_col, 4);
    }

    #[test]
    fn wide_chars_count_two_columns() {
        let w = InputWindow::compute(&chars("日本語"), 3, 5);
        assert_eq!(w.text, "本語");
        assert_eq!(w.cursor_col, 4);
    }

    proptest! {
        #[test]
        fn cursor_always_on_screen(s in "[a-z日本 ]{0,40}", cursor in 0usize..45, cols in 2usize..30) {
            let cs = chars(&s);
            let w = InputWindow::compute(&cs, cursor, cols);
            prop_assert!(w.cursor_col < cols);
            prop_assert!(core_text::str_width(&w.text) <= cols);
        }
    }
}
