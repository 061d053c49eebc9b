//! Alt+Backspace word deletion.

/// Characters that end a word for [`delete_alt_backspace`].
pub const SEP_CHARS: &[char] = &[
    ' ', '*', '?', '!', '.', '_', '~', '-', '#', '$', '^', ';', '\'', '"', '/',
];

/// Delete leftward from `cursor` in `buf`, returning the new cursor.
///
/// Deletion stops before the first separator reached after at least one
/// char was removed. Spaces are the exception: a space is consumed while
/// nothing but spaces has been removed so far, or while the char before it
/// is also a space. Deleting `"world"` from `"hello world"` therefore stops
/// at the space, and a second call deletes `"hello "` in one go.
pub fn delete_alt_backspace(buf: &mut Vec<char>, cursor: usize) -> usize {
    delete_alt_backspace_with(buf, cursor, SEP_CHARS)
}

pub fn delete_alt_backspace_with(buf: &mut Vec<char>, cursor: usize, seps: &[char]) -> usize {
    let cursor = cursor.min(buf.len());
    let mut pos = cursor;
    let mut non_space_deleted = false;

    while pos > 0 {
        let c = buf[pos - 1];
        if pos < cursor && seps.contains(&c) {
            if c != ' ' {
                break;
            }
            let prev_is_space = pos >= 2 && buf[pos - 2] == ' ';
            if non_space_deleted && !prev_is_space {
                break;
            }
        }
        if !non_space_deleted {
            non_space_deleted = c != ' ';
        }
        pos -= 1;
    }

    buf.drain(pos..cursor);
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, cursor: usize) -> (String, usize) {
        let mut buf: Vec<char> = text.chars().collect();
        let c = delete_alt_backspace(&mut buf, cursor);
        (buf.into_iter().collect(), c)
    }

    #[test]
    fn deletes_last_word_then_rest() {
        assert_eq!(run("hello world", 11), ("hello ".to_string(), 6));
        assert_eq!(run("hello ", 6), (String::new(), 0));
    }

    #[test]
    fn stops_at_punctuation() {
        assert_eq!(run("/tmp/some-file", 14), ("/tmp/some-".to_string(), 10));
        // a lone separator at the cursor is deleted, then the word before it
        assert_eq!(run("/tmp/", 5), ("/".to_string(), 1));
    }

    #[test]
    fn preserves_text_after_cursor() {
        assert_eq!(run("abc def ghi", 7), ("abc  ghi".to_string(), 4));
    }

    #[test]
    fn noop_at_start() {
        assert_eq!(run("abc", 0), ("abc".to_string(), 0));
        assert_eq!(run("", 0), (String::new(), 0));
    }

    #[test]
    fn run_of_spaces_inside_word_boundary() {
        // the inner space of a double space is consumed, the last one is kept
        assert_eq!(run("a  b", 4), ("a ".to_string(), 2));
    }
}
