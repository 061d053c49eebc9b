//! Longest common prefix extension for a partial word.

use core_text::escape::{escape_spaces, unescape_spaces};
use core_text::remove_formatting;

/// Extend `word` to the longest prefix shared by `candidates`.
///
/// Candidates whose formatting-stripped text starts with `word` exactly
/// come first, then those matching only case-insensitively; the rest are
/// ignored. The common prefix is measured case-insensitively against the
/// first candidate and spelled the way that candidate spells it, with
/// spaces re-escaped. Returns `word` unchanged when nothing matches.
pub fn complete_line(word: &str, candidates: &[String]) -> String {
    let plain_word = unescape_spaces(word);
    let lower_word = plain_word.to_lowercase();

    let mut exact = Vec::new();
    let mut folded = Vec::new();
    for cand in candidates {
        let text = unescape_spaces(&remove_formatting(cand));
        if text.starts_with(&plain_word) {
            exact.push(text);
        } else if text.to_lowercase().starts_with(&lower_word) {
            folded.push(text);
        }
    }
    exact.extend(folded);

    let Some((first, rest)) = exact.split_first() else {
        return word.to_string();
    };
    let first: Vec<char> = first.chars().collect();
    let mut common = first.len();
    for other in rest {
        let shared = first
            .iter()
            .zip(other.chars())
            .take_while(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
            .count();
        common = common.min(shared);
    }
    let prefix: String = first[..common].iter().collect();
    escape_spaces(&prefix)
}
