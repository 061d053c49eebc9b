use core_text::remove_formatting;

/// Plain-text prefix of a committed-input echo line in the transcript.
pub const INPUT_MARKER: &str = ">>> ";

/// Recover committed input lines from a persisted transcript.
///
/// A line counts as input when its formatting-stripped text starts with
/// [`INPUT_MARKER`]. Consecutive identical inputs are collapsed only when
/// `ignore_duplicates` is set. At most the newest `cap` entries are kept.
pub fn extract_input_history(lines: &[String], ignore_duplicates: bool, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in lines {
        let plain = remove_formatting(line);
        let Some(input) = plain.strip_prefix(INPUT_MARKER) else {
            continue;
        };
        if ignore_duplicates && out.last().is_some_and(|l| l == input) {
            continue;
        }
        out.push(input.to_string());
    }
    if out.len() > cap {
        out.drain(..out.len() - cap);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_echo_lines_only() {
        let transcript = lines(&[
            "{!yellow,black,bold!}>>>{!input!} info",
            "{!info!}some output",
            "{!yellow,black,bold!}>>>{!input!} help quit",
        ]);
        assert_eq!(extract_input_history(&transcript, false, 10), ["info", "help quit"]);
    }

    #[test]
    fn duplicate_policy() {
        let transcript = lines(&[">>> a", ">>> a", ">>> b", ">>> a"]);
        assert_eq!(extract_input_history(&transcript, true, 10), ["a", "b", "a"]);
        assert_eq!(extract_input_history(&transcript, false, 10), ["a", "a", "b", "a"]);
    }

    #[test]
    fn cap_keeps_newest() {
        let transcript = lines(&[">>> 1", ">>> 2", ">>> 3"]);
        assert_eq!(extract_input_history(&transcript, false, 2), ["2", "3"]);
    }
}
