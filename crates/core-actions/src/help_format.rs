//! Colour markup for command usage text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static HELP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<green><torrent-id>|<torrent-file>|<torrent>|<command>|--[_\-a-zA-Z0-9]+)",
        r"|(?P<yellow><state>|<download-folder>|\.\.\.)",
        r"|(?P<cyan><key>|<value>|[_A-Z]{3,})",
        r"|(?P<white><tab>)",
        r"|(?P<blue>\s\*\s)",
        r"|(?P<red>-[a-zA-Z0-9])",
        r"|(?P<info>\[|\]|usage:)",
    ))
    .expect("static regex")
});

const GROUPS: [&str; 7] = ["green", "yellow", "cyan", "white", "blue", "red", "info"];

/// Decorate usage text: placeholders, flags, brackets and upper-case
/// metavariables get a colour, each followed by `{!input!}`.
///
/// A short flag only counts when it does not continue a word or a long
/// flag, so `non-zero` stays plain.
pub fn colorize_help(text: &str) -> String {
    HELP_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let Some(group) = GROUPS.iter().find(|g| caps.name(g).is_some()) else {
                return whole.to_string();
            };
            if *group == "red" {
                let start = caps.get(0).map_or(0, |m| m.start());
                let prev = text[..start].chars().next_back();
                if prev.is_some_and(|c| c == '-' || c.is_ascii_lowercase()) {
                    return whole.to_string();
                }
            }
            format!("{{!{group}!}}{whole}{{!input!}}")
        })
        .into_owned()
}
