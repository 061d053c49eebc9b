//! Tab completion over a command line.
//!
//! The engine is a pure function of `(line, cursor, tab_streak)` and the
//! candidate universe offered by a [`CompletionSource`]:
//! * no space before the cursor -> complete a command name;
//! * otherwise -> ask the command named by the first word to complete the
//!   word under the cursor. Unknown commands complete to nothing.
//!
//! One candidate is spliced in directly. Several candidates extend the word
//! to their common prefix on the first Tab of a streak and are listed as
//! side output on later Tabs, one page at a time. Two listing policies are
//! supported, selected by [`CompletionSettings::third_tab_lists_all`]:
//! * paged: every further Tab shows the next page with a `(page/pages)`
//!   footer until the last page;
//! * lists all: the second Tab shows the first page, the third shows all
//!   remaining matches at once.
//!
//! A listing that reaches the end asks the caller to reset the tab streak.

use std::sync::Arc;

use core_config::CmdlineConfig;
use core_text::escape::{last_word_start, split_unescaped};
use core_text::remove_formatting;
use tracing::debug;

use crate::i18n::{IdentityTranslator, Translator, fill};

mod prefix;

pub use prefix::complete_line;

pub const MATCHES_HEADER: &str = "{!green!}Autocompletion matches:";
pub const MORE_ALL_FOOTER: &str = "{!error!}And {count} more. Press <tab> to list them";
pub const MORE_PAGED_FOOTER: &str = "{!error!}And {count} more ({page}/{pages}). Press <tab> to view more";
pub const FINISHED_FOOTER: &str = "{!green!}Finished listing {count} matches ({page}/{pages})";

/// Candidate universe for completion.
pub trait CompletionSource {
    fn has_command(&self, name: &str) -> bool;
    /// Command names and aliases.
    fn command_names(&self) -> Vec<String>;
    /// Argument candidates for `command` given the partial word.
    fn complete(&self, command: &str, partial: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSettings {
    pub page_size: usize,
    pub third_tab_lists_all: bool,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            page_size: 15,
            third_tab_lists_all: false,
        }
    }
}

impl From<&CmdlineConfig> for CompletionSettings {
    fn from(cfg: &CmdlineConfig) -> Self {
        Self {
            page_size: usize::try_from(cfg.torrents_per_tab_press).unwrap_or(1).max(1),
            third_tab_lists_all: cfg.third_tab_lists_all,
        }
    }
}

/// Result of one Tab press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub line: String,
    /// Cursor as a char index into `line`.
    pub cursor: usize,
    /// Lines for the transcript, in order.
    pub output: Vec<String>,
    /// The listing finished; the caller zeroes its tab streak.
    pub reset_streak: bool,
}

impl Completion {
    fn unchanged(line: &str, cursor: usize) -> Self {
        Self {
            line: line.to_string(),
            cursor,
            output: Vec::new(),
            reset_streak: false,
        }
    }
}

pub struct CompletionEngine {
    settings: CompletionSettings,
    translator: Arc<dyn Translator>,
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new(CompletionSettings::default(), Arc::new(IdentityTranslator))
    }
}

impl CompletionEngine {
    pub fn new(settings: CompletionSettings, translator: Arc<dyn Translator>) -> Self {
        let settings = CompletionSettings {
            page_size: settings.page_size.max(1),
            ..settings
        };
        Self { settings, translator }
    }

    pub fn settings(&self) -> CompletionSettings {
        self.settings
    }

    /// Complete `line` at char index `cursor` for the `tab_streak`-th
    /// consecutive Tab (1 for the first).
    pub fn complete(&self, line: &str, cursor: usize, tab_streak: usize, source: &dyn CompletionSource) -> Completion {
        let split = line.char_indices().nth(cursor).map_or(line.len(), |(i, _)| i);
        let cursor = line[..split].chars().count();
        let (head, tail) = line.split_at(split);

        let (prefix, partial, candidates) = if head.contains(' ') {
            let words = split_unescaped(head);
            let command = words.first().copied().unwrap_or_default();
            if !source.has_command(command) {
                debug!(target: "editor.completion", "unknown_command_inert");
                return Completion::unchanged(line, cursor);
            }
            let start = last_word_start(head);
            let (prefix, partial) = head.split_at(start);
            (prefix, partial, source.complete(command, partial))
        } else {
            let mut names: Vec<String> = source.command_names().into_iter().filter(|n| n.starts_with(head)).collect();
            names.sort();
            ("", head, names)
        };
        debug!(target: "editor.completion", candidates = candidates.len(), tab_streak, "complete");

        match candidates.as_slice() {
            [] => Completion::unchanged(line, cursor),
            [only] => {
                let mut new_head = format!("{prefix}{only}");
                // directories end in `/`, or in an escaped `\\` on Windows-style paths
                if !new_head.ends_with('/') && !new_head.ends_with(r"\\") {
                    new_head.push(' ');
                }
                splice(&remove_formatting(&new_head), tail)
            }
            _ if tab_streak <= 1 => {
                let extended = format!("{prefix}{}", complete_line(partial, &candidates));
                let new_head = if remove_formatting(&extended).chars().count() > head.chars().count() {
                    extended
                } else {
                    head.to_string()
                };
                splice(&remove_formatting(&new_head), tail)
            }
            _ => {
                let (output, reset_streak) = self.listing(&candidates, tab_streak);
                Completion {
                    line: line.to_string(),
                    cursor,
                    output,
                    reset_streak,
                }
            }
        }
    }

    fn t<'a>(&'a self, text: &'a str) -> &'a str {
        self.translator.translate(text)
    }

    /// Side output for the `streak`-th Tab (>= 2) over several candidates.
    fn listing(&self, candidates: &[String], streak: usize) -> (Vec<String>, bool) {
        let page = self.settings.page_size;
        let total = candidates.len();
        let listed = (streak - 2).saturating_mul(page).min(total);
        let pages = (total - 1) / page + 1;
        let left = total - listed;

        let mut out = Vec::new();
        if streak == 2 {
            out.push(" ".to_string());
            if total >= 4 {
                out.push(self.t(MATCHES_HEADER).to_string());
            }
        }

        let reset = if self.settings.third_tab_lists_all {
            if streak == 2 && left > page {
                show(&candidates[listed..listed + page], &mut out);
                out.push(fill(self.t(MORE_ALL_FOOTER), &[("count", &(left - page))]));
                false
            } else {
                show(&candidates[listed..], &mut out);
                true
            }
        } else if left > page {
            let shown = streak - 1;
            show(&candidates[listed..listed + page], &mut out);
            out.push(fill(
                self.t(MORE_PAGED_FOOTER),
                &[("count", &(left - page)), ("page", &shown), ("pages", &pages)],
            ));
            false
        } else {
            show(&candidates[listed..], &mut out);
            if streak > 2 {
                out.push(fill(
                    self.t(FINISHED_FOOTER),
                    &[("count", &total), ("page", &pages), ("pages", &pages)],
                ));
            }
            true
        };
        debug!(target: "editor.completion", total, listed, pages, reset, "listing");
        (out, reset)
    }
}

fn show(items: &[String], out: &mut Vec<String>) {
    out.extend(items.iter().map(|c| c.replace("\\ ", " ")));
}

fn splice(head: &str, tail: &str) -> Completion {
    Completion {
        line: format!("{head}{tail}"),
        cursor: head.chars().count(),
        output: Vec::new(),
        reset_streak: false,
    }
}
