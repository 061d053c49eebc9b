//! Completion over the `(torrent_id, display_name)` list.

use std::path::Path;

use anyhow::{Context, Result, bail};
use core_text::escape::{escape_spaces, unescape_spaces};
use tracing::debug;

use super::split_chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentEntry {
    pub id: String,
    pub name: String,
}

impl TorrentEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Opaque torrent list. The console never interprets ids or names beyond
/// prefix matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TorrentList {
    entries: Vec<TorrentEntry>,
}

impl TorrentList {
    pub fn new(entries: Vec<TorrentEntry>) -> Self {
        Self { entries }
    }

    /// Parse `id<TAB>name` lines. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (no, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((id, name)) = line.split_once('\t') else {
                bail!("line {}: expected `id<TAB>name`", no + 1);
            };
            if id.is_empty() {
                bail!("line {}: empty torrent id", no + 1);
            }
            entries.push(TorrentEntry::new(id, name));
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let list = Self::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        debug!(target: "runtime.command", torrents = list.len(), "torrent_list_loaded");
        Ok(list)
    }

    pub fn entries(&self) -> &[TorrentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose id equals `key` or whose name starts with it.
    pub fn matching(&self, key: &str) -> Vec<&TorrentEntry> {
        self.entries
            .iter()
            .filter(|t| t.id == key || t.name.starts_with(key))
            .collect()
    }
}

/// Candidates for a torrent argument.
///
/// A single unambiguous match comes back alone (the id, or the escaped
/// name) so it is spliced into the line. Anything else yields a listing
/// where the typed part is highlighted. Id matches are not listed for an
/// empty word, names would otherwise appear twice.
pub fn complete_torrent(partial: &str, torrents: &[TorrentEntry]) -> Vec<String> {
    let empty = partial.is_empty();
    let line = partial.strip_suffix('\\').unwrap_or(partial);
    let typed = line.chars().count();
    let plain = unescape_spaces(line);
    let lower = plain.to_lowercase();

    let mut exact = 0;
    let mut folded = 0;
    for t in torrents {
        if t.id.starts_with(&plain) {
            exact += 1;
        }
        if t.name.starts_with(&plain) {
            exact += 1;
        } else if t.name.to_lowercase().starts_with(&lower) {
            folded += 1;
        }
    }

    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    for t in torrents {
        let escaped = escape_spaces(&t.name);
        if exact == 1 {
            if t.id.starts_with(&plain) {
                return vec![t.id.clone()];
            }
            if t.name.starts_with(&plain) {
                return vec![escaped];
            }
        } else if exact == 0 && folded == 1 {
            if t.name.to_lowercase().starts_with(&lower) {
                return vec![escaped];
            }
        } else {
            if !empty && t.id.starts_with(&plain) {
                let (head, rest) = split_chars(&t.id, typed);
                primary.push(format!("{{!info!}}{head}{{!input!}}{rest} - \"{}\"", t.name));
            }
            let (head, rest) = split_chars(&escaped, typed);
            let entry = format!("{{!info!}}{head}{{!input!}}{rest} ({{!cyan!}}{}{{!input!}})", t.id);
            if t.name.starts_with(&plain) {
                primary.push(entry);
            } else if t.name.to_lowercase().starts_with(&lower) {
                secondary.push(entry);
            }
        }
    }
    primary.extend(secondary);
    primary
}
