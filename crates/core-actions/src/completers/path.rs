//! Filesystem path completion.

use std::fs;
use std::path::{Path, PathBuf};

use core_text::escape::{escape_spaces, unescape_spaces};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCompleteOptions {
    /// Only list files with this suffix (directories are always listed).
    pub extension: Option<String>,
}

/// Candidates for a path argument, absolute, space-escaped, directories
/// first and marked with `{!cyan!}` and a trailing separator.
///
/// A partial naming an existing directory lists its non-hidden entries;
/// anything else lists the siblings sharing the typed file name prefix.
pub fn complete_path(partial: &str, opts: &PathCompleteOptions) -> Vec<String> {
    let typed = expand_tilde(&unescape_spaces(partial));
    let path = if typed.is_absolute() {
        typed
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(typed),
            Err(e) => {
                warn!(target: "editor.completion", error = %e, "current_dir_unavailable");
                return Vec::new();
            }
        }
    };

    let mut found: Vec<(bool, PathBuf)> = Vec::new();
    if path.is_dir() {
        list_dir(&path, opts, true, |_| true, &mut found);
    } else {
        let Some(parent) = path.parent() else {
            return Vec::new();
        };
        let stem = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        list_dir(parent, opts, false, |name| name.starts_with(&stem), &mut found);
    }

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found
        .into_iter()
        .map(|(is_dir, p)| {
            let text = escape_spaces(&p.to_string_lossy());
            if is_dir {
                format!("{{!cyan!}}{text}{}", std::path::MAIN_SEPARATOR)
            } else {
                text
            }
        })
        .collect()
}

fn list_dir(
    dir: &Path,
    opts: &PathCompleteOptions,
    skip_hidden: bool,
    keep: impl Fn(&str) -> bool,
    out: &mut Vec<(bool, PathBuf)>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(target: "editor.completion", error = %e, "read_dir_failed");
            return;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !keep(&name) || (skip_hidden && name.starts_with('.')) {
            continue;
        }
        let full = entry.path();
        let is_dir = full.is_dir();
        if !is_dir
            && let Some(ext) = &opts.extension
            && !name.ends_with(ext.as_str())
        {
            continue;
        }
        out.push((is_dir, full));
    }
}

fn expand_tilde(text: &str) -> PathBuf {
    if let Some(rest) = text.strip_prefix('~')
        && (rest.is_empty() || rest.starts_with('/'))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest.trim_start_matches('/'));
    }
    PathBuf::from(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("movies")).unwrap();
        fs::create_dir(dir.path().join("my docs")).unwrap();
        fs::write(dir.path().join("a.torrent"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        dir
    }

    fn base(dir: &tempfile::TempDir) -> String {
        escape_spaces(&dir.path().to_string_lossy())
    }

    #[test]
    fn directory_lists_entries_dirs_first() {
        let dir = fixture();
        let b = base(&dir);
        let out = complete_path(&format!("{b}/"), &PathCompleteOptions::default());
        assert_eq!(
            out,
            vec![
                format!("{{!cyan!}}{b}/movies/"),
                format!("{{!cyan!}}{b}/my\\ docs/"),
                format!("{b}/a.torrent"),
                format!("{b}/notes.txt"),
            ]
        );
    }

    #[test]
    fn extension_filter_keeps_dirs() {
        let dir = fixture();
        let b = base(&dir);
        let opts = PathCompleteOptions {
            extension: Some(".torrent".into()),
        };
        let out = complete_path(&format!("{b}/"), &opts);
        assert_eq!(out.len(), 3);
        assert!(!out.iter().any(|c| c.ends_with("notes.txt")));
    }

    #[test]
    fn prefix_lists_matching_siblings() {
        let dir = fixture();
        let b = base(&dir);
        let out = complete_path(&format!("{b}/m"), &PathCompleteOptions::default());
        assert_eq!(out, vec![format!("{{!cyan!}}{b}/movies/"), format!("{{!cyan!}}{b}/my\\ docs/")]);
    }

    #[test]
    fn escaped_space_in_partial() {
        let dir = fixture();
        let b = base(&dir);
        let out = complete_path(&format!("{b}/my\\ d"), &PathCompleteOptions::default());
        assert_eq!(out, vec![format!("{{!cyan!}}{b}/my\\ docs/")]);
    }

    #[test]
    fn missing_parent_yields_nothing() {
        let dir = fixture();
        let b = base(&dir);
        assert!(complete_path(&format!("{b}/nope/x"), &PathCompleteOptions::default()).is_empty());
    }
}
