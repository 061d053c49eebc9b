//! Persisted transcript history across two rotating files.
//!
//! Lines are appended to one "active" file at a time. When the active file
//! reaches `max_per_file` lines the other file is truncated and becomes the
//! next target, so trimming never rewrites a whole file. Between them the
//! two files always hold the most recent `max_per_file..=2 * max_per_file`
//! lines once the first file has filled.
//!
//! Failures never reach the editor: a read error loads as empty, an append
//! error is logged at `history.store` and turns persistence off for the rest
//! of the session.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

mod extract;

pub use extract::{INPUT_MARKER, extract_input_history};

pub const MAX_PER_FILE: usize = 2000;
pub const MAX_BACKLOG: usize = 5000;

#[derive(Debug)]
pub struct HistoryStore {
    paths: [PathBuf; 2],
    counts: [usize; 2],
    max_per_file: usize,
    max_backlog: usize,
    disabled: bool,
}

impl HistoryStore {
    pub fn new(paths: [PathBuf; 2]) -> Self {
        Self::with_limits(paths, MAX_PER_FILE, MAX_BACKLOG)
    }

    pub fn with_limits(paths: [PathBuf; 2], max_per_file: usize, max_backlog: usize) -> Self {
        Self {
            paths,
            counts: [0, 0],
            max_per_file: max_per_file.max(1),
            max_backlog,
            disabled: false,
        }
    }

    pub fn counts(&self) -> [usize; 2] {
        self.counts
    }

    pub fn paths(&self) -> &[PathBuf; 2] {
        &self.paths
    }

    /// False once an append failed.
    pub fn is_persisting(&self) -> bool {
        !self.disabled
    }

    /// Read both files and return the most recent `max_backlog` lines in
    /// logical order. The file with more lines is the older one.
    pub fn load(&mut self) -> Vec<String> {
        let first = self.read_file(0);
        let second = self.read_file(1);
        self.counts = [first.len(), second.len()];

        let mut lines = if self.counts[0] > self.counts[1] {
            first.into_iter().chain(second).collect::<Vec<_>>()
        } else {
            second.into_iter().chain(first).collect::<Vec<_>>()
        };
        if lines.len() > self.max_backlog {
            lines.drain(..lines.len() - self.max_backlog);
        }
        debug!(
            target: "history.store",
            counts = ?self.counts,
            loaded = lines.len(),
            "history_loaded"
        );
        lines
    }

    fn read_file(&self, idx: usize) -> Vec<String> {
        match fs::read_to_string(&self.paths[idx]) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(target: "history.store", file = idx, error = %e, "history_read_failed");
                Vec::new()
            }
        }
    }

    /// Index of the file the next append goes to.
    pub fn active_file(&self) -> usize {
        let max = self.max_per_file;
        match (self.counts[0] < max, self.counts[1] < max) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 0,
            // both at or over the cap (limits lowered since they were written)
            (false, false) => 1,
        }
    }

    /// Append `line` to the active file, rotating when it fills. A failure
    /// disables persistence; it is never reported to the caller.
    pub fn append(&mut self, line: &str) {
        if self.disabled {
            return;
        }
        if let Err(e) = self.try_append(line) {
            warn!(target: "history.store", error = %e, "history_append_failed_disabling");
            self.disabled = true;
        }
    }

    fn try_append(&mut self, line: &str) -> io::Result<()> {
        let active = self.active_file();
        if self.counts[active] >= self.max_per_file {
            self.truncate(active)?;
        }
        if let Some(dir) = self.paths[active].parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.paths[active])?;
        writeln!(file, "{line}")?;
        self.counts[active] += 1;

        if self.counts[active] == self.max_per_file {
            self.truncate(1 - active)?;
            debug!(target: "history.store", full = active, "history_rotated");
        }
        Ok(())
    }

    fn truncate(&mut self, idx: usize) -> io::Result<()> {
        File::create(&self.paths[idx])?;
        self.counts[idx] = 0;
        Ok(())
    }
}
