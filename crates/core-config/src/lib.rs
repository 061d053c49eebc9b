//! Configuration loading and parsing.
//!
//! Parses `torcon.toml` (or an override path provided by the binary). Every
//! field has a default so a partial file only overrides what it names;
//! unknown fields are ignored. A missing or unparsable file yields the
//! defaults rather than an error.
//!
//! Raw values are retained in `ConfigFile`; values that need clamping are
//! resolved once by `Config::normalize` into the `effective_*` fields.

use anyhow::Result;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "torcon.toml";
pub const APP_DIR_NAME: &str = "torcon";
pub const HISTORY_FILE_NAMES: [&str; 2] = ["cmd_line.hist1", "cmd_line.hist2"];

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CmdlineConfig {
    #[serde(default = "CmdlineConfig::default_save_command_history")]
    pub save_command_history: bool,
    #[serde(default)]
    pub ignore_duplicate_lines: bool,
    #[serde(default)]
    pub third_tab_lists_all: bool,
    /// Completion listing page size. Signed so a bad value can be reported
    /// and clamped instead of failing the whole file.
    #[serde(default = "CmdlineConfig::default_torrents_per_tab_press")]
    pub torrents_per_tab_press: i64,
}

impl Default for CmdlineConfig {
    fn default() -> Self {
        Self {
            save_command_history: Self::default_save_command_history(),
            ignore_duplicate_lines: false,
            third_tab_lists_all: false,
            torrents_per_tab_press: Self::default_torrents_per_tab_press(),
        }
    }
}

impl CmdlineConfig {
    const fn default_save_command_history() -> bool {
        true
    }
    const fn default_torrents_per_tab_press() -> i64 {
        15
    }

    /// `(key, value)` pairs in file order, for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("save_command_history", self.save_command_history.to_string()),
            ("ignore_duplicate_lines", self.ignore_duplicate_lines.to_string()),
            ("third_tab_lists_all", self.third_tab_lists_all.to_string()),
            ("torrents_per_tab_press", self.torrents_per_tab_press.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Directory holding the two rotating history files.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "HistoryConfig::default_max_per_file")]
    pub max_per_file: usize,
    #[serde(default = "HistoryConfig::default_max_backlog")]
    pub max_backlog: usize,
    #[serde(default = "HistoryConfig::default_input_history_size")]
    pub input_history_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_per_file: Self::default_max_per_file(),
            max_backlog: Self::default_max_backlog(),
            input_history_size: Self::default_input_history_size(),
        }
    }
}

impl HistoryConfig {
    const fn default_max_per_file() -> usize {
        2000
    }
    const fn default_max_backlog() -> usize {
        5000
    }
    const fn default_input_history_size() -> usize {
        500
    }

    /// Configured directory, else the platform config dir, else the cwd.
    pub fn resolve_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        dirs::config_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Paths of the two rotating history files inside `dir`.
pub fn history_paths(dir: &Path) -> [PathBuf; 2] {
    HISTORY_FILE_NAMES.map(|name| dir.join(name))
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Detect from the environment.
    #[default]
    Auto,
    None,
    Basic,
    Extended,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub colors: ColorMode,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub cmdline: CmdlineConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>,          // original file string (optional)
    pub file: ConfigFile,             // parsed (or default) data
    pub effective_page_size: usize,   // torrents_per_tab_press, at least 1
    pub effective_max_per_file: usize,
    pub effective_max_backlog: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(None, ConfigFile::default())
    }
}

/// Best-effort config path: a local `torcon.toml` wins over the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config::from_file(Some(content), file)),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn from_file(raw: Option<String>, file: ConfigFile) -> Self {
        let mut cfg = Self {
            raw,
            file,
            effective_page_size: 1,
            effective_max_per_file: 1,
            effective_max_backlog: 1,
        };
        cfg.normalize();
        cfg
    }

    /// Resolve clamped values from the raw file values. Each clamp is
    /// reported at `config`.
    pub fn normalize(&mut self) {
        let raw = self.file.cmdline.torrents_per_tab_press;
        let page = usize::try_from(raw).unwrap_or(0).max(1);
        if i64::try_from(page).ok() != Some(raw) {
            info!(target: "config", raw, clamped = page, "torrents_per_tab_press_clamped");
        }
        self.effective_page_size = page;

        let hist = &self.file.history;
        self.effective_max_per_file = clamp_min_one("max_per_file", hist.max_per_file);
        self.effective_max_backlog = clamp_min_one("max_backlog", hist.max_backlog);
    }

    pub fn cmdline(&self) -> &CmdlineConfig {
        &self.file.cmdline
    }
}

fn clamp_min_one(key: &'static str, raw: usize) -> usize {
    if raw == 0 {
        info!(target: "config", key, raw, clamped = 1, "history_limit_clamped");
        return 1;
    }
    raw
}
