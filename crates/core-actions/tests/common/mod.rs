#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::completers::{TorrentEntry, complete_torrent};
use core_actions::{Command, CommandOutput, CommandRegistry, CompletionEngine, InputEditor, KeyOutcome};
use core_events::{KeyCode, KeyEvent, NoKeys};
use core_state::InputHistory;

pub struct Info {
    pub torrents: Vec<TorrentEntry>,
}

impl Command for Info {
    fn name(&self) -> &'static str {
        "info"
    }
    fn description(&self) -> &'static str {
        "Show torrent information"
    }
    fn usage(&self) -> &'static str {
        "info [<torrent-id>]"
    }
    fn complete(&self, partial: &str) -> Vec<String> {
        complete_torrent(partial, &self.torrents)
    }
    fn run(&self, _args: &[String]) -> anyhow::Result<CommandOutput> {
        Ok(CommandOutput::default())
    }
}

pub struct Named(pub &'static str);

impl Command for Named {
    fn name(&self) -> &'static str {
        self.0
    }
    fn description(&self) -> &'static str {
        ""
    }
    fn usage(&self) -> &'static str {
        ""
    }
    fn run(&self, _args: &[String]) -> anyhow::Result<CommandOutput> {
        Ok(CommandOutput::default())
    }
}

pub fn registry() -> CommandRegistry {
    CommandRegistry::new()
        .with(Info {
            torrents: vec![
                TorrentEntry::new("torrent_abc", "Alpha"),
                TorrentEntry::new("torrent_abd", "Beta"),
            ],
        })
        .with(Named("infohash_tool"))
}

pub fn editor() -> InputEditor {
    InputEditor::new(InputHistory::default(), CompletionEngine::default())
}

pub fn press(ed: &mut InputEditor, reg: &CommandRegistry, key: impl Into<KeyEvent>) -> KeyOutcome {
    ed.handle_key(key.into(), &mut NoKeys, reg)
}

pub fn type_text(ed: &mut InputEditor, reg: &CommandRegistry, text: &str) {
    for c in text.chars() {
        press(ed, reg, KeyCode::Char(c));
    }
}
