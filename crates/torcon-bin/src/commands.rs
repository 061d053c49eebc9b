//! Built-in console commands.
//!
//! The torrent list is shared between `info` (reads, completes) and `load`
//! (replaces it) behind one lock; everything else is immutable after start.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Result, bail};
use core_actions::completers::{PathCompleteOptions, TorrentList, complete_path, complete_torrent};
use core_actions::{Command, CommandOutput, CommandRegistry, colorize_help};
use core_config::CmdlineConfig;
use core_text::width::{format_column, format_row};
use core_text::wrap;
use tracing::info;

pub type SharedTorrents = Arc<RwLock<TorrentList>>;

const NAME_COLUMN: usize = 12;
const ID_COLUMN: usize = 42;
const HELP_WIDTH: usize = 78;

/// Registry with every built-in command, `help` last so it sees the rest.
pub fn builtin_registry(cmdline: CmdlineConfig, torrents: SharedTorrents) -> CommandRegistry {
    let mut registry = CommandRegistry::new()
        .with(Quit)
        .with(Info {
            torrents: torrents.clone(),
        })
        .with(Config { cmdline })
        .with(Load { torrents });
    let mut listed = registry.commands();
    listed.push(Arc::new(Help { commands: Vec::new() }));
    listed.sort_by_key(|c| c.name());
    registry.register(Arc::new(Help { commands: listed }));
    registry
}

fn prefixed<'a>(names: impl IntoIterator<Item = &'a str>, partial: &str) -> Vec<String> {
    names
        .into_iter()
        .filter(|n| n.starts_with(partial))
        .map(str::to_string)
        .collect()
}

pub struct Help {
    commands: Vec<Arc<dyn Command>>,
}

impl Help {
    fn find(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands
            .iter()
            .find(|c| c.name() == name || c.aliases().iter().any(|a| *a == name))
    }

    fn detail(cmd: &dyn Command) -> Result<Vec<String>> {
        let mut out = vec![colorize_help(&format!("usage: {}", cmd.usage()))];
        if !cmd.aliases().is_empty() {
            out.push(format!("{{!info!}}Aliases:{{!input!}} {}", cmd.aliases().join(", ")));
        }
        out.push(String::new());
        out.extend(wrap(cmd.description(), HELP_WIDTH)?);
        Ok(out)
    }
}

impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Displays help on other commands"
    }

    fn usage(&self) -> &'static str {
        "help [<command>...]"
    }

    fn complete(&self, partial: &str) -> Vec<String> {
        prefixed(self.commands.iter().map(|c| c.name()), partial)
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        if args.is_empty() {
            let mut out = vec!["{!header!}Available commands:".to_string()];
            for cmd in &self.commands {
                out.push(format!(
                    "{{!info!}}{}{{!input!}}{}",
                    format_column(cmd.name(), NAME_COLUMN),
                    cmd.description()
                ));
            }
            out.push(String::new());
            out.push("For help on a specific command, use 'help <command>'".to_string());
            return Ok(CommandOutput::lines(out));
        }
        let mut out = Vec::new();
        for (i, name) in args.iter().enumerate() {
            let Some(cmd) = self.find(name) else {
                bail!("Unknown command: {name}");
            };
            if i > 0 {
                out.push(String::new());
            }
            out.extend(Self::detail(cmd.as_ref())?);
        }
        Ok(CommandOutput::lines(out))
    }
}

pub struct Quit;

impl Command for Quit {
    fn name(&self) -> &'static str {
        "quit"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["exit"]
    }

    fn description(&self) -> &'static str {
        "Exit the console"
    }

    fn usage(&self) -> &'static str {
        "quit"
    }

    fn run(&self, _args: &[String]) -> Result<CommandOutput> {
        Ok(CommandOutput::quit())
    }
}

pub struct Info {
    torrents: SharedTorrents,
}

impl Command for Info {
    fn name(&self) -> &'static str {
        "info"
    }

    fn description(&self) -> &'static str {
        "Show torrent ids and names. With arguments, only the torrents whose id equals or whose name starts with one of them."
    }

    fn usage(&self) -> &'static str {
        "info [<torrent-id>...]"
    }

    fn complete(&self, partial: &str) -> Vec<String> {
        let list = self.torrents.read().unwrap_or_else(PoisonError::into_inner);
        complete_torrent(partial, list.entries())
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        let list = self.torrents.read().unwrap_or_else(PoisonError::into_inner);
        let selected: Vec<_> = if args.is_empty() {
            list.entries().iter().collect()
        } else {
            let mut hits = Vec::new();
            for key in args {
                for t in list.matching(key) {
                    if !hits.contains(&t) {
                        hits.push(t);
                    }
                }
            }
            hits
        };
        if selected.is_empty() {
            return Ok(CommandOutput::line("{!error!}No matching torrents"));
        }
        let widths = [ID_COLUMN, HELP_WIDTH - ID_COLUMN];
        Ok(CommandOutput::lines(selected.into_iter().map(|t| {
            let row = format_row(&[t.id.as_str(), t.name.as_str()], &widths);
            format!("{{!cyan!}}{row}")
        })))
    }
}

pub struct Config {
    cmdline: CmdlineConfig,
}

impl Command for Config {
    fn name(&self) -> &'static str {
        "config"
    }

    fn description(&self) -> &'static str {
        "Show the command line options"
    }

    fn usage(&self) -> &'static str {
        "config [<key>...]"
    }

    fn complete(&self, partial: &str) -> Vec<String> {
        prefixed(self.cmdline.entries().into_iter().map(|(k, _)| k), partial)
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        let entries = self.cmdline.entries();
        let mut out = Vec::new();
        if args.is_empty() {
            out.push("{!header!}[cmdline]".to_string());
        }
        for key in args {
            if !entries.iter().any(|(k, _)| *k == key.as_str()) {
                bail!("Unknown config key: {key}");
            }
        }
        for (key, value) in &entries {
            if args.is_empty() || args.iter().any(|a| a.as_str() == *key) {
                out.push(format!("{{!info!}}{key}{{!input!}} = {value}"));
            }
        }
        Ok(CommandOutput::lines(out))
    }
}

pub struct Load {
    torrents: SharedTorrents,
}

impl Command for Load {
    fn name(&self) -> &'static str {
        "load"
    }

    fn description(&self) -> &'static str {
        "Replace the torrent list with the one in a file of `id<TAB>name` lines"
    }

    fn usage(&self) -> &'static str {
        "load <path>"
    }

    fn complete(&self, partial: &str) -> Vec<String> {
        complete_path(partial, &PathCompleteOptions::default())
    }

    fn run(&self, args: &[String]) -> Result<CommandOutput> {
        let [path] = args else {
            bail!("Usage: {}", self.usage());
        };
        let list = TorrentList::load(Path::new(path))?;
        let count = list.len();
        *self.torrents.write().unwrap_or_else(PoisonError::into_inner) = list;
        info!(target: "runtime.command", count, "torrent_list_replaced");
        Ok(CommandOutput::line(format!("{{!success!}}Loaded {count} torrents from {path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_actions::completers::TorrentEntry;
    use core_actions::{CompletionSource, DispatchError};
    use pretty_assertions::assert_eq;

    fn shared(entries: &[(&str, &str)]) -> SharedTorrents {
        Arc::new(RwLock::new(TorrentList::new(
            entries.iter().map(|(id, name)| TorrentEntry::new(*id, *name)).collect(),
        )))
    }

    fn registry() -> CommandRegistry {
        builtin_registry(
            CmdlineConfig::default(),
            shared(&[("aa11", "Ubuntu ISO"), ("bb22", "Debian netinst")]),
        )
    }

    #[test]
    fn all_builtins_are_registered() {
        let reg = registry();
        let mut names = reg.command_names();
        names.sort();
        assert_eq!(names, vec!["config", "exit", "help", "info", "load", "quit"]);
    }

    #[test]
    fn help_lists_every_command_including_itself() {
        let out = registry().execute("help").unwrap();
        assert_eq!(out.lines[0], "{!header!}Available commands:");
        let listed: Vec<_> = out.lines[1..6].iter().map(|l| core_text::remove_formatting(l)).collect();
        assert!(listed[0].starts_with("config"));
        assert!(listed[2].starts_with("info"));
        assert!(listed.iter().any(|l| l.starts_with("help")));
    }

    #[test]
    fn help_for_alias_shows_usage() {
        let out = registry().execute("help exit").unwrap();
        assert_eq!(out.lines[0], "{!info!}usage:{!input!} quit");
        assert_eq!(out.lines[1], "{!info!}Aliases:{!input!} exit");
    }

    #[test]
    fn help_for_unknown_command_fails() {
        let err = registry().execute("help nope").unwrap_err();
        assert_eq!(err.to_markup(), "{!error!}Unknown command: nope");
    }

    #[test]
    fn quit_and_exit_request_exit() {
        let reg = registry();
        assert!(reg.execute("quit").unwrap().quit);
        assert!(reg.execute("exit").unwrap().quit);
    }

    #[test]
    fn info_filters_by_id_or_name_prefix() {
        let out = registry().execute("info Deb").unwrap();
        assert_eq!(out.lines.len(), 1);
        assert!(out.lines[0].contains("bb22"));
        let none = registry().execute("info zz").unwrap();
        assert_eq!(none.lines, vec!["{!error!}No matching torrents"]);
    }

    #[test]
    fn info_completes_torrents() {
        let reg = registry();
        assert_eq!(reg.complete("info", "Ub"), vec!["Ubuntu\\ ISO"]);
    }

    #[test]
    fn config_shows_one_key_and_rejects_unknown() {
        let reg = registry();
        let out = reg.execute("config third_tab_lists_all").unwrap();
        assert_eq!(out.lines, vec!["{!info!}third_tab_lists_all{!input!} = false"]);
        assert!(matches!(reg.execute("config colour"), Err(DispatchError::Failed { .. })));
        assert_eq!(reg.complete("config", "ig"), vec!["ignore_duplicate_lines"]);
    }

    #[test]
    fn load_replaces_shared_list() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("list.tsv");
        std::fs::write(&file, "cc33\tArch Linux\n").unwrap();
        let torrents = shared(&[("aa11", "Ubuntu ISO")]);
        let reg = builtin_registry(CmdlineConfig::default(), torrents.clone());

        let line = format!("load \"{}\"", file.display());
        let out = reg.execute(&line).unwrap();
        assert!(out.lines[0].starts_with("{!success!}Loaded 1 torrents"));
        assert_eq!(torrents.read().unwrap().entries()[0].id, "cc33");
        assert_eq!(reg.complete("info", "Ar"), vec!["Arch\\ Linux"]);
    }

    #[test]
    fn load_without_path_reports_usage() {
        let err = registry().execute("load").unwrap_err();
        assert_eq!(err.to_markup(), "{!error!}Usage: load <path>");
    }
}
