//! Command abstraction and registry.
//!
//! Commands are trait objects registered once at startup. The registry maps
//! every name and alias to its command, splits argument text with
//! [`split_args`] and turns failures into a [`DispatchError`] whose markup
//! rendering is what the user sees:
//! * unknown name -> `{!error!}Unknown command: <name>`
//! * bad quoting -> `{!error!}Error parsing command: <why>`
//! * handler error -> `{!error!}<message>`
//!
//! The registry also serves completion (see [`crate::completion::CompletionSource`]):
//! command names for the first word, the command's own completer after it.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use crate::completion::CompletionSource;

mod command_parser;

pub use command_parser::{ArgError, split_args};

/// What a command produced: markup lines for the transcript and whether the
/// host should exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl CommandOutput {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            quit: false,
        }
    }

    pub fn line(line: impl Into<String>) -> Self {
        Self::lines([line])
    }

    pub fn quit() -> Self {
        Self {
            lines: Vec::new(),
            quit: true,
        }
    }
}

pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// One line summary shown by `help`.
    fn description(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    /// Candidates for the argument word being typed. Candidates may carry
    /// colour markup; spaces in them must be escaped.
    fn complete(&self, _partial: &str) -> Vec<String> {
        Vec::new()
    }

    fn run(&self, args: &[String]) -> anyhow::Result<CommandOutput>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Error parsing command: {0}")]
    Parse(#[from] ArgError),
    #[error("{message}")]
    Failed { command: String, message: String },
}

impl DispatchError {
    /// The error as a transcript line.
    pub fn to_markup(&self) -> String {
        format!("{{!error!}}{self}")
    }
}

/// Name/alias to command mapping, fixed after construction.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    index: BTreeMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A name or alias already taken is overwritten.
    pub fn register(&mut self, cmd: Arc<dyn Command>) {
        let slot = self.commands.len();
        self.index.insert(cmd.name(), slot);
        for alias in cmd.aliases() {
            self.index.insert(*alias, slot);
        }
        debug!(target: "runtime.command", name = cmd.name(), aliases = cmd.aliases().len(), "command_registered");
        self.commands.push(cmd);
    }

    pub fn with(mut self, cmd: impl Command + 'static) -> Self {
        self.register(Arc::new(cmd));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.index.get(name).and_then(|i| self.commands.get(*i))
    }

    /// Registered commands ordered by primary name.
    pub fn commands(&self) -> Vec<Arc<dyn Command>> {
        let mut out = self.commands.clone();
        out.sort_by_key(|c| c.name());
        out
    }

    /// Run one committed command line.
    pub fn execute(&self, line: &str) -> Result<CommandOutput, DispatchError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(CommandOutput::default());
        }
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let Some(cmd) = self.get(name) else {
            debug!(target: "runtime.command", name_len = name.len(), "unknown_command");
            return Err(DispatchError::UnknownCommand(name.to_string()));
        };
        let args = split_args(rest).inspect_err(|e| {
            debug!(target: "runtime.command", command = cmd.name(), error = %e, "argument_parse_failed");
        })?;
        debug!(target: "runtime.command", command = cmd.name(), argc = args.len(), "command_start");
        cmd.run(&args).map_err(|e| {
            error!(target: "runtime.command", command = cmd.name(), error = %format!("{e:#}"), "command_failed");
            DispatchError::Failed {
                command: cmd.name().to_string(),
                message: format!("{e:#}"),
            }
        })
    }
}

impl CompletionSource for CommandRegistry {
    fn has_command(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn command_names(&self) -> Vec<String> {
        self.index.keys().map(|k| k.to_string()).collect()
    }

    fn complete(&self, command: &str, partial: &str) -> Vec<String> {
        self.get(command).map(|c| c.complete(partial)).unwrap_or_default()
    }
}
