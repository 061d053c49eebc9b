//! Terminal session guard.

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode, size},
};
use std::io::stdout;
use tracing::{debug, warn};

/// Raw mode plus alternate screen for as long as the guard lives. Restores
/// the terminal on drop, including on panic unwinds.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter(title: &str) -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, SetTitle(title))?;
        debug!(target: "runtime", "terminal_entered");
        Ok(Self { active: true })
    }

    /// Current `(columns, rows)`.
    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(size()?)
    }

    pub fn leave(&mut self) -> Result<()> {
        if self.active {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.active = false;
            debug!(target: "runtime", "terminal_left");
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            warn!(target: "runtime", error = %e, "terminal_restore_failed");
        }
    }
}
