//! Fire-and-forget command dispatch.
//!
//! A committed line runs on the blocking pool (handlers may touch the
//! filesystem) and its output comes back to the event loop as
//! `Event::Output`, followed by `Event::Command(Quit)` when the command asked
//! to exit. The editor never waits on a command.

use std::sync::Arc;

use core_actions::{CommandOutput, CommandRegistry, DispatchError};
use core_events::{CommandEvent, Event};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, trace, warn};

pub fn spawn_dispatch(registry: Arc<CommandRegistry>, line: String, tx: Sender<Event>) -> JoinHandle<()> {
    let span = tracing::debug_span!(target: "runtime.command", "dispatch", len = line.len());
    tokio::spawn(
        async move {
            let result = match tokio::task::spawn_blocking(move || registry.execute(&line)).await {
                Ok(result) => result,
                Err(err) => {
                    error!(target: "runtime.command", ?err, "dispatch_task_failed");
                    return;
                }
            };
            for event in outcome_events(result) {
                if tx.send(event).await.is_err() {
                    warn!(target: "runtime.command", "dispatch_output_dropped_channel_closed");
                    return;
                }
            }
            trace!(target: "runtime.command", "dispatch_done");
        }
        .instrument(span),
    )
}

/// Events the loop should see for one command result, in order.
pub fn outcome_events(result: Result<CommandOutput, DispatchError>) -> Vec<Event> {
    match result {
        Ok(CommandOutput { lines, quit }) => {
            let mut out = Vec::with_capacity(2);
            if !lines.is_empty() {
                out.push(Event::Output(lines));
            }
            if quit {
                out.push(Event::Command(CommandEvent::Quit));
            }
            out
        }
        Err(e) => vec![Event::Output(vec![e.to_markup()])],
    }
}
