//! Async terminal input: a crossterm `EventStream` pumped into the runtime
//! channel until the stop signal fires, the stream ends or the loop hangs up.
//!
//! Key text is never logged; only its kind and modifiers are.

use crate::key_map::map_key_event;
use core_events::{
    ASYNC_INPUT_STARTS, ASYNC_INPUT_STOP_CHANNEL, ASYNC_INPUT_STOP_ERROR, ASYNC_INPUT_STOP_SIGNAL,
    ASYNC_INPUT_STOP_STREAM, AsyncEventSource, CHANNEL_SEND_FAILURES, CommandEvent, Event, InputEvent,
    KEYPRESS_TOTAL,
};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event as CEvent, EventStream, KeyCode as CKeyCode,
    KeyEventKind as CKind, KeyModifiers as CKeyModifiers,
};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::{Stream, StreamExt};
use tracing::{Instrument, debug, info, trace, warn};

/// Handle that stops the input task. Signalling before the task starts is
/// remembered.
#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

pub(crate) fn stop_pair() -> (AsyncInputShutdown, Arc<Notify>) {
    let notify = Arc::new(Notify::new());
    (AsyncInputShutdown { notify: notify.clone() }, notify)
}

/// Terminal key source registered with the runtime's `EventSourceRegistry`.
pub struct TerminalInputSource {
    stop: Arc<Notify>,
}

impl TerminalInputSource {
    pub fn new() -> (Self, AsyncInputShutdown) {
        let (shutdown, stop) = stop_pair();
        (Self { stop }, shutdown)
    }
}

impl AsyncEventSource for TerminalInputSource {
    fn name(&self) -> &'static str {
        "terminal_input"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> task::JoinHandle<()> {
        let stop = self.stop;
        let span = tracing::debug_span!(target: "input.thread", "terminal_input");
        task::spawn(
            async move {
                bracketed_paste(true);
                pump(EventStream::new(), tx, stop, translate_event).await;
                bracketed_paste(false);
            }
            .instrument(span),
        )
    }
}

fn bracketed_paste(enable: bool) {
    let res = if enable {
        crossterm::execute!(io::stdout(), EnableBracketedPaste)
    } else {
        crossterm::execute!(io::stdout(), DisableBracketedPaste)
    };
    if let Err(e) = res {
        debug!(target: "input.paste", enable, ?e, "bracketed_paste_toggle_failed");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StopReason {
    Signal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl StopReason {
    fn as_str(self) -> &'static str {
        match self {
            StopReason::Signal => "shutdown_signal",
            StopReason::ChannelClosed => "channel_closed",
            StopReason::StreamEnded => "stream_ended",
            StopReason::StreamError => "stream_error",
        }
    }

    fn counter(self) -> &'static AtomicU64 {
        match self {
            StopReason::Signal => &ASYNC_INPUT_STOP_SIGNAL,
            StopReason::ChannelClosed => &ASYNC_INPUT_STOP_CHANNEL,
            StopReason::StreamEnded => &ASYNC_INPUT_STOP_STREAM,
            StopReason::StreamError => &ASYNC_INPUT_STOP_ERROR,
        }
    }
}

/// The runtime event for one terminal event, if the console cares about it.
///
/// Ctrl+C is the quit chord; key releases, unmapped keys and mouse input
/// are dropped. Regaining focus asks for a redraw since other programs may
/// have drawn over the screen.
pub(crate) fn translate_event(event: CEvent) -> Option<Event> {
    match event {
        CEvent::Key(key) => {
            if !matches!(key.kind, CKind::Press | CKind::Repeat) {
                return None;
            }
            if key.code == CKeyCode::Char('c') && key.modifiers.contains(CKeyModifiers::CONTROL) {
                return Some(Event::Command(CommandEvent::Quit));
            }
            let mapped = map_key_event(&key)?;
            trace!(
                target: "input.event",
                mods = ?mapped.mods,
                printable = matches!(mapped.code, core_events::KeyCode::Char(_)),
                "keypress"
            );
            Some(Event::Input(InputEvent::Key(mapped)))
        }
        CEvent::Resize(w, h) => {
            trace!(target: "input.event", w, h, "resize");
            Some(Event::Input(InputEvent::Resize(w, h)))
        }
        CEvent::Paste(text) => {
            trace!(target: "input.paste", len = text.len(), "paste");
            Some(Event::Input(InputEvent::Paste(text)))
        }
        CEvent::FocusGained => Some(Event::RenderRequested),
        _ => None,
    }
}

/// Forward `stream` into the loop's channel until the stop signal, the end
/// of the stream, a read error or a hung-up loop.
pub(crate) async fn pump<S, T, F>(mut stream: S, tx: Sender<Event>, stop: Arc<Notify>, translate: F)
where
    S: Stream<Item = io::Result<T>> + Unpin,
    F: Fn(T) -> Option<Event>,
{
    info!(target: "input.thread", "input_task_started");
    ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
    let reason = loop {
        let next = tokio::select! {
            biased;
            _ = stop.notified() => break StopReason::Signal,
            next = stream.next() => next,
        };
        let event = match next {
            None => break StopReason::StreamEnded,
            Some(Err(e)) => {
                warn!(target: "input.thread", kind = ?e.kind(), "input_stream_error");
                break StopReason::StreamError;
            }
            Some(Ok(raw)) => match translate(raw) {
                Some(event) => event,
                None => continue,
            },
        };
        let is_key = matches!(event, Event::Input(InputEvent::Key(_) | InputEvent::Raw(_)));
        if tx.send(event).await.is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            break StopReason::ChannelClosed;
        }
        if is_key {
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
        }
    };
    reason.counter().fetch_add(1, Ordering::Relaxed);
    info!(target: "input.thread", reason = reason.as_str(), "input_task_stopped");
}
