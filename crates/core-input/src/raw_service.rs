//! Byte-stream key input: raw codes read from any `Read` (normally stdin in
//! raw mode) and forwarded as [`InputEvent::Raw`] chunks.
//!
//! Reading blocks, so it runs on a plain thread. A chunk is held back until
//! it no longer ends inside a UTF-8 sequence, which lets the editor read the
//! continuation bytes of a character from the same chunk.

use crate::async_service::{AsyncInputShutdown, pump, stop_pair};
use core_events::{AsyncEventSource, Event, InputEvent};
use std::io::{self, Read};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::sync::mpsc::{self, Sender, UnboundedSender};
use tokio::task;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{Instrument, debug, trace, warn};

const READ_CHUNK: usize = 256;

/// Raw key source registered with the runtime's `EventSourceRegistry`.
///
/// The stop signal ends forwarding at once; a reader blocked in `read` is
/// left behind and exits with the process.
pub struct RawInputSource {
    reader: Box<dyn Read + Send>,
    stop: Arc<Notify>,
}

impl RawInputSource {
    pub fn new(reader: impl Read + Send + 'static) -> (Self, AsyncInputShutdown) {
        let (shutdown, stop) = stop_pair();
        let source = Self {
            reader: Box::new(reader),
            stop,
        };
        (source, shutdown)
    }
}

impl AsyncEventSource for RawInputSource {
    fn name(&self) -> &'static str {
        "raw_input"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> task::JoinHandle<()> {
        let Self { reader, stop } = *self;
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let spawned = std::thread::Builder::new()
            .name("raw-input".into())
            .spawn(move || read_chunks(reader, chunk_tx));
        if let Err(e) = spawned {
            warn!(target: "input.thread", ?e, "raw_reader_spawn_failed");
        }
        let span = tracing::debug_span!(target: "input.thread", "raw_input");
        task::spawn(
            async move {
                pump(UnboundedReceiverStream::new(chunk_rx), tx, stop, |codes: Vec<i32>| {
                    trace!(target: "input.event", len = codes.len(), "raw_chunk");
                    Some(Event::Input(InputEvent::Raw(codes)))
                })
                .await;
            }
            .instrument(span),
        )
    }
}

/// Read until end of input, a read error or a dropped receiver.
fn read_chunks(mut reader: Box<dyn Read + Send>, out: UnboundedSender<io::Result<Vec<i32>>>) {
    let mut buf = [0u8; READ_CHUNK];
    let mut carry = Vec::new();
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                if !carry.is_empty() {
                    let _ = out.send(Ok(carry.iter().map(|b| i32::from(*b)).collect()));
                }
                debug!(target: "input.thread", "raw_input_eof");
                return;
            }
            Ok(n) => {
                carry.extend_from_slice(&buf[..n]);
                let ready = carry.len() - incomplete_tail(&carry);
                if ready == 0 {
                    continue;
                }
                let codes = carry.drain(..ready).map(i32::from).collect();
                if out.send(Ok(codes)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                let _ = out.send(Err(e));
                return;
            }
        }
    }
}

/// Number of trailing bytes that start a UTF-8 sequence not yet complete.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let b = bytes[bytes.len() - back];
        if b & 0xc0 == 0x80 {
            continue;
        }
        let need = match b {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => 1,
        };
        return if need > back { back } else { 0 };
    }
    0
}
