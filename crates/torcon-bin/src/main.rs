//! torcon entrypoint.
use anyhow::Result;
use clap::Parser;
use core_actions::completers::TorrentList;
use core_actions::{CatalogTranslator, CommandRegistry, EditAction, IdentityTranslator, InputEditor, Scroll, Translator};
use core_config::{ColorMode, Config, history_paths, load_from};
use core_events::{
    CHANNEL_SEND_FAILURES, CommandEvent, EVENT_CHANNEL_CAP, Event, EventSourceRegistry, InputEvent, KEYPRESS_TOTAL,
    KeyCode, KeyEvent, KeyModifiers, KeySource, NoKeys,
};
use core_history::{HistoryStore, extract_input_history};
use core_input::{AsyncInputShutdown, RawInputSource, TerminalInputSource, decode_raw};
use core_render::{InputWindow, TerminalGuard, Transcript, Writer, compose_frame, detect_color_level};
use core_state::InputHistory;
use core_text::markup::ColorLevel;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Once, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;
mod dispatch;

use commands::{SharedTorrents, builtin_registry};
use dispatch::spawn_dispatch;

const LOG_FILE: &str = "torcon.log";
const WINDOW_TITLE: &str = "torcon";
const SOURCE_JOIN_TIMEOUT: Duration = Duration::from_millis(200);

/// CLI arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "torcon", version, about = "Torrent console command line")]
struct Args {
    /// Configuration file path (overrides discovery of `torcon.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Torrent list to load at startup, one `id<TAB>name` per line.
    #[arg(long = "torrents")]
    pub torrents: Option<PathBuf>,
    /// Directory for the two rotating history files.
    #[arg(long = "history-dir")]
    pub history_dir: Option<PathBuf>,
    /// TOML table of `"source" = "translation"` pairs for console messages.
    #[arg(long = "translations")]
    pub translations: Option<PathBuf>,
    /// Disable colours regardless of configuration and terminal.
    #[arg(long = "no-color")]
    pub no_color: bool,
    /// Read raw key bytes from stdin instead of terminal events. Resizes and
    /// bracketed paste are not reported in this mode.
    #[arg(long = "raw-input")]
    pub raw_input: bool,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn load_translator(path: Option<&Path>) -> Arc<dyn Translator> {
    let Some(path) = path else {
        return Arc::new(IdentityTranslator);
    };
    match CatalogTranslator::load(path) {
        Ok(catalog) => {
            info!(target: "runtime", entries = catalog.len(), "translations_loaded");
            Arc::new(catalog)
        }
        Err(e) => {
            warn!(target: "runtime", error = %format!("{e:#}"), "translations_unavailable");
            Arc::new(IdentityTranslator)
        }
    }
}

/// Everything the console needs that does not touch the terminal.
struct Console {
    editor: InputEditor,
    transcript: Transcript,
    registry: Arc<CommandRegistry>,
    level: ColorLevel,
    /// Terminal `(columns, rows)`.
    size: (u16, u16),
    input_dirty: bool,
}

impl Console {
    /// Build from configuration: replay the persisted transcript, recover the
    /// input history from it and register the built-in commands.
    fn bootstrap(args: &Args, config: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let cmdline = config.cmdline().clone();
        let hist = &config.file.history;

        let mut transcript = Transcript::new();
        let mut recovered = Vec::new();
        if cmdline.save_command_history {
            let dir = args.history_dir.clone().unwrap_or_else(|| hist.resolve_dir());
            let mut store = HistoryStore::with_limits(
                history_paths(&dir),
                config.effective_max_per_file,
                config.effective_max_backlog,
            );
            let lines = store.load();
            recovered = extract_input_history(&lines, cmdline.ignore_duplicate_lines, hist.input_history_size);
            transcript.seed(lines);
            transcript = transcript.with_store(store);
        }
        info!(
            target: "runtime",
            seeded = transcript.len(),
            history = recovered.len(),
            saving = cmdline.save_command_history,
            "session_restored"
        );

        let torrents: SharedTorrents = Arc::new(RwLock::new(TorrentList::default()));
        let mut startup_errors = Vec::new();
        if let Some(path) = &args.torrents {
            match TorrentList::load(path) {
                Ok(list) => {
                    *torrents.write().unwrap_or_else(std::sync::PoisonError::into_inner) = list;
                }
                Err(e) => {
                    warn!(target: "runtime", error = %format!("{e:#}"), "torrent_list_unavailable");
                    startup_errors.push(format!("{{!error!}}{e:#}"));
                }
            }
        }

        let history = InputHistory::new(hist.input_history_size, cmdline.ignore_duplicate_lines).with_entries(recovered);
        let translator = load_translator(args.translations.as_deref());
        let editor = InputEditor::from_config(&cmdline, history, translator);
        let registry = Arc::new(builtin_registry(cmdline, torrents));

        let mode = if args.no_color {
            ColorMode::None
        } else {
            config.file.display.colors
        };
        let mut console = Self {
            editor,
            transcript,
            registry,
            level: detect_color_level(mode, env),
            size: (80, 24),
            input_dirty: true,
        };
        console.write_lines(&startup_errors);
        console
    }

    fn columns(&self) -> usize {
        usize::from(self.size.0)
    }

    fn body_rows(&self) -> usize {
        usize::from(self.size.1.saturating_sub(1))
    }

    fn write_lines(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let cols = self.columns();
        self.transcript.set_batch(true);
        for line in lines {
            self.transcript.write(line, cols);
        }
        self.transcript.set_batch(false);
    }

    fn handle_event(&mut self, event: Event, tx: &mpsc::Sender<Event>) -> LoopControl {
        match event {
            Event::Input(InputEvent::Key(key)) => self.handle_key(key, &mut NoKeys, tx),
            Event::Input(InputEvent::Raw(codes)) => return self.handle_raw(codes, tx),
            Event::Input(InputEvent::Resize(w, h)) => {
                trace!(target: "runtime", w, h, "resize");
                self.size = (w, h);
                self.input_dirty = true;
            }
            Event::Input(InputEvent::Paste(text)) => self.handle_paste(&text),
            Event::Output(lines) => self.write_lines(&lines),
            Event::RenderRequested => self.input_dirty = true,
            Event::Command(CommandEvent::Quit) => return LoopControl::Break("command_quit"),
            Event::Shutdown => return LoopControl::Break("shutdown_event"),
        }
        LoopControl::Continue
    }

    /// Decode a chunk of raw codes key by key. Escape sequences and the
    /// continuation bytes of a character are read from the same chunk.
    fn handle_raw(&mut self, codes: Vec<i32>, tx: &mpsc::Sender<Event>) -> LoopControl {
        let mut pending = VecDeque::from(codes);
        while let Some(code) = pending.pop_front() {
            let Some(key) = decode_raw(code, &mut pending) else {
                continue;
            };
            if key == KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CTRL) {
                return LoopControl::Break("interrupt");
            }
            self.handle_key(key, &mut pending, tx);
        }
        LoopControl::Continue
    }

    fn handle_key(&mut self, key: KeyEvent, keys: &mut dyn KeySource, tx: &mpsc::Sender<Event>) {
        let outcome = self.editor.handle_key(key, keys, self.registry.as_ref());
        self.input_dirty |= outcome.dirty;
        self.write_lines(&outcome.output);
        match outcome.scroll {
            Some(Scroll::PageUp) => self.transcript.page_up(self.body_rows()),
            Some(Scroll::PageDown) => self.transcript.page_down(self.body_rows()),
            None => {}
        }
        if let Some(line) = outcome.commit {
            spawn_dispatch(self.registry.clone(), line, tx.clone());
        }
    }

    /// Pasted text is typed in. Line breaks become spaces so a paste never
    /// commits by itself.
    fn handle_paste(&mut self, text: &str) {
        debug!(target: "runtime", len = text.len(), "paste");
        for c in text.chars() {
            let c = if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c };
            if c.is_control() {
                continue;
            }
            self.editor.apply(EditAction::Insert(c), &mut NoKeys, self.registry.as_ref());
        }
        self.input_dirty = true;
    }

    /// Queue a full frame if anything changed since the last one.
    fn frame(&mut self) -> Option<Writer> {
        let redraw = self.transcript.take_redraw();
        if !redraw && !std::mem::take(&mut self.input_dirty) {
            return None;
        }
        self.input_dirty = false;
        let buffer = self.editor.buffer();
        let input = InputWindow::compute(buffer.chars(), buffer.cursor(), self.columns());
        let rows = self.transcript.visible(self.body_rows());
        let mut writer = Writer::new();
        compose_frame(&mut writer, &rows, &input, self.size.1, self.level);
        Some(writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Break(&'static str),
}

struct ConsoleRuntime {
    console: Console,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
    input_shutdown: Option<AsyncInputShutdown>,
    terminal: TerminalGuard,
}

impl ConsoleRuntime {
    async fn run(&mut self) -> Result<()> {
        self.draw();
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        let mut reason = "channel_closed";
        while let Some(event) = self.rx.recv().await {
            let Some(tx) = self.tx.as_ref() else {
                break;
            };
            if let LoopControl::Break(why) = self.console.handle_event(event, tx) {
                reason = why;
                break;
            }
            self.draw();
        }

        self.rx.close();
        self.finalize_shutdown(reason).await;
        self.terminal.leave()
    }

    fn draw(&mut self) {
        let Some(writer) = self.console.frame() else {
            return;
        };
        if let Err(e) = writer.flush() {
            error!(target: "runtime", ?e, "render_error");
        }
    }

    async fn finalize_shutdown(&mut self, reason: &'static str) {
        info!(target: "runtime.shutdown", reason, "shutdown_begin");
        drop(self.tx.take());
        if let Some(shutdown) = self.input_shutdown.take() {
            shutdown.signal();
        }
        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(SOURCE_JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => trace!(target: "runtime.shutdown", reason, "event_source_task_stopped"),
                Ok(Err(err)) if err.is_cancelled() => {
                    trace!(target: "runtime.shutdown", reason, "event_source_task_cancelled")
                }
                Ok(Err(err)) => error!(target: "runtime.shutdown", reason, ?err, "event_source_task_error"),
                Err(_) => warn!(target: "runtime.shutdown", reason, "event_source_task_timeout"),
            }
        }
        info!(
            target: "runtime.shutdown",
            reason,
            keypresses = KEYPRESS_TOTAL.load(Ordering::Relaxed),
            send_failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
            "shutdown_complete"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let config = load_from(args.config.clone())?;
    let mut console = Console::bootstrap(&args, &config, |k| std::env::var(k).ok());

    let terminal = TerminalGuard::enter(WINDOW_TITLE)?;
    console.size = terminal.size()?;

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut sources = EventSourceRegistry::new();
    let input_shutdown = if args.raw_input {
        let (input, shutdown) = RawInputSource::new(std::io::stdin());
        sources.register(input);
        shutdown
    } else {
        let (input, shutdown) = TerminalInputSource::new();
        sources.register(input);
        shutdown
    };
    let source_handles = sources.spawn_all(&tx);

    let mut runtime = ConsoleRuntime {
        console,
        rx,
        tx: Some(tx),
        source_handles,
        input_shutdown: Some(input_shutdown),
        terminal,
    };
    runtime.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn args_in(dir: &Path) -> Args {
        Args {
            history_dir: Some(dir.to_path_buf()),
            ..Args::default()
        }
    }

    fn type_line(console: &mut Console, tx: &mpsc::Sender<Event>, text: &str) {
        for c in text.chars() {
            console.handle_event(Event::Input(InputEvent::Key(KeyCode::Char(c).into())), tx);
        }
    }

    fn enter(console: &mut Console, tx: &mpsc::Sender<Event>) {
        console.handle_event(Event::Input(InputEvent::Key(KeyCode::Enter.into())), tx);
    }

    #[test]
    fn previous_session_is_replayed() {
        let dir = tempfile::tempdir().unwrap();
        let paths = history_paths(dir.path());
        std::fs::write(
            &paths[0],
            "{!yellow,black,bold!}>>>{!input!} info\nsome output\n{!yellow,black,bold!}>>>{!input!} help\n",
        )
        .unwrap();
        let console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        assert_eq!(console.transcript.len(), 3);
        assert_eq!(console.editor.history().entries(), &["info".to_string(), "help".to_string()]);
        assert_eq!(console.level, ColorLevel::Mono);
    }

    #[test]
    fn saving_disabled_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = history_paths(dir.path());
        std::fs::write(&paths[0], "{!yellow,black,bold!}>>>{!input!} info\n").unwrap();
        let mut config = Config::default();
        config.file.cmdline.save_command_history = false;
        let console = Console::bootstrap(&args_in(dir.path()), &config, no_env);
        assert!(console.transcript.is_empty());
        assert!(console.editor.history().is_empty());
        assert!(console.transcript.store().is_none());
    }

    #[test]
    fn missing_torrent_list_is_reported_in_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            torrents: Some(dir.path().join("absent.tsv")),
            ..args_in(dir.path())
        };
        let console = Console::bootstrap(&args, &Config::default(), no_env);
        assert!(console.transcript.lines().any(|l| l.starts_with("{!error!}reading ")));
    }

    #[tokio::test]
    async fn committed_line_is_echoed_persisted_and_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, mut rx) = mpsc::channel(8);

        type_line(&mut console, &tx, "config torrents_per_tab_press");
        enter(&mut console, &tx);
        assert_eq!(
            console.transcript.lines().last(),
            Some("{!yellow,black,bold!}>>>{!input!} config torrents_per_tab_press")
        );
        let persisted = std::fs::read_to_string(&history_paths(dir.path())[0]).unwrap();
        assert!(persisted.ends_with(">>>{!input!} config torrents_per_tab_press\n"));

        let event = rx.recv().await.unwrap();
        assert_eq!(console.handle_event(event, &tx), LoopControl::Continue);
        assert_eq!(
            console.transcript.lines().last(),
            Some("{!info!}torrents_per_tab_press{!input!} = 15")
        );
    }

    #[tokio::test]
    async fn quit_command_breaks_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, mut rx) = mpsc::channel(8);
        type_line(&mut console, &tx, "exit");
        enter(&mut console, &tx);
        let event = rx.recv().await.unwrap();
        assert_eq!(console.handle_event(event, &tx), LoopControl::Break("command_quit"));
    }

    #[test]
    fn paste_types_text_without_committing() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, _rx) = mpsc::channel(8);
        console.handle_event(Event::Input(InputEvent::Paste("info\nab\u{7}c".into())), &tx);
        assert_eq!(console.editor.buffer().text(), "info abc");
    }

    #[test]
    fn frame_only_when_something_changed() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, _rx) = mpsc::channel(8);
        assert!(console.frame().is_some());
        assert!(console.frame().is_none());
        console.handle_event(Event::Input(InputEvent::Resize(100, 30)), &tx);
        assert!(console.frame().is_some());
        console.handle_event(Event::Input(InputEvent::Key(KeyCode::Left.into())), &tx);
        assert!(console.frame().is_none());
    }

    fn raw(console: &mut Console, tx: &mpsc::Sender<Event>, bytes: &[u8]) -> LoopControl {
        let codes = bytes.iter().map(|b| i32::from(*b)).collect();
        console.handle_event(Event::Input(InputEvent::Raw(codes)), tx)
    }

    #[test]
    fn raw_bytes_assemble_multi_byte_characters() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, _rx) = mpsc::channel(8);
        raw(&mut console, &tx, "info é日".as_bytes());
        assert_eq!(console.editor.buffer().text(), "info é日");
        assert_eq!(console.editor.buffer().cursor(), 7);
    }

    #[test]
    fn raw_escape_sequences_edit_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, _rx) = mpsc::channel(8);
        // two left arrows, then Delete
        raw(&mut console, &tx, b"info abc\x1b[D\x1b[D\x1b[3~");
        assert_eq!(console.editor.buffer().text(), "info ac");
        // alt-backspace removes the word before the cursor
        raw(&mut console, &tx, b"\x1b[F\x1b\x7f");
        assert_eq!(console.editor.buffer().text(), "info ");
    }

    #[tokio::test]
    async fn raw_enter_dispatches_and_ctrl_c_interrupts() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Console::bootstrap(&args_in(dir.path()), &Config::default(), no_env);
        let (tx, mut rx) = mpsc::channel(8);
        assert_eq!(raw(&mut console, &tx, b"exit\r"), LoopControl::Continue);
        let event = rx.recv().await.unwrap();
        assert_eq!(console.handle_event(event, &tx), LoopControl::Break("command_quit"));
        assert_eq!(raw(&mut console, &tx, b"in\x03fo"), LoopControl::Break("interrupt"));
    }
}
