//! Input editor: the command line state machine.
//!
//! Owns the line buffer, the input history and the tab streak. It never
//! draws and never dispatches; every key returns a [`KeyOutcome`] telling
//! the host what to append to the transcript, which line (if any) was
//! committed and whether the transcript should scroll.
//!
//! Tab streak: the count of consecutive Tab presses. Any other key zeroes
//! it, and so does a completion listing that reached its last page.
//!
//! Multi-byte characters arrive as a lead byte; the continuation bytes are
//! read synchronously from the [`KeySource`] until a code point decodes or
//! the source runs dry. Nothing is inserted for an undecodable sequence.

use std::sync::Arc;

use core_config::CmdlineConfig;
use core_events::{KeyEvent, KeySource};
use core_state::{InputHistory, LineBuffer};
use tracing::{debug, trace};

use crate::completion::{CompletionEngine, CompletionSettings, CompletionSource};
use crate::i18n::Translator;
use crate::{EditAction, translate_key};

/// Transcript echo prefix for a committed line.
pub const INPUT_ECHO_PREFIX: &str = "{!yellow,black,bold!}>>>{!input!} ";

const MAX_UTF8_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    PageUp,
    PageDown,
}

/// Effect of one key on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The input line changed and needs redrawing.
    pub dirty: bool,
    /// Transcript lines, in the order produced.
    pub output: Vec<String>,
    /// Line to hand to the dispatcher.
    pub commit: Option<String>,
    pub scroll: Option<Scroll>,
}

impl KeyOutcome {
    fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    fn clean() -> Self {
        Self::default()
    }
}

pub struct InputEditor {
    buffer: LineBuffer,
    history: InputHistory,
    completion: CompletionEngine,
    tab_streak: usize,
}

impl InputEditor {
    pub fn new(history: InputHistory, completion: CompletionEngine) -> Self {
        Self {
            buffer: LineBuffer::new(),
            history,
            completion,
            tab_streak: 0,
        }
    }

    /// Editor configured from the `[cmdline]` options.
    pub fn from_config(cfg: &CmdlineConfig, history: InputHistory, translator: Arc<dyn Translator>) -> Self {
        Self::new(history, CompletionEngine::new(CompletionSettings::from(cfg), translator))
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    pub fn tab_streak(&self) -> usize {
        self.tab_streak
    }

    pub fn handle_key(&mut self, key: KeyEvent, keys: &mut dyn KeySource, source: &dyn CompletionSource) -> KeyOutcome {
        match translate_key(&key) {
            Some(action) => self.apply(action, keys, source),
            None => {
                trace!(target: "editor.input", "key_ignored");
                KeyOutcome::clean()
            }
        }
    }

    pub fn apply(&mut self, action: EditAction, keys: &mut dyn KeySource, source: &dyn CompletionSource) -> KeyOutcome {
        if action != EditAction::Complete {
            self.tab_streak = 0;
        }
        match action {
            EditAction::Insert(c) => {
                self.buffer.insert(c);
                KeyOutcome::dirty()
            }
            EditAction::InsertByte(lead) => match assemble_char(lead, keys) {
                Some(c) => {
                    self.buffer.insert(c);
                    KeyOutcome::dirty()
                }
                None => KeyOutcome::clean(),
            },
            EditAction::Backspace => self.edited(LineBuffer::backspace),
            EditAction::Delete => self.edited(LineBuffer::delete),
            EditAction::DeleteWordBack => {
                self.buffer.delete_word_back();
                KeyOutcome::dirty()
            }
            EditAction::Left => self.moved(LineBuffer::move_left),
            EditAction::Right => self.moved(LineBuffer::move_right),
            EditAction::Home => self.moved(LineBuffer::home),
            EditAction::End => self.moved(LineBuffer::end),
            EditAction::HistoryPrev => {
                let current = self.buffer.text();
                match self.history.prev(&current) {
                    Some(entry) => {
                        self.buffer.set(entry);
                        KeyOutcome::dirty()
                    }
                    None => KeyOutcome::clean(),
                }
            }
            EditAction::HistoryNext => match self.history.next() {
                Some(entry) => {
                    self.buffer.set(entry);
                    KeyOutcome::dirty()
                }
                None => KeyOutcome::clean(),
            },
            EditAction::Commit => self.commit(),
            EditAction::Complete => self.complete(source),
            EditAction::PageUp => KeyOutcome {
                scroll: Some(Scroll::PageUp),
                ..KeyOutcome::default()
            },
            EditAction::PageDown => KeyOutcome {
                scroll: Some(Scroll::PageDown),
                ..KeyOutcome::default()
            },
        }
    }

    fn edited(&mut self, op: fn(&mut LineBuffer) -> bool) -> KeyOutcome {
        if op(&mut self.buffer) { KeyOutcome::dirty() } else { KeyOutcome::clean() }
    }

    fn moved(&mut self, op: fn(&mut LineBuffer)) -> KeyOutcome {
        let before = self.buffer.cursor();
        op(&mut self.buffer);
        if self.buffer.cursor() == before {
            KeyOutcome::clean()
        } else {
            KeyOutcome::dirty()
        }
    }

    fn commit(&mut self) -> KeyOutcome {
        if self.buffer.is_empty() {
            return KeyOutcome::clean();
        }
        self.buffer.strip_line_continuation();
        if self.buffer.is_empty() {
            trace!(target: "editor.input", "bare_continuation_dropped");
            return KeyOutcome::dirty();
        }
        let line = self.buffer.text();
        self.history.push(&line);
        self.buffer.clear();
        debug!(target: "editor.input", len = line.chars().count(), history_len = self.history.len(), "line_committed");
        KeyOutcome {
            dirty: true,
            output: vec![format!("{INPUT_ECHO_PREFIX}{line}")],
            commit: Some(line),
            scroll: None,
        }
    }

    fn complete(&mut self, source: &dyn CompletionSource) -> KeyOutcome {
        let at_word_end = self.buffer.cursor() == self.buffer.len() || self.buffer.char_at_cursor() == Some(' ');
        if !at_word_end {
            return KeyOutcome::clean();
        }
        self.tab_streak += 1;
        let text = self.buffer.text();
        let done = self.completion.complete(&text, self.buffer.cursor(), self.tab_streak, source);
        if done.reset_streak {
            self.tab_streak = 0;
        }
        let dirty = done.line != text || done.cursor != self.buffer.cursor();
        self.buffer.set_with_cursor(&done.line, done.cursor);
        KeyOutcome {
            dirty,
            output: done.output,
            commit: None,
            scroll: None,
        }
    }
}

/// Decode a character starting with `lead`, pulling continuation bytes from
/// `keys`. `None` when the sequence is invalid or the source ran dry.
fn assemble_char(lead: u8, keys: &mut dyn KeySource) -> Option<char> {
    let mut bytes = vec![lead];
    loop {
        match std::str::from_utf8(&bytes) {
            Ok(s) => return s.chars().next(),
            Err(e) if e.error_len().is_some() => {
                debug!(target: "editor.input", bytes = bytes.len(), "undecodable_input_dropped");
                return None;
            }
            Err(_) if bytes.len() >= MAX_UTF8_LEN => return None,
            Err(_) => {}
        }
        let byte = keys.read_key().and_then(|code| u8::try_from(code).ok());
        match byte {
            Some(b) => bytes.push(b),
            None => {
                debug!(target: "editor.input", bytes = bytes.len(), "incomplete_input_dropped");
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, NoKeys};
    use std::collections::VecDeque;

    struct NoCommands;

    impl CompletionSource for NoCommands {
        fn has_command(&self, _name: &str) -> bool {
            false
        }
        fn command_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn complete(&self, _command: &str, _partial: &str) -> Vec<String> {
            Vec::new()
        }
    }

    fn editor() -> InputEditor {
        InputEditor::new(InputHistory::default(), CompletionEngine::default())
    }

    fn press(ed: &mut InputEditor, code: KeyCode) -> KeyOutcome {
        ed.handle_key(code.into(), &mut NoKeys, &NoCommands)
    }

    #[test]
    fn utf8_lead_byte_reads_continuations() {
        let mut ed = editor();
        let mut rest: VecDeque<i32> = VecDeque::from([0xa9]);
        ed.handle_key(KeyCode::Byte(0xc3).into(), &mut rest, &NoCommands);
        assert_eq!(ed.buffer().text(), "é");
        assert_eq!(ed.buffer().cursor(), 1);
    }

    #[test]
    fn truncated_sequence_inserts_nothing() {
        let mut ed = editor();
        let out = press(&mut ed, KeyCode::Byte(0xe6));
        assert!(!out.dirty);
        assert!(ed.buffer().is_empty());
    }

    #[test]
    fn invalid_continuation_inserts_nothing() {
        let mut ed = editor();
        let mut rest: VecDeque<i32> = VecDeque::from([0x41]);
        ed.handle_key(KeyCode::Byte(0xc3).into(), &mut rest, &NoCommands);
        assert!(ed.buffer().is_empty());
    }

    #[test]
    fn enter_on_empty_is_noop() {
        let mut ed = editor();
        assert_eq!(press(&mut ed, KeyCode::Enter), KeyOutcome::default());
    }

    #[test]
    fn enter_strips_continuation_and_echoes() {
        let mut ed = editor();
        for c in "info\\".chars() {
            press(&mut ed, KeyCode::Char(c));
        }
        let out = press(&mut ed, KeyCode::Enter);
        assert_eq!(out.commit.as_deref(), Some("info"));
        assert_eq!(out.output, vec!["{!yellow,black,bold!}>>>{!input!} info"]);
        assert!(ed.buffer().is_empty());
        assert_eq!(ed.history().index(), ed.history().len());
    }

    #[test]
    fn bare_continuation_commits_nothing() {
        let mut ed = editor();
        press(&mut ed, KeyCode::Char('\\'));
        let out = press(&mut ed, KeyCode::Enter);
        assert!(out.dirty);
        assert_eq!(out.commit, None);
        assert!(out.output.is_empty());
        assert!(ed.buffer().is_empty());
        assert!(ed.history().is_empty());
    }

    #[test]
    fn non_tab_key_resets_streak() {
        let mut ed = editor();
        press(&mut ed, KeyCode::Tab);
        assert_eq!(ed.tab_streak(), 1);
        press(&mut ed, KeyCode::Char('a'));
        assert_eq!(ed.tab_streak(), 0);
    }

    #[test]
    fn tab_mid_word_is_ignored() {
        let mut ed = editor();
        for c in "abc".chars() {
            press(&mut ed, KeyCode::Char(c));
        }
        press(&mut ed, KeyCode::Left);
        press(&mut ed, KeyCode::Tab);
        assert_eq!(ed.tab_streak(), 0);
    }

    #[test]
    fn page_keys_request_scroll() {
        let mut ed = editor();
        assert_eq!(press(&mut ed, KeyCode::PageUp).scroll, Some(Scroll::PageUp));
        assert_eq!(press(&mut ed, KeyCode::PageDown).scroll, Some(Scroll::PageDown));
    }
}
