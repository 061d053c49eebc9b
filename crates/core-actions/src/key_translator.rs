//! Key -> `EditAction` translation.
//!
//! Stateless: every key maps to at most one action. Keys the line editor
//! has no use for (Esc, Ctrl chords other than the ones listed) map to
//! `None` and leave the editor untouched.

use core_events::{KeyCode, KeyEvent, KeyModifiers};

use crate::EditAction;

pub fn translate_key(key: &KeyEvent) -> Option<EditAction> {
    let alt = key.mods.contains(KeyModifiers::ALT);
    let ctrl = key.mods.contains(KeyModifiers::CTRL);
    let action = match key.code {
        KeyCode::Backspace if alt => EditAction::DeleteWordBack,
        KeyCode::Char('a') if ctrl => EditAction::Home,
        KeyCode::Char('e') if ctrl => EditAction::End,
        KeyCode::Char(_) | KeyCode::Byte(_) if alt || ctrl => return None,
        KeyCode::Char(c) => EditAction::Insert(c),
        KeyCode::Byte(b) => EditAction::InsertByte(b),
        KeyCode::Enter => EditAction::Commit,
        KeyCode::Tab => EditAction::Complete,
        KeyCode::Backspace => EditAction::Backspace,
        KeyCode::Delete => EditAction::Delete,
        KeyCode::Left => EditAction::Left,
        KeyCode::Right => EditAction::Right,
        KeyCode::Home => EditAction::Home,
        KeyCode::End => EditAction::End,
        KeyCode::Up => EditAction::HistoryPrev,
        KeyCode::Down => EditAction::HistoryNext,
        KeyCode::PageUp => EditAction::PageUp,
        KeyCode::PageDown => EditAction::PageDown,
        KeyCode::Esc => return None,
    };
    Some(action)
}
