use core_events::{KeyCode, KeyEvent};
use crossterm::event::{KeyCode as CKeyCode, KeyEvent as CKeyEvent};

use crate::map_mods;

/// Map a crossterm key event onto the editor's key model.
///
/// Returns `None` for keys the line editor does not handle (function keys,
/// media keys, lock keys).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(&event.code)?;
    Some(KeyEvent::new(code, map_mods(event.modifiers)))
}

pub(crate) fn map_key_code(code: &CKeyCode) -> Option<KeyCode> {
    let key = match code {
        CKeyCode::Char(c) => KeyCode::Char(*c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyModifiers;
    use crossterm::event::KeyModifiers as CKeyModifiers;

    #[test]
    fn maps_basic_char() {
        let ev = CKeyEvent::new(CKeyCode::Char('a'), CKeyModifiers::NONE);
        assert_eq!(map_key_event(&ev), Some(KeyEvent::plain(KeyCode::Char('a'))));
    }

    #[test]
    fn maps_alt_backspace() {
        let ev = CKeyEvent::new(CKeyCode::Backspace, CKeyModifiers::ALT);
        let key = map_key_event(&ev).expect("alt-backspace should map");
        assert_eq!(key.code, KeyCode::Backspace);
        assert!(key.mods.contains(KeyModifiers::ALT));
    }

    #[test]
    fn unsupported_keys_return_none() {
        let ev = CKeyEvent::new(CKeyCode::F(5), CKeyModifiers::NONE);
        assert!(map_key_event(&ev).is_none());
        let ev = CKeyEvent::new(CKeyCode::CapsLock, CKeyModifiers::NONE);
        assert!(map_key_event(&ev).is_none());
    }
}
