//! Decoding of raw integer key codes as delivered by a curses-style
//! `getch()` host.
//!
//! An ESC (27) is read together with the following code: if nothing follows
//! it is a plain Escape, `[` or `O` start a terminal escape sequence (arrows,
//! Home/End, Delete, paging), anything else makes an Alt chord of the second
//! key. Bytes above 127 start a multi-byte UTF-8 character and are surfaced
//! as [`KeyCode::Byte`] for the editor to assemble.

use core_events::{KeyCode, KeyEvent, KeyModifiers, KeySource};

pub const KEY_CTRL_C: i32 = 3;
pub const KEY_TAB: i32 = 9;
pub const KEY_ENTER2: i32 = 10;
pub const KEY_CR: i32 = 13;
pub const KEY_ESC: i32 = 27;
pub const KEY_BACKSPACE2: i32 = 127;
pub const KEY_DOWN: i32 = 258;
pub const KEY_UP: i32 = 259;
pub const KEY_LEFT: i32 = 260;
pub const KEY_RIGHT: i32 = 261;
pub const KEY_HOME: i32 = 262;
pub const KEY_BACKSPACE: i32 = 263;
pub const KEY_DC: i32 = 330;
pub const KEY_NPAGE: i32 = 338;
pub const KEY_PPAGE: i32 = 339;
pub const KEY_ENTER: i32 = 343;
pub const KEY_END: i32 = 360;

/// "no input" as returned by a non-blocking `getch()`.
pub const KEY_NONE: i32 = -1;

const CSI: i32 = b'[' as i32;
const SS3: i32 = b'O' as i32;

/// Map a single code without ESC handling.
pub fn decode_code(code: i32) -> Option<KeyCode> {
    let key = match code {
        KEY_TAB => KeyCode::Tab,
        KEY_ENTER | KEY_ENTER2 | KEY_CR => KeyCode::Enter,
        KEY_BACKSPACE | KEY_BACKSPACE2 => KeyCode::Backspace,
        KEY_DC => KeyCode::Delete,
        KEY_UP => KeyCode::Up,
        KEY_DOWN => KeyCode::Down,
        KEY_LEFT => KeyCode::Left,
        KEY_RIGHT => KeyCode::Right,
        KEY_HOME => KeyCode::Home,
        KEY_END => KeyCode::End,
        KEY_PPAGE => KeyCode::PageUp,
        KEY_NPAGE => KeyCode::PageDown,
        KEY_ESC => KeyCode::Esc,
        32..=126 => KeyCode::Char(char::from(code as u8)),
        128..=255 => KeyCode::Byte(code as u8),
        _ => return None,
    };
    Some(key)
}

/// Decode `code`, pulling the rest of an ESC sequence from `src`.
/// Returns `None` for codes the editor has no use for.
pub fn decode_raw(code: i32, src: &mut dyn KeySource) -> Option<KeyEvent> {
    if code == KEY_CTRL_C {
        return Some(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CTRL));
    }
    if code != KEY_ESC {
        return decode_code(code).map(KeyEvent::plain);
    }
    match src.read_key() {
        None | Some(KEY_NONE) => Some(KeyEvent::plain(KeyCode::Esc)),
        Some(CSI | SS3) => {
            let key = decode_sequence(src);
            tracing::trace!(target: "input.event", kind = "escape_sequence", mapped = key.is_some());
            key.map(KeyEvent::plain)
        }
        Some(next) => {
            let key = decode_code(next);
            tracing::trace!(target: "input.event", kind = "alt_chord", mapped = key.is_some());
            key.map(|k| KeyEvent::new(k, KeyModifiers::ALT))
        }
    }
}

/// Body of a `CSI`/`SS3` sequence: parameter bytes up to the final byte.
/// The whole sequence is consumed even when it maps to nothing.
fn decode_sequence(src: &mut dyn KeySource) -> Option<KeyCode> {
    let mut params = String::new();
    let last = loop {
        let byte = src.read_key().and_then(|c| u8::try_from(c).ok())?;
        match byte {
            0x30..=0x3f => params.push(char::from(byte)),
            0x40..=0x7e => break byte,
            _ => return None,
        }
    };
    let key = match last {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'~' => match params.split(';').next()?.parse::<u32>().ok()? {
            1 | 7 => KeyCode::Home,
            4 | 8 => KeyCode::End,
            3 => KeyCode::Delete,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return None,
        },
        _ => return None,
    };
    Some(key)
}
