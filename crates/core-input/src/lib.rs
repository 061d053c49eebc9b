//! Key input for the console: raw integer code decoding for curses-style
//! hosts, the raw byte-stream source feeding it, and the async crossterm
//! input service.

mod async_service;
mod key_map;
pub mod raw;
mod raw_service;

pub use async_service::{AsyncInputShutdown, TerminalInputSource};
pub use raw::decode_raw;
pub use raw_service::RawInputSource;

use core_events::KeyModifiers;
use crossterm::event::KeyModifiers as CMods;

pub(crate) fn map_mods(m: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_modifier() {
        assert_eq!(map_mods(CMods::NONE), KeyModifiers::empty());
        assert_eq!(
            map_mods(CMods::CONTROL | CMods::ALT | CMods::SHIFT),
            KeyModifiers::CTRL | KeyModifiers::ALT | KeyModifiers::SHIFT
        );
        // modifiers the editor ignores are dropped
        assert_eq!(map_mods(CMods::SUPER), KeyModifiers::empty());
    }
}
