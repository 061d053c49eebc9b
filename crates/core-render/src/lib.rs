//! Host-side rendering: the transcript above the input line, the input line
//! window, markup to terminal style mapping and the crossterm writer.
//!
//! Exposed components:
//! - `transcript`: capped scrollback of markup lines with a scroll offset,
//!   optional persistence through `core_history::HistoryStore` and a batch
//!   mode that suppresses redraw requests.
//! - `input_line`: horizontal window over the input buffer that keeps the
//!   cursor visible, measuring wide characters as two columns.
//! - `style`: `core_text` styles to crossterm `ContentStyle`, plus colour
//!   level detection from the configured mode and the environment.
//! - `writer`: queued terminal commands and frame composition.
//! - `terminal`: raw mode / alternate screen guard.
//!
//! Frame flow: the host asks the transcript for `rows - 1` visible lines,
//! computes the input window for the editor buffer and hands both to
//! `compose_frame`, then flushes the writer once.

pub mod input_line;
pub mod style;
pub mod terminal;
pub mod transcript;
pub mod writer;

pub use input_line::InputWindow;
pub use style::{content_style, detect_color_level};
pub use terminal::TerminalGuard;
pub use transcript::{LINES_BUFFER_SIZE, Transcript};
pub use writer::{Writer, compose_frame};
