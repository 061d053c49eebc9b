//! Text primitives for the console: colour markup, display width, wrapping
//! and the small line-editing helpers shared by the editor and completers.

pub mod escape;
pub mod markup;
pub mod width;
pub mod word;
pub mod wrap;

pub use markup::{MarkupError, Segment, Style, remove_formatting};
pub use width::{display_width, str_width};
pub use wrap::{WrapOptions, wrap, wrap_with};
