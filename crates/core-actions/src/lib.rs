//! Command line behaviour: key translation, the input editor state
//! machine, completion, command dispatch and the helpers they share.

pub mod completers;
pub mod completion;
pub mod dispatcher;
pub mod editor;
pub mod help_format;
pub mod i18n;
pub mod key_translator;

pub use completion::{Completion, CompletionEngine, CompletionSettings, CompletionSource, complete_line};
pub use dispatcher::{Command, CommandOutput, CommandRegistry, DispatchError, split_args};
pub use editor::{InputEditor, KeyOutcome, Scroll};
pub use help_format::colorize_help;
pub use i18n::{CatalogTranslator, IdentityTranslator, Translator};
pub use key_translator::translate_key;

/// One editing step of the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Insert(char),
    /// Lead byte of a multi-byte character still to be assembled.
    InsertByte(u8),
    Backspace,
    DeleteWordBack,
    Delete,
    Left,
    Right,
    Home,
    End,
    HistoryPrev,
    HistoryNext,
    Commit,
    Complete,
    PageUp,
    PageDown,
}
