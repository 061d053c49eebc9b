//! Terminal writer and screen composition.
//!
//! The writer queues primitive terminal commands and emits them in one
//! flush. Consecutive prints with the same style are coalesced into one
//! command, so a transcript line costs one `Print` per colour run.
//!
//! Design invariants:
//! * Commands preserve ordering; nothing is emitted before `flush`.
//! * All positions are absolute with a (0,0) origin; callers keep them in
//!   bounds.
//! * The writer owns no global state; it is a short-lived object per frame.

use std::io::Write;

use anyhow::Result;
use core_text::markup::{self, ColorLevel, Palette};
use crossterm::{
    cursor::{MoveTo, Show},
    queue,
    style::{Print, PrintStyledContent, StyledContent},
    terminal::{Clear, ClearType},
};
use tracing::error;

use crate::input_line::InputWindow;
use crate::style::content_style;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MoveTo(u16, u16),
    ClearLine,
    Print(String),
    Styled(crossterm::style::ContentStyle, String),
    ShowCursor,
}

#[derive(Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub fn clear_line(&mut self) {
        self.cmds.push(Command::ClearLine);
    }

    pub fn show_cursor(&mut self) {
        self.cmds.push(Command::ShowCursor);
    }

    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if s.is_empty() {
            return;
        }
        if let Some(Command::Print(prev)) = self.cmds.last_mut() {
            prev.push_str(&s);
        } else {
            self.cmds.push(Command::Print(s));
        }
    }

    pub fn print_styled<S: Into<String>>(&mut self, style: crossterm::style::ContentStyle, s: S) {
        let s: String = s.into();
        if s.is_empty() {
            return;
        }
        match self.cmds.last_mut() {
            Some(Command::Styled(prev_style, prev)) if *prev_style == style => prev.push_str(&s),
            _ => self.cmds.push(Command::Styled(style, s)),
        }
    }

    /// Print one markup line. Malformed markup is logged and the line left
    /// blank.
    pub fn print_markup(&mut self, line: &str, level: ColorLevel) {
        match markup::parse_with(line, &Palette::new(level)) {
            Ok(segments) => {
                for seg in segments {
                    self.print_styled(content_style(&seg.style, level), seg.text);
                }
            }
            Err(e) => {
                error!(target: "render.transcript", line, error = %e, "cannot_add_bad_colour_string");
            }
        }
    }

    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearLine => queue!(out, Clear(ClearType::CurrentLine))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::Styled(style, s) => queue!(out, PrintStyledContent(StyledContent::new(style, s)))?,
                Command::ShowCursor => queue!(out, Show)?,
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn flush(self) -> Result<()> {
        self.flush_to(&mut std::io::stdout())
    }
}

/// Queue a full frame: transcript rows on top, input line on the last row,
/// hardware cursor placed inside the input line.
pub fn compose_frame(w: &mut Writer, rows: &[&str], input: &InputWindow, height: u16, level: ColorLevel) {
    let body = height.saturating_sub(1);
    for (y, line) in rows.iter().take(usize::from(body)).enumerate() {
        let y = u16::try_from(y).unwrap_or(u16::MAX);
        w.move_to(0, y);
        w.clear_line();
        w.print_markup(line, level);
    }
    let input_row = height.saturating_sub(1);
    w.move_to(0, input_row);
    w.clear_line();
    w.print(input.text.clone());
    w.move_to(u16::try_from(input.cursor_col).unwrap_or(u16::MAX), input_row);
    w.show_cursor();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::style::ContentStyle;

    #[test]
    fn same_style_prints_coalesce() {
        let mut w = Writer::new();
        w.move_to(0, 0);
        w.print("a");
        w.print("b");
        w.print_styled(ContentStyle::new(), "c");
        w.print_styled(ContentStyle::new(), "d");
        assert_eq!(
            w.commands(),
            &[
                Command::MoveTo(0, 0),
                Command::Print("ab".into()),
                Command::Styled(ContentStyle::new(), "cd".into())
            ]
        );
    }

    #[test]
    fn markup_line_prints_one_command_per_run() {
        let mut w = Writer::new();
        w.print_markup("{!info!}a{!error!}b", ColorLevel::Extended);
        assert_eq!(w.commands().len(), 2);
    }

    #[test]
    fn bad_markup_prints_nothing() {
        let mut w = Writer::new();
        w.print_markup("{!info", ColorLevel::Extended);
        assert!(w.commands().is_empty());
    }

    #[test]
    fn frame_places_cursor_on_input_row() {
        let mut w = Writer::new();
        let input = InputWindow {
            text: "info".into(),
            cursor_col: 4,
        };
        compose_frame(&mut w, &["a", "b"], &input, 3, ColorLevel::Mono);
        let cmds = w.commands();
        assert_eq!(cmds[cmds.len() - 2], Command::MoveTo(4, 2));
        assert_eq!(cmds.last(), Some(&Command::ShowCursor));
    }

    #[test]
    fn flush_writes_escape_sequences() {
        let mut w = Writer::new();
        w.move_to(0, 0);
        w.print("hi");
        let mut buf = Vec::new();
        w.flush_to(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.ends_with("hi"));
        assert!(s.contains('\x1b'));
    }
}
