//! Markup styles to crossterm styles, and colour level detection.
//!
//! Basic colours map to the dark ANSI set (what a curses colour pair shows),
//! the extended ones to fixed 256-colour indices. `standout` has no
//! crossterm counterpart and renders as reverse video.

use core_config::ColorMode;
use core_text::markup::{Attr, Color, ColorLevel, Style};
use crossterm::style::{Attribute, Attributes, Color as TermColor, ContentStyle};
use tracing::debug;

pub const GREY_INDEX: u8 = 241;
pub const WHITE_GREY_INDEX: u8 = 249;
pub const MAGENTA_DARK_INDEX: u8 = 99;

pub fn term_color(c: Color) -> TermColor {
    match c {
        Color::Black => TermColor::Black,
        Color::Blue => TermColor::DarkBlue,
        Color::Cyan => TermColor::DarkCyan,
        Color::Green => TermColor::DarkGreen,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Red => TermColor::DarkRed,
        Color::White => TermColor::Grey,
        Color::Yellow => TermColor::DarkYellow,
        Color::Grey => TermColor::AnsiValue(GREY_INDEX),
        Color::WhiteGrey => TermColor::AnsiValue(WHITE_GREY_INDEX),
        Color::MagentaDark => TermColor::AnsiValue(MAGENTA_DARK_INDEX),
    }
}

pub fn term_attributes(attrs: Attr) -> Attributes {
    let mut out = Attributes::default();
    for (flag, attr) in [
        (Attr::BLINK, Attribute::SlowBlink),
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::REVERSE, Attribute::Reverse),
        (Attr::STANDOUT, Attribute::Reverse),
        (Attr::UNDERLINE, Attribute::Underlined),
    ] {
        if attrs.contains(flag) {
            out.set(attr);
        }
    }
    out
}

/// Crossterm style for a segment. At [`ColorLevel::Mono`] only attributes
/// are kept so the terminal's own colours show through.
pub fn content_style(style: &Style, level: ColorLevel) -> ContentStyle {
    let mut out = ContentStyle::new();
    if level != ColorLevel::Mono {
        out.foreground_color = Some(term_color(style.fg));
        out.background_color = Some(term_color(style.bg));
    }
    out.attributes = term_attributes(style.attrs);
    out
}

/// Resolve the configured colour mode against the environment.
///
/// `auto` honours `NO_COLOR`, then treats `COLORTERM=truecolor|24bit` or a
/// `TERM` naming 256 colours as extended; `dumb` or a missing `TERM` is mono.
pub fn detect_color_level(mode: ColorMode, env: impl Fn(&str) -> Option<String>) -> ColorLevel {
    let level = match mode {
        ColorMode::None => ColorLevel::Mono,
        ColorMode::Basic => ColorLevel::Basic,
        ColorMode::Extended => ColorLevel::Extended,
        ColorMode::Auto => {
            let term = env("TERM").unwrap_or_default();
            let colorterm = env("COLORTERM").unwrap_or_default();
            if env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                ColorLevel::Mono
            } else if matches!(colorterm.as_str(), "truecolor" | "24bit") || term.contains("256color") {
                ColorLevel::Extended
            } else if term.is_empty() || term == "dumb" {
                ColorLevel::Mono
            } else {
                ColorLevel::Basic
            }
        }
    };
    debug!(target: "render.transcript", ?mode, ?level, "colour_level");
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |k| vars.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string())
    }

    #[test]
    fn scheme_maps_to_dark_colours_and_bold() {
        let s = core_text::markup::scheme("error").unwrap();
        let cs = content_style(&s, ColorLevel::Basic);
        assert_eq!(cs.foreground_color, Some(TermColor::DarkRed));
        assert_eq!(cs.background_color, Some(TermColor::Black));
        assert!(cs.attributes.has(Attribute::Bold));
    }

    #[test]
    fn extended_colours_use_indices() {
        assert_eq!(term_color(Color::Grey), TermColor::AnsiValue(241));
        assert_eq!(term_color(Color::MagentaDark), TermColor::AnsiValue(99));
    }

    #[test]
    fn mono_keeps_attributes_only() {
        let s = Style::new(Color::Red, Color::Black).with(Attr::UNDERLINE | Attr::STANDOUT);
        let cs = content_style(&s, ColorLevel::Mono);
        assert_eq!(cs.foreground_color, None);
        assert!(cs.attributes.has(Attribute::Underlined));
        assert!(cs.attributes.has(Attribute::Reverse));
    }

    #[test]
    fn auto_detection() {
        assert_eq!(detect_color_level(ColorMode::Auto, env(&[("TERM", "xterm-256color")])), ColorLevel::Extended);
        assert_eq!(detect_color_level(ColorMode::Auto, env(&[("TERM", "xterm")])), ColorLevel::Basic);
        assert_eq!(
            detect_color_level(ColorMode::Auto, env(&[("TERM", "xterm"), ("COLORTERM", "truecolor")])),
            ColorLevel::Extended
        );
        assert_eq!(
            detect_color_level(ColorMode::Auto, env(&[("TERM", "xterm-256color"), ("NO_COLOR", "1")])),
            ColorLevel::Mono
        );
        assert_eq!(detect_color_level(ColorMode::Auto, env(&[])), ColorLevel::Mono);
        assert_eq!(detect_color_level(ColorMode::Basic, env(&[])), ColorLevel::Basic);
    }
}
