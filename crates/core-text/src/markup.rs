//! Inline colour markup (`{!style!}text`).
//!
//! A tag opens with `{!` and closes with `!}`. The body between them is a
//! comma separated token list:
//!
//! * `{!info!}` selects a named scheme (see [`scheme`]).
//! * `{!red,black,bold!}` selects an explicit foreground / background pair
//!   followed by attribute modifiers (`bold`, `+bold`, `-underline`).
//! * `{!+bold!}` starts with a modifier and applies it to the style resolved
//!   by the immediately preceding tag on the same line.
//!
//! Invariant: a line must carry as many `{!` markers as `!}` markers. An
//! imbalance is a hard [`MarkupError::Unbalanced`], never a best-effort parse.
//!
//! Tabs inside segment text are expanded to the next multiple-of-8 column,
//! counted over the plain text accumulated so far across segments.

use std::sync::LazyLock;

use bitflags::bitflags;
use regex::Regex;
use thiserror::Error;

pub const TAG_START: &str = "{!";
pub const TAG_END: &str = "!}";
pub const TAB_STOP: usize = 8;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{!.*?!\}").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("number of {{! ({open}) is not equal to number of !}} ({close})")]
    Unbalanced { open: usize, close: usize },
    #[error("missing closing \"!}}\"")]
    MissingClose,
    #[error("no description in {{! !}}")]
    EmptyTag,
    #[error("no colour value given when no previous colour was used: {0}")]
    NoPreviousStyle(String),
    #[error("bad attribute value: {0}")]
    BadAttribute(String),
    #[error("bad colour value in tag: {fg},{bg}")]
    BadColor { fg: String, bg: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Blue,
    Cyan,
    Green,
    Magenta,
    Red,
    White,
    Yellow,
    /// 256-colour grey used as a background behind white text.
    Grey,
    /// 256-colour light grey used as a background behind black text.
    WhiteGrey,
    /// 256-colour violet used as a foreground over white.
    MagentaDark,
}

impl Color {
    pub fn from_name(name: &str) -> Option<Self> {
        let c = match name {
            "black" => Color::Black,
            "blue" => Color::Blue,
            "cyan" => Color::Cyan,
            "green" => Color::Green,
            "magenta" => Color::Magenta,
            "red" => Color::Red,
            "white" => Color::White,
            "yellow" => Color::Yellow,
            "grey" => Color::Grey,
            "whitegrey" => Color::WhiteGrey,
            "magentadark" => Color::MagentaDark,
            _ => return None,
        };
        Some(c)
    }

    pub fn is_basic(self) -> bool {
        !matches!(self, Color::Grey | Color::WhiteGrey | Color::MagentaDark)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attr: u8 {
        const BLINK     = 0b0000_0001;
        const BOLD      = 0b0000_0010;
        const DIM       = 0b0000_0100;
        const REVERSE   = 0b0000_1000;
        const STANDOUT  = 0b0001_0000;
        const UNDERLINE = 0b0010_0000;
    }
}

impl Attr {
    pub fn from_attr_name(name: &str) -> Option<Self> {
        let a = match name {
            "blink" => Attr::BLINK,
            "bold" => Attr::BOLD,
            "dim" => Attr::DIM,
            "reverse" => Attr::REVERSE,
            "standout" => Attr::STANDOUT,
            "underline" => Attr::UNDERLINE,
            _ => return None,
        };
        Some(a)
    }
}

/// Resolved display style of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    pub const fn with(mut self, attrs: Attr) -> Self {
        self.attrs = attrs;
        self
    }
}

impl Default for Style {
    /// White on black, no attributes (the `input` / `normal` schemes).
    fn default() -> Self {
        Style::new(Color::White, Color::Black)
    }
}

/// Predefined named schemes.
pub fn scheme(name: &str) -> Option<Style> {
    use Color::*;
    let s = match name {
        "input" | "normal" => Style::new(White, Black),
        "status" => Style::new(Yellow, Blue).with(Attr::BOLD),
        "info" => Style::new(White, Black).with(Attr::BOLD),
        "error" => Style::new(Red, Black).with(Attr::BOLD),
        "success" => Style::new(Green, Black).with(Attr::BOLD),
        "event" => Style::new(Magenta, Black).with(Attr::BOLD),
        "selected" => Style::new(Black, White).with(Attr::BOLD),
        "marked" => Style::new(White, Blue).with(Attr::BOLD),
        "selectedmarked" => Style::new(Blue, White).with(Attr::BOLD),
        "header" => Style::new(Green, Black).with(Attr::BOLD),
        "filterstatus" => Style::new(Green, Blue).with(Attr::BOLD),
        _ => return None,
    };
    Some(s)
}

/// How many colour pairs the output terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorLevel {
    /// Only the default white on black pair.
    Mono,
    /// The 8x8 basic pairs.
    Basic,
    /// Basic pairs plus the 256-colour extras.
    #[default]
    Extended,
}

/// Set of colour pairs available for rendering. Pairs outside the palette
/// fall back to the default style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    pub level: ColorLevel,
}

impl Palette {
    pub const fn new(level: ColorLevel) -> Self {
        Self { level }
    }

    pub fn has_pair(&self, fg: Color, bg: Color) -> bool {
        if (fg, bg) == (Color::White, Color::Black) {
            return true;
        }
        match self.level {
            ColorLevel::Mono => false,
            ColorLevel::Basic => fg.is_basic() && bg.is_basic(),
            ColorLevel::Extended => {
                (fg.is_basic() && bg.is_basic())
                    || matches!(
                        (fg, bg),
                        (Color::White, Color::Grey)
                            | (Color::Black, Color::WhiteGrey)
                            | (Color::MagentaDark, Color::White)
                    )
            }
        }
    }
}

/// A `(style, literal text)` pair produced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub style: Style,
    pub text: String,
}

/// Fail with [`MarkupError::Unbalanced`] unless open and close markers match.
pub fn check_tag_count(text: &str) -> Result<(), MarkupError> {
    let open = text.matches(TAG_START).count();
    let close = text.matches(TAG_END).count();
    if open != close {
        return Err(MarkupError::Unbalanced { open, close });
    }
    Ok(())
}

/// Remove every `{!...!}` region. Requires balanced markers.
pub fn strip(text: &str) -> Result<String, MarkupError> {
    check_tag_count(text)?;
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(TAG_START) {
        out.push_str(&rest[..start]);
        let after = &rest[start + TAG_START.len()..];
        let end = after.find(TAG_END).ok_or(MarkupError::MissingClose)?;
        rest = &after[end + TAG_END.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Lenient tag removal for callers that must never fail (completion
/// candidates, persisted transcript scanning). Unbalanced input is not an
/// error here; only well-formed `{!...!}` pairs are removed.
pub fn remove_formatting(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Iterate the tags of `text` as `(byte offset, tag text)`, leniently.
pub fn tags(text: &str) -> impl Iterator<Item = (usize, &str)> {
    TAG_RE.find_iter(text).map(|m| (m.start(), m.as_str()))
}

/// Expand tabs to the next [`TAB_STOP`] boundary. `col` is the plain-text
/// column at the start of `text` and is advanced past it.
pub fn expand_tabs(text: &str, col: &mut usize) -> String {
    if !text.contains('\t') {
        *col += text.chars().count();
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + TAB_STOP);
    for c in text.chars() {
        if c == '\t' {
            let n = TAB_STOP - (*col % TAB_STOP);
            out.extend(std::iter::repeat_n(' ', n));
            *col += n;
        } else {
            out.push(c);
            *col += 1;
        }
    }
    out
}

/// Parse with the full (extended) palette.
pub fn parse(text: &str) -> Result<Vec<Segment>, MarkupError> {
    parse_with(text, &Palette::default())
}

/// Split `text` into styled segments.
pub fn parse_with(text: &str, palette: &Palette) -> Result<Vec<Segment>, MarkupError> {
    check_tag_count(text)?;

    let mut out = Vec::new();
    let mut last: Option<Style> = None;
    let mut col = 0usize;
    let mut rest = text;

    while let Some(begin) = rest.find(TAG_START) {
        if begin > 0 {
            out.push(Segment {
                style: Style::default(),
                text: expand_tabs(&rest[..begin], &mut col),
            });
        }
        let tag_start = begin + TAG_START.len();
        let end = rest[tag_start..]
            .find(TAG_END)
            .map(|e| tag_start + e)
            .ok_or(MarkupError::MissingClose)?;

        let style = resolve_tag(&rest[tag_start..end], last, palette)?;
        last = Some(style);

        let body_start = end + TAG_END.len();
        let body_end = rest[body_start..]
            .find(TAG_START)
            .map(|n| body_start + n)
            .unwrap_or(rest.len());
        out.push(Segment {
            style,
            text: expand_tabs(&rest[body_start..body_end], &mut col),
        });
        rest = &rest[body_end..];
    }

    if out.is_empty() {
        out.push(Segment {
            style: Style::default(),
            text: expand_tabs(rest, &mut col),
        });
    }
    Ok(out)
}

fn resolve_tag(body: &str, last: Option<Style>, palette: &Palette) -> Result<Style, MarkupError> {
    let mut tokens: Vec<&str> = body.split(',').map(str::trim).collect();
    if tokens.len() == 1 && tokens[0].is_empty() {
        return Err(MarkupError::EmptyTag);
    }
    let head = tokens[0];

    if let Some(base) = scheme(head) {
        let base = if palette.has_pair(base.fg, base.bg) {
            base
        } else {
            tracing::debug!(target: "text.markup", scheme = head, "pair_unavailable");
            Style::default().with(base.attrs)
        };
        return apply_modifiers(base, &tokens[1..]);
    }

    if head.starts_with(['+', '-']) {
        let Some(prev) = last else {
            return Err(MarkupError::NoPreviousStyle(head.to_string()));
        };
        return apply_modifiers(prev, &tokens);
    }

    let bg_name = tokens.get(1).copied().unwrap_or("black");
    let (fg, bg) = match (Color::from_name(head), Color::from_name(bg_name)) {
        (Some(fg), Some(bg)) => (fg, bg),
        _ => {
            return Err(MarkupError::BadColor {
                fg: head.to_string(),
                bg: bg_name.to_string(),
            });
        }
    };

    let mut base = Style::new(fg, bg);
    if !palette.has_pair(fg, bg) {
        tracing::debug!(target: "text.markup", fg = head, bg = bg_name, "pair_unavailable");
        // A white background on a terminal without the pair means "selected";
        // reverse the default pair instead of painting white on white.
        if bg == Color::White {
            match tokens.get_mut(2) {
                Some(t) if *t == "ignore" => *t = "reverse",
                _ => tokens.push("reverse"),
            }
        }
        base = Style::default();
    }
    let modifiers = tokens.get(2..).unwrap_or(&[]);
    apply_modifiers(base, modifiers)
}

fn apply_modifiers(mut style: Style, tokens: &[&str]) -> Result<Style, MarkupError> {
    for token in tokens {
        if *token == "ignore" || token.is_empty() {
            continue;
        }
        let (remove, name) = match token.as_bytes()[0] {
            b'+' => (false, &token[1..]),
            b'-' => (true, &token[1..]),
            _ => (false, *token),
        };
        let attr = Attr::from_attr_name(name).ok_or_else(|| MarkupError::BadAttribute(token.to_string()))?;
        if remove {
            style.attrs.remove(attr);
        } else {
            style.attrs.insert(attr);
        }
    }
    Ok(style)
}

/// Re-serialise segments into markup that parses back to the same styles.
pub fn render_markup(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        out.push_str(TAG_START);
        out.push_str(color_name(seg.style.fg));
        out.push(',');
        out.push_str(color_name(seg.style.bg));
        for (name, flag) in Attr::all().iter_names() {
            if seg.style.attrs.contains(flag) {
                out.push(',');
                out.push_str(&name.to_ascii_lowercase());
            }
        }
        out.push_str(TAG_END);
        out.push_str(&seg.text);
    }
    out
}

fn color_name(c: Color) -> &'static str {
    match c {
        Color::Black => "black",
        Color::Blue => "blue",
        Color::Cyan => "cyan",
        Color::Green => "green",
        Color::Magenta => "magenta",
        Color::Red => "red",
        Color::White => "white",
        Color::Yellow => "yellow",
        Color::Grey => "grey",
        Color::WhiteGrey => "whitegrey",
        Color::MagentaDark => "magentadark",
    }
}
