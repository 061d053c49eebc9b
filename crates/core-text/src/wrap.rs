//! Greedy word wrap over display width, markup preserving.
//!
//! Colour tags do not count toward width. Each tag is re-inserted at its
//! original plain-text offset in whichever output line that offset lands in,
//! and the last tag seen on a line is prefixed to the following line so the
//! colour survives the break.
//!
//! A paragraph may carry one layout directive:
//! * `{|indent:STR|}` prefixes every continuation line with `STR`;
//! * `{|indent_pos:|}` indents continuation lines to the column where the
//!   directive appeared.
//!
//! The directive itself is never part of the output.

use std::sync::LazyLock;

use regex::Regex;

use crate::markup::{self, MarkupError};
use crate::width::{char_width, str_width};

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\|(.*?)\|\}").expect("static regex"));
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{![^!]+!\}").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    /// Pad the output with `" "` lines until it has this many lines.
    pub min_lines: usize,
    /// Treat `{!...!}` tags as zero-width markup. When false they are
    /// measured and wrapped like ordinary text.
    pub strip_colors: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            min_lines: 0,
            strip_colors: true,
        }
    }
}

/// Wrap with default options.
pub fn wrap(text: &str, width: usize) -> Result<Vec<String>, MarkupError> {
    wrap_with(text, width, WrapOptions::default())
}

pub fn wrap_with(text: &str, width: usize, opts: WrapOptions) -> Result<Vec<String>, MarkupError> {
    if opts.strip_colors {
        markup::check_tag_count(text)?;
    }
    let mut out = Vec::new();
    for para in text.split('\n') {
        wrap_paragraph(para, width, opts.strip_colors, &mut out);
    }

    while out.len() < opts.min_lines {
        out.push(" ".to_string());
    }

    carry_colors(&mut out);
    Ok(out)
}

fn wrap_paragraph(para: &str, width: usize, strip_colors: bool, out: &mut Vec<String>) {
    let (body, indent) = take_directive(para);

    // (plain char offset, tag)
    let mut tags: Vec<(usize, String)> = Vec::new();
    let plain: Vec<char> = if strip_colors {
        let mut removed = 0;
        for (byte, tag) in markup::tags(&body) {
            let offset = body[..byte].chars().count() - removed;
            removed += tag.chars().count();
            tags.push((offset, tag.to_string()));
        }
        markup::remove_formatting(&body).chars().collect()
    } else {
        body.chars().collect()
    };
    let indent_width = str_width(&indent);
    let mut tags = tags.into_iter().peekable();

    let mut start = 0;
    let mut first = true;
    loop {
        let rest = &plain[start..];
        let budget = if first {
            width
        } else {
            width.saturating_sub(indent_width)
        };
        let rest_width: usize = rest.iter().copied().map(char_width).sum();
        let last = rest_width <= budget;
        let take = if last { rest.len() } else { break_point(rest, budget) };

        let end = start + take;
        let mut line = String::new();
        if !first && !indent.is_empty() {
            line.push_str(&indent);
        }
        for (i, c) in rest[..take].iter().enumerate() {
            while let Some((_, tag)) = tags.next_if(|(off, _)| *off <= start + i) {
                line.push_str(&tag);
            }
            line.push(*c);
        }
        if last {
            for (_, tag) in tags.by_ref() {
                line.push_str(&tag);
            }
        }
        out.push(line);
        if last {
            break;
        }
        start = end;
        first = false;
    }
}

/// Number of chars of `rest` to put on the current line. Prefers breaking
/// after the last space that fits; otherwise cuts at the budget, taking at
/// least one char.
fn break_point(rest: &[char], budget: usize) -> usize {
    let mut used = 0;
    let mut fit = 0;
    let mut after_space = None;
    for (i, c) in rest.iter().enumerate() {
        let w = char_width(*c);
        if used + w > budget {
            break;
        }
        used += w;
        fit = i + 1;
        if *c == ' ' {
            after_space = Some(i + 1);
        }
    }
    after_space.unwrap_or(fit).max(1)
}

/// Strip a layout directive from `para`, returning the clean paragraph and
/// the continuation indent it selects.
fn take_directive(para: &str) -> (String, String) {
    let plain = markup::remove_formatting(para);
    let Some(caps) = DIRECTIVE_RE.captures(&plain) else {
        return (para.to_string(), String::new());
    };
    let body = caps.get(1).map_or("", |m| m.as_str());
    let indent = if let Some(s) = body.strip_prefix("indent:") {
        s.to_string()
    } else if body.starts_with("indent_pos:") {
        let begin = caps.get(0).map_or(0, |m| m.start());
        " ".repeat(str_width(&plain[..begin]))
    } else {
        String::new()
    };
    (DIRECTIVE_RE.replace_all(para, "").into_owned(), indent)
}

fn carry_colors(lines: &mut [String]) {
    let mut last = String::new();
    for line in lines.iter_mut() {
        let found = COLOR_RE.find_iter(line).last().map(|m| m.as_str().to_string());
        if !last.is_empty() {
            line.insert_str(0, &last);
        }
        if let Some(tag) = found {
            last = tag;
        }
    }
}
