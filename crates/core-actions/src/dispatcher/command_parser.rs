//! Command line argument splitting.
//!
//! Shell-like rules, pure and side-effect free:
//! * whitespace separates arguments, runs of it do not produce empties;
//! * `\ ` is a literal space inside an argument;
//! * single and double quotes group, `\"` is a literal quote inside double
//!   quotes; quotes never nest;
//! * empty arguments (`""`) are dropped;
//! * any other backslash is kept as is so Windows paths survive.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("No closing quotation ({0})")]
    UnterminatedQuote(char),
}

/// Split the argument part of a command line.
pub fn split_args(text: &str) -> Result<Vec<String>, ArgError> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&' ') => {
                chars.next();
                cur.push(' ');
            }
            '\'' | '"' => {
                let mut closed = false;
                while let Some(q) = chars.next() {
                    if q == c {
                        closed = true;
                        break;
                    }
                    if c == '"' && q == '\\' && chars.peek() == Some(&'"') {
                        chars.next();
                        cur.push('"');
                        continue;
                    }
                    cur.push(q);
                }
                if !closed {
                    return Err(ArgError::UnterminatedQuote(c));
                }
            }
            c if c.is_whitespace() => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    Ok(out)
}
