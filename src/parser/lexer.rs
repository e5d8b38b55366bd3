//! Catalog Lexer
//!
//! Turns physical lines into logical lines. A logical line is either a
//! section header or a `key = value` pair whose value may span several
//! physical lines while an inline array or table is still open.

use crate::parser::ParseError;

/// Kind of a logical line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    /// `[name]` section header; the text holds the bare name
    Header,
    /// `key = value` pair, continuation lines already merged
    Pair,
}

/// One logical line of catalog text
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLine {
    pub kind: LineKind,
    pub text: String,
    /// 1-based physical line the logical line starts on
    pub line: usize,
}

/// Tracks whether characters sit inside a string literal.
///
/// Double-quoted strings honour `\` escapes, single-quoted ones are literal.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct QuoteTracker {
    quote: Option<char>,
    escaped: bool,
}

impl QuoteTracker {
    /// Feed one character; returns true when it is outside any string literal.
    /// Opening and closing quote characters count as inside.
    pub(crate) fn is_code(&mut self, ch: char) -> bool {
        match self.quote {
            Some(q) => {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' && q == '"' {
                    self.escaped = true;
                } else if ch == q {
                    self.quote = None;
                }
                false
            }
            None if ch == '"' || ch == '\'' => {
                self.quote = Some(ch);
                false
            }
            None => true,
        }
    }
}

/// Open brackets and braces, innermost last
#[derive(Debug, Default)]
struct Nesting {
    open: Vec<(char, usize)>,
}

impl Nesting {
    fn scan(&mut self, text: &str, line: usize) -> Result<(), ParseError> {
        let mut quotes = QuoteTracker::default();
        for ch in text.chars() {
            if !quotes.is_code(ch) {
                continue;
            }
            match ch {
                '[' => self.open.push((']', line)),
                '{' => self.open.push(('}', line)),
                ']' | '}' => match self.open.pop() {
                    Some((expected, _)) if expected == ch => {}
                    Some((_, opened)) => return Err(ParseError::Unterminated { line: opened }),
                    None => return Err(ParseError::Unterminated { line }),
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn is_balanced(&self) -> bool {
        self.open.is_empty()
    }

    fn outermost_line(&self) -> Option<usize> {
        self.open.first().map(|(_, line)| *line)
    }
}

/// Split catalog text into logical lines
///
/// Comments and blank lines are dropped. Lines belonging to a multi-line
/// array or table are joined into the logical line that opened it.
pub fn logical_lines(content: &str) -> Result<Vec<LogicalLine>, ParseError> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;
    let mut nesting = Nesting::default();

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let code = strip_comment(raw).trim();
        if code.is_empty() {
            continue;
        }

        if pending.is_none() {
            if let Some(name) = section_header(code) {
                lines.push(LogicalLine {
                    kind: LineKind::Header,
                    text: name.to_string(),
                    line: line_num,
                });
                continue;
            }
        }

        nesting.scan(code, line_num)?;

        match pending.as_mut() {
            Some((_, text)) => {
                text.push(' ');
                text.push_str(code);
            }
            None => pending = Some((line_num, code.to_string())),
        }

        if nesting.is_balanced() {
            if let Some((line, text)) = pending.take() {
                lines.push(LogicalLine {
                    kind: LineKind::Pair,
                    text,
                    line,
                });
            }
        }
    }

    if let Some((line, _)) = pending {
        return Err(ParseError::Unterminated {
            line: nesting.outermost_line().unwrap_or(line),
        });
    }

    Ok(lines)
}

/// Drop a `#` comment that starts outside of any string literal
pub(crate) fn strip_comment(line: &str) -> &str {
    match find_unquoted(line, '#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Byte index of the first `target` outside string literals
pub(crate) fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut quotes = QuoteTracker::default();
    text.char_indices()
        .find(|&(_, ch)| quotes.is_code(ch) && ch == target)
        .map(|(idx, _)| idx)
}

/// Return the section name if the line is exactly `[name]`
fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    let valid = !inner.is_empty()
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    valid.then_some(inner)
}
