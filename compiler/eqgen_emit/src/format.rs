//! Source formatter.
//!
//! Re-indents generated text with one tab per open brace and checks that
//! every delimiter is balanced. Literals and comments are skipped while
//! counting; raw string continuation lines are copied untouched.
//!
//! This is a layout pass over text the renderer produced, not a general
//! purpose pretty-printer: it never moves tokens across lines.

use crate::emitter::{Emitter, StringEmitter};

/// The generated text is not well-formed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct FormatError {
    /// 1-based line of the offending delimiter.
    pub line: usize,
    pub message: String,
}

impl FormatError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Code,
    RawString,
    BlockComment,
}

#[derive(Clone, Copy, Debug)]
struct Opener {
    delim: char,
    line: usize,
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Re-indent `source` and validate its delimiters.
///
/// Blank lines are kept, but runs of them collapse into one and trailing
/// ones are dropped. The result always ends with a single newline.
///
/// # Errors
///
/// Returns the first unbalanced delimiter, unterminated literal or
/// unclosed block.
pub fn format_source(source: &str) -> Result<String, FormatError> {
    let mut out = StringEmitter::with_capacity(source.len() + source.len() / 8);
    let mut open: Vec<Opener> = Vec::new();
    let mut mode = Mode::Code;
    let mut blank_run = false;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;

        if mode == Mode::RawString {
            out.emit(raw);
            out.emit_newline();
            scan_line(raw, line_no, &mut mode, &mut open)?;
            continue;
        }

        let text = raw.trim();
        if text.is_empty() {
            if !blank_run && !out.is_empty() {
                out.emit_newline();
            }
            blank_run = true;
            continue;
        }
        blank_run = false;

        let level = if mode == Mode::Code {
            open.len().saturating_sub(leading_closers(text))
        } else {
            open.len()
        };
        out.emit_indent(level);
        out.emit(text);
        out.emit_newline();

        scan_line(text, line_no, &mut mode, &mut open)?;
    }

    match mode {
        Mode::RawString => return Err(FormatError::new(count_lines(source), "unterminated raw string")),
        Mode::BlockComment => return Err(FormatError::new(count_lines(source), "unterminated comment")),
        Mode::Code => {}
    }
    if let Some(unclosed) = open.last() {
        return Err(FormatError::new(
            unclosed.line,
            format!("`{}` is never closed", unclosed.delim),
        ));
    }

    out.trim_trailing_blank_lines();
    out.ensure_trailing_newline();
    Ok(out.output())
}

fn count_lines(source: &str) -> usize {
    source.lines().count().max(1)
}

/// Closing delimiters at the start of a line dedent that line.
fn leading_closers(text: &str) -> usize {
    text.chars()
        .take_while(|c| matches!(c, '}' | ')' | ']' | ' ' | '\t'))
        .filter(|c| matches!(c, '}' | ')' | ']'))
        .count()
}

fn scan_line(
    line: &str,
    line_no: usize,
    mode: &mut Mode,
    open: &mut Vec<Opener>,
) -> Result<(), FormatError> {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match *mode {
            Mode::RawString => {
                if c == '`' {
                    *mode = Mode::Code;
                }
                continue;
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    *mode = Mode::Code;
                }
                continue;
            }
            Mode::Code => {}
        }

        match c {
            '`' => *mode = Mode::RawString,
            '"' | '\'' => {
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == c {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(FormatError::new(line_no, "unterminated literal"));
                }
            }
            '/' if chars.peek() == Some(&'/') => return Ok(()),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                *mode = Mode::BlockComment;
            }
            '(' | '[' | '{' => open.push(Opener {
                delim: c,
                line: line_no,
            }),
            ')' | ']' | '}' => match open.pop() {
                Some(opener) if closer_for(opener.delim) == c => {}
                Some(opener) => {
                    return Err(FormatError::new(
                        line_no,
                        format!(
                            "expected `{}` to close `{}` from line {}, found `{c}`",
                            closer_for(opener.delim),
                            opener.delim,
                            opener.line
                        ),
                    ));
                }
                None => {
                    return Err(FormatError::new(line_no, format!("unexpected `{c}`")));
                }
            },
            _ => {}
        }
    }
    Ok(())
}
