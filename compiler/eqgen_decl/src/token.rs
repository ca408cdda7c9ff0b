//! Declaration Lexer
//!
//! `RawToken` is the logos-derived tokenizer output. [`lex`] drops trivia
//! and turns line breaks into `;` where the declaration syntax ends a
//! statement at the end of a line (after an identifier, a literal or a
//! closing delimiter), so the parser only ever sees explicit separators.

use logos::Logos;

use crate::DeclError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("\n")]
    Newline,

    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("type")]
    Type,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("chan")]
    Chan,
    #[token("func")]
    Func,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9A-Za-z_]*)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"`[^`]*`")]
    RawStr,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    Rune,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("*")]
    Star,
    #[token("=", priority = 3)]
    Assign,
    #[token("<-")]
    Arrow,
    #[token(";")]
    Semi,

    /// Any other operator. Only appears in declarations that are skipped.
    #[regex(r"[-+/%&|^<>!:~=]+")]
    Operator,
}

impl RawToken {
    /// Whether a line break after this token ends the statement.
    fn ends_statement(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Number
                | Self::Str
                | Self::RawStr
                | Self::Rune
                | Self::RParen
                | Self::RBracket
                | Self::RBrace
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: RawToken,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Byte offset to 1-based line and column.
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { starts }
    }

    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts.get(line.saturating_sub(1)).copied().unwrap_or(0);
        (line.max(1), offset - start + 1)
    }
}

/// Tokenize `source` with separators made explicit.
pub(crate) fn lex(source: &str, file: &str) -> Result<Vec<Token>, DeclError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = logos.span();
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                let (line, column) = LineIndex::new(source).position(span.start);
                return Err(DeclError::new(
                    file,
                    line,
                    column,
                    format!("unexpected character `{}`", logos.slice()),
                ));
            }
        };

        let line_break = match kind {
            RawToken::LineComment => continue,
            RawToken::BlockComment if !logos.slice().contains('\n') => continue,
            RawToken::Newline | RawToken::BlockComment => true,
            _ => false,
        };
        if line_break {
            if tokens.last().is_some_and(|last| last.kind.ends_statement()) {
                tokens.push(Token {
                    kind: RawToken::Semi,
                    start: span.start,
                    end: span.start,
                });
            }
            continue;
        }

        tokens.push(Token {
            kind,
            start: span.start,
            end: span.end,
        });
    }

    if tokens.last().is_some_and(|last| last.kind.ends_statement()) {
        tokens.push(Token {
            kind: RawToken::Semi,
            start: source.len(),
            end: source.len(),
        });
    }
    Ok(tokens)
}
