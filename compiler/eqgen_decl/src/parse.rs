//! Declaration parser.
//!
//! Recursive descent over the token stream of one file. Only `package`,
//! `import` and `type` declarations are interpreted; every other top-level
//! declaration is skipped by delimiter matching, except that integer
//! constants are evaluated in a first pass so array lengths may name them.
//! Type expressions are lowered straight to [`TypeRef`], with qualified
//! names resolved through the file's imports where the file alone decides
//! it (see [`PendingQualifier`]).

use std::ops::Range;

use eqgen_ir::{Field, Import, ImportName, ModulePath, Primitive, StructuralKind, TypeRef};
use rustc_hash::FxHashMap;

use crate::token::{lex, LineIndex, RawToken, Token};
use crate::DeclError;

/// One named type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub definition: TypeRef,
    /// `type A = B` rather than `type A B`. Both resolve the same way.
    pub alias: bool,
}

/// Everything the generator needs from one source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFile {
    pub package: String,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
    pub pending: Vec<PendingQualifier>,
}

/// A package qualifier no import of the file binds by alias or by
/// conventional name.
///
/// A default import binds the package name the imported module declares,
/// which only the catalog knows. Until it matches the qualifier, types it
/// qualifies name the stand-in module [`pending_module`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingQualifier {
    pub qualifier: String,
    /// First use in the file.
    pub line: usize,
    pub column: usize,
}

/// Stand-in module of types qualified by a pending `qualifier`. `#` never
/// appears in an import path.
pub fn pending_module(qualifier: &str) -> ModulePath {
    ModulePath::new(format!("#{qualifier}"))
}

/// The qualifier a stand-in module stands for.
pub fn pending_qualifier(module: &ModulePath) -> Option<&str> {
    module.as_str().strip_prefix('#')
}

/// Parse the declarations of `file` (contents `source`), which belongs to
/// `module`.
pub fn parse_file(module: &ModulePath, file: &str, source: &str) -> Result<ParsedFile, DeclError> {
    let tokens = lex(source, file)?;
    let mut parser = Parser {
        source,
        file,
        module,
        tokens,
        pos: 0,
        lines: LineIndex::new(source),
        imports: Vec::new(),
        consts: FxHashMap::default(),
        pending: Vec::new(),
    };
    parser.file_decls()
}

struct Parser<'s> {
    source: &'s str,
    file: &'s str,
    module: &'s ModulePath,
    tokens: Vec<Token>,
    pos: usize,
    lines: LineIndex,
    imports: Vec<Import>,
    consts: FxHashMap<String, u64>,
    pending: Vec<PendingQualifier>,
}

impl Parser<'_> {
    // ── Cursor ──────────────────────────────────────────────────

    fn peek(&self) -> Option<RawToken> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<RawToken> {
        self.tokens.get(self.pos + ahead).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: RawToken) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: RawToken, what: &str) -> Result<Token, DeclError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(*token)
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    fn ident(&mut self) -> Result<String, DeclError> {
        let token = self.expect(RawToken::Ident, "identifier")?;
        Ok(token.text(self.source).to_owned())
    }

    fn at_word(&self, word: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| t.kind == RawToken::Ident && t.text(self.source) == word)
    }

    fn skip_separators(&mut self) {
        while self.eat(RawToken::Semi) {}
    }

    /// End of one declaration entry: `;`, or nothing before a closing
    /// delimiter.
    fn end_of_entry(&mut self) -> Result<(), DeclError> {
        match self.peek() {
            None | Some(RawToken::RParen | RawToken::RBrace) => Ok(()),
            Some(RawToken::Semi) => {
                self.skip_separators();
                Ok(())
            }
            Some(_) => Err(self.error("expected `;` or a new line")),
        }
    }

    /// Error located at the current token (or the end of the file).
    fn error(&self, message: impl Into<String>) -> DeclError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> DeclError {
        let message = message.into();
        let (offset, message) = match self.tokens.get(index) {
            Some(token) if token.start == token.end => {
                (token.start, format!("{message}, found a new line"))
            }
            Some(token) => (
                token.start,
                format!("{message}, found `{}`", token.text(self.source)),
            ),
            None => (self.source.len(), format!("{message}, found end of file")),
        };
        let (line, column) = self.lines.position(offset);
        DeclError::new(self.file, line, column, message)
    }

    // ── Declarations ────────────────────────────────────────────

    fn file_decls(&mut self) -> Result<ParsedFile, DeclError> {
        self.skip_separators();
        self.expect(RawToken::Package, "`package`")?;
        let package = self.ident()?;
        self.end_of_entry()?;

        let body = self.pos;
        self.collect_consts();
        self.pos = body;

        let mut types = Vec::new();
        while let Some(kind) = self.peek() {
            match kind {
                RawToken::Import => self.import_decl()?,
                RawToken::Type => self.type_decl(&mut types)?,
                RawToken::Semi => self.skip_separators(),
                _ => self.skip_decl()?,
            }
        }

        Ok(ParsedFile {
            package,
            imports: std::mem::take(&mut self.imports),
            types,
            pending: std::mem::take(&mut self.pending),
        })
    }

    /// First pass: record the integer constants of the file. Whatever this
    /// pass does not understand is left for the main pass to skip or
    /// report, so it stops quietly at the first error.
    fn collect_consts(&mut self) {
        while let Some(kind) = self.peek() {
            let step = match kind {
                RawToken::Semi => {
                    self.skip_separators();
                    Ok(())
                }
                RawToken::Ident if self.at_word("const") => self.const_decl(),
                _ => self.skip_decl(),
            };
            if step.is_err() {
                break;
            }
        }
    }

    fn const_decl(&mut self) -> Result<(), DeclError> {
        self.bump();
        if !self.eat(RawToken::LParen) {
            self.const_entry(0, None)?;
            return self.end_of_entry();
        }
        let mut values = None;
        let mut iota = 0;
        loop {
            self.skip_separators();
            if self.eat(RawToken::RParen) {
                break;
            }
            values = self.const_entry(iota, values)?;
            iota += 1;
            self.end_of_entry()?;
        }
        self.end_of_entry()
    }

    /// `A, B T = x, y`. An entry without values repeats the previous value
    /// list with the next `iota`. Returns the value list in effect.
    fn const_entry(
        &mut self,
        iota: u64,
        previous: Option<Range<usize>>,
    ) -> Result<Option<Range<usize>>, DeclError> {
        let mut names = vec![self.ident()?];
        while self.eat(RawToken::Comma) {
            names.push(self.ident()?);
        }
        self.scan_until(RawToken::Assign);
        let values = if self.eat(RawToken::Assign) {
            Some(self.scan_until(RawToken::Semi))
        } else {
            previous
        };

        if let Some(values) = &values {
            let exprs = self.split_commas(values.clone());
            for (name, expr) in names.iter().zip(exprs) {
                if name == "_" {
                    continue;
                }
                if let Some(value) = self.const_value(expr, iota) {
                    self.consts.insert(name.clone(), value);
                }
            }
        }
        Ok(values)
    }

    fn import_decl(&mut self) -> Result<(), DeclError> {
        self.expect(RawToken::Import, "`import`")?;
        if self.eat(RawToken::LParen) {
            loop {
                self.skip_separators();
                if self.eat(RawToken::RParen) {
                    break;
                }
                self.import_entry()?;
                self.end_of_entry()?;
            }
            self.end_of_entry()
        } else {
            self.import_entry()?;
            self.end_of_entry()
        }
    }

    fn import_entry(&mut self) -> Result<(), DeclError> {
        let name = match self.peek() {
            Some(RawToken::Dot) => {
                self.bump();
                ImportName::Dot
            }
            Some(RawToken::Ident) => match self.ident()?.as_str() {
                "_" => ImportName::Blank,
                alias => ImportName::Alias(alias.to_owned()),
            },
            _ => ImportName::Default,
        };
        let path = match self.peek() {
            Some(RawToken::Str | RawToken::RawStr) => self.bump().map(|t| t.text(self.source)),
            _ => None,
        };
        let Some(path) = path else {
            return Err(self.error("expected import path"));
        };
        let path = &path[1..path.len() - 1];
        self.imports.push(Import::new(path, name));
        Ok(())
    }

    fn type_decl(&mut self, types: &mut Vec<TypeDecl>) -> Result<(), DeclError> {
        self.expect(RawToken::Type, "`type`")?;
        if self.eat(RawToken::LParen) {
            loop {
                self.skip_separators();
                if self.eat(RawToken::RParen) {
                    break;
                }
                types.push(self.type_entry()?);
                self.end_of_entry()?;
            }
            self.end_of_entry()
        } else {
            types.push(self.type_entry()?);
            self.end_of_entry()
        }
    }

    fn type_entry(&mut self) -> Result<TypeDecl, DeclError> {
        let name = self.ident()?;
        // `type A[T any] ...` versus `type A [N]T`, `type A [pkg.N * 2]T`
        // and `type A []T`.
        if self.peek() == Some(RawToken::LBracket)
            && self.peek_at(1) == Some(RawToken::Ident)
            && self.starts_constraint(self.pos + 2)
        {
            return Err(self.error(format!("type parameters of `{name}` are not supported")));
        }
        let alias = self.eat(RawToken::Assign);
        let definition = self.type_expr()?;
        Ok(TypeDecl {
            name,
            definition,
            alias,
        })
    }

    /// Whether the token at `index`, following `[Name`, continues a type
    /// parameter list rather than an array length expression.
    fn starts_constraint(&self, index: usize) -> bool {
        self.tokens.get(index).is_some_and(|token| match token.kind {
            RawToken::Ident
            | RawToken::Comma
            | RawToken::LBracket
            | RawToken::Map
            | RawToken::Chan
            | RawToken::Func
            | RawToken::Struct
            | RawToken::Interface => true,
            RawToken::Operator => token.text(self.source).starts_with('~'),
            _ => false,
        })
    }

    /// Skip a declaration this front end does not interpret.
    fn skip_decl(&mut self) -> Result<(), DeclError> {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                RawToken::Semi if depth == 0 => {
                    self.skip_separators();
                    return Ok(());
                }
                RawToken::LParen | RawToken::LBracket | RawToken::LBrace => depth += 1,
                RawToken::RParen | RawToken::RBracket | RawToken::RBrace => {
                    if depth == 0 {
                        return Err(self.error("unbalanced delimiter"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
        if depth > 0 {
            return Err(self.error("unclosed delimiter"));
        }
        Ok(())
    }

    /// Consume tokens up to `stop`, a `;` or an unmatched closing
    /// delimiter, whichever comes first outside nested delimiters.
    fn scan_until(&mut self, stop: RawToken) -> Range<usize> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                RawToken::LParen | RawToken::LBracket | RawToken::LBrace => depth += 1,
                RawToken::RParen | RawToken::RBracket | RawToken::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                kind if depth == 0 && (kind == stop || kind == RawToken::Semi) => break,
                _ => {}
            }
            self.pos += 1;
        }
        start..self.pos
    }

    /// Split a token range at its top-level commas.
    fn split_commas(&self, range: Range<usize>) -> Vec<Range<usize>> {
        let mut parts = Vec::new();
        let mut start = range.start;
        let mut depth = 0usize;
        for index in range.clone() {
            match self.tokens.get(index).map(|t| t.kind) {
                Some(RawToken::LParen | RawToken::LBracket | RawToken::LBrace) => depth += 1,
                Some(RawToken::RParen | RawToken::RBracket | RawToken::RBrace) => {
                    depth = depth.saturating_sub(1);
                }
                Some(RawToken::Comma) if depth == 0 => {
                    parts.push(start..index);
                    start = index + 1;
                }
                _ => {}
            }
        }
        parts.push(start..range.end);
        parts
    }

    /// Value of the integer constant expression in `range`, if it only
    /// involves literals, `iota` and constants already recorded.
    fn const_value(&self, range: Range<usize>, iota: u64) -> Option<u64> {
        let mut expr = ConstExpr {
            parser: self,
            at: range.start,
            end: range.end,
            iota,
        };
        let value = expr.sum()?;
        (expr.at == expr.end).then_some(value)
    }

    /// Skip a balanced group starting at the current opening delimiter.
    fn skip_group(&mut self) -> Result<(), DeclError> {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                RawToken::LParen | RawToken::LBracket | RawToken::LBrace => depth += 1,
                RawToken::RParen | RawToken::RBracket | RawToken::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unclosed delimiter"))
    }

    // ── Types ───────────────────────────────────────────────────

    fn type_expr(&mut self) -> Result<TypeRef, DeclError> {
        match self.peek() {
            Some(RawToken::Ident) => {
                let (_, ty) = self.type_name()?;
                if self.peek() == Some(RawToken::LBracket) {
                    return Err(self.error("generic type instantiation is not supported"));
                }
                Ok(ty)
            }
            Some(RawToken::LParen) => {
                self.bump();
                let ty = self.type_expr()?;
                self.expect(RawToken::RParen, "`)`")?;
                Ok(ty)
            }
            Some(RawToken::Star) => {
                self.bump();
                Ok(TypeRef::pointer(self.type_expr()?))
            }
            Some(RawToken::LBracket) => {
                self.bump();
                if self.eat(RawToken::RBracket) {
                    return Ok(TypeRef::sequence(self.type_expr()?));
                }
                let length = self.array_length()?;
                self.expect(RawToken::RBracket, "`]`")?;
                let element = self.type_expr()?;
                Ok(TypeRef::structural(StructuralKind::FixedArray {
                    length,
                    element,
                }))
            }
            Some(RawToken::Map) => {
                self.bump();
                self.expect(RawToken::LBracket, "`[`")?;
                let key = self.type_expr()?;
                self.expect(RawToken::RBracket, "`]`")?;
                Ok(TypeRef::map(key, self.type_expr()?))
            }
            Some(RawToken::Chan) => {
                self.bump();
                self.eat(RawToken::Arrow);
                self.type_expr()?;
                Ok(TypeRef::opaque())
            }
            Some(RawToken::Arrow) => {
                self.bump();
                self.expect(RawToken::Chan, "`chan`")?;
                self.type_expr()?;
                Ok(TypeRef::opaque())
            }
            Some(RawToken::Func) => {
                self.bump();
                self.signature()?;
                Ok(TypeRef::opaque())
            }
            Some(RawToken::Struct) => self.struct_type(),
            Some(RawToken::Interface) => {
                self.bump();
                if self.peek() != Some(RawToken::LBrace) {
                    return Err(self.error("expected `{`"));
                }
                self.skip_group()?;
                Ok(TypeRef::dynamic())
            }
            _ => Err(self.error("expected a type")),
        }
    }

    /// A possibly qualified type name. Returns the unqualified name (the
    /// field name when the type is embedded) and the type.
    fn type_name(&mut self) -> Result<(String, TypeRef), DeclError> {
        let at = self.pos;
        let first = self.ident()?;
        if self.eat(RawToken::Dot) {
            let name = self.ident()?;
            let module = self.resolve_package(&first, at)?;
            return Ok((name.clone(), TypeRef::named(module.as_str(), &name)));
        }
        let ty = match first.as_str() {
            "any" | "error" => TypeRef::dynamic(),
            other => Primitive::from_name(other).map_or_else(
                || TypeRef::named(self.module.as_str(), other),
                TypeRef::primitive,
            ),
        };
        Ok((first, ty))
    }

    /// Module a package qualifier refers to in this file. `at` is the
    /// qualifier's token.
    ///
    /// An alias binds for certain, and so does a default import whose
    /// conventional name matches. Any other qualifier stays pending while
    /// the file has default imports that may declare it.
    fn resolve_package(&mut self, local: &str, at: usize) -> Result<ModulePath, DeclError> {
        let bound = self.imports.iter().rev().find(|import| match &import.name {
            ImportName::Alias(alias) => alias == local,
            ImportName::Default => import.path.assumed_name() == local,
            ImportName::Dot | ImportName::Blank => false,
        });
        if let Some(import) = bound {
            return Ok(import.path.clone());
        }

        let offset = self.tokens.get(at).map_or(self.source.len(), |t| t.start);
        let (line, column) = self.lines.position(offset);
        if !self
            .imports
            .iter()
            .any(|import| import.name == ImportName::Default)
        {
            return Err(DeclError::new(
                self.file,
                line,
                column,
                format!("package `{local}` is not imported"),
            ));
        }
        if !self.pending.iter().any(|p| p.qualifier == local) {
            self.pending.push(PendingQualifier {
                qualifier: local.to_owned(),
                line,
                column,
            });
        }
        Ok(pending_module(local))
    }

    /// Length of a fixed array; `None` when it is a constant expression
    /// the file does not determine, such as a constant declared elsewhere.
    fn array_length(&mut self) -> Result<Option<u64>, DeclError> {
        let range = self.scan_until(RawToken::RBracket);
        if range.is_empty() {
            return Err(self.error("expected array length"));
        }
        Ok(self.const_value(range, 0))
    }

    /// Parameters and optional results of a function type.
    fn signature(&mut self) -> Result<(), DeclError> {
        if self.peek() != Some(RawToken::LParen) {
            return Err(self.error("expected `(`"));
        }
        self.skip_group()?;
        match self.peek() {
            Some(RawToken::LParen) => self.skip_group(),
            Some(
                RawToken::Ident
                | RawToken::Star
                | RawToken::LBracket
                | RawToken::Map
                | RawToken::Chan
                | RawToken::Arrow
                | RawToken::Func
                | RawToken::Struct
                | RawToken::Interface,
            ) => self.type_expr().map(drop),
            _ => Ok(()),
        }
    }

    fn struct_type(&mut self) -> Result<TypeRef, DeclError> {
        self.expect(RawToken::Struct, "`struct`")?;
        self.expect(RawToken::LBrace, "`{`")?;
        let mut fields = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(RawToken::RBrace) {
                break;
            }
            self.field_decl(&mut fields)?;
            if self.peek() != Some(RawToken::RBrace) {
                self.expect(RawToken::Semi, "`;` or a new line")?;
            }
        }
        Ok(TypeRef::structural(StructuralKind::Record { fields }))
    }

    fn field_decl(&mut self, fields: &mut Vec<Field>) -> Result<(), DeclError> {
        let embedded = match (self.peek(), self.peek_at(1)) {
            (Some(RawToken::Star), _) => true,
            (
                Some(RawToken::Ident),
                None
                | Some(
                    RawToken::Semi | RawToken::RBrace | RawToken::Dot | RawToken::Str | RawToken::RawStr,
                ),
            ) => true,
            _ => false,
        };

        if embedded {
            let pointer = self.eat(RawToken::Star);
            let (name, ty) = self.type_name()?;
            let ty = if pointer { TypeRef::pointer(ty) } else { ty };
            fields.push(Field::new(name, ty));
        } else {
            let mut names = vec![self.ident()?];
            while self.eat(RawToken::Comma) {
                names.push(self.ident()?);
            }
            let ty = self.type_expr()?;
            // Blank fields cannot be referenced.
            fields.extend(
                names
                    .into_iter()
                    .filter(|name| name != "_")
                    .map(|name| Field::new(name, ty.clone())),
            );
        }

        // Tag.
        if matches!(self.peek(), Some(RawToken::Str | RawToken::RawStr)) {
            self.bump();
        }
        Ok(())
    }
}

/// Integer constant expression over a token range: literals, `iota`,
/// recorded constants, parentheses and the integer operators.
struct ConstExpr<'p, 's> {
    parser: &'p Parser<'s>,
    at: usize,
    end: usize,
    iota: u64,
}

impl<'s> ConstExpr<'_, 's> {
    fn peek(&self) -> Option<Token> {
        (self.at < self.end)
            .then(|| self.parser.tokens.get(self.at).copied())
            .flatten()
    }

    fn operator(&self) -> Option<&'s str> {
        self.peek()
            .filter(|t| matches!(t.kind, RawToken::Operator | RawToken::Star))
            .map(|t| t.text(self.parser.source))
    }

    fn sum(&mut self) -> Option<u64> {
        let mut value = self.product()?;
        while let Some(op) = self.operator().filter(|op| matches!(*op, "+" | "-" | "|" | "^")) {
            self.at += 1;
            let rhs = self.product()?;
            value = match op {
                "+" => value.checked_add(rhs)?,
                "-" => value.checked_sub(rhs)?,
                "|" => value | rhs,
                _ => value ^ rhs,
            };
        }
        Some(value)
    }

    fn product(&mut self) -> Option<u64> {
        let mut value = self.operand()?;
        while let Some(op) = self
            .operator()
            .filter(|op| matches!(*op, "*" | "/" | "%" | "<<" | ">>" | "&"))
        {
            self.at += 1;
            let rhs = self.operand()?;
            value = match op {
                "*" => value.checked_mul(rhs)?,
                "/" => value.checked_div(rhs)?,
                "%" => value.checked_rem(rhs)?,
                "<<" => value.checked_shl(u32::try_from(rhs).ok()?)?,
                ">>" => value.checked_shr(u32::try_from(rhs).ok()?)?,
                _ => value & rhs,
            };
        }
        Some(value)
    }

    fn operand(&mut self) -> Option<u64> {
        let token = self.peek()?;
        self.at += 1;
        match token.kind {
            RawToken::Number => parse_int(token.text(self.parser.source)),
            RawToken::Ident => match token.text(self.parser.source) {
                "iota" => Some(self.iota),
                name => self.parser.consts.get(name).copied(),
            },
            RawToken::LParen => {
                let value = self.sum()?;
                if self.peek()?.kind != RawToken::RParen {
                    return None;
                }
                self.at += 1;
                Some(value)
            }
            _ => None,
        }
    }
}

/// Integer literal value: decimal, `0x`, `0o`, `0b` or legacy octal, with
/// `_` separators.
pub(crate) fn parse_int(text: &str) -> Option<u64> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

#[cfg(test)]
mod tests;
