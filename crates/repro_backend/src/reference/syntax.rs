//! Lexer, syntax tree, and parser for the reference language.
//!
//! The language is a small statement subset: variable declarations with
//! optional type annotations, named imports, and expression statements built
//! from literals, names, member access, and calls. Statements end at `;` or
//! at a line break.

use repro_core::Diagnostic;
use repro_host::{LanguageVersion, SourceHandle};
use std::any::Any;
use std::sync::Arc;

/// Byte range in a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start
    pub start: usize,
    /// Exclusive end
    pub end: usize,
}

impl Span {
    /// Create a span
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Ident,
    /// Numeric literal
    Number,
    /// String literal, quotes included
    Str,
    /// Single-character punctuator
    Punct(char),
    /// Character the lexer does not recognize
    Unknown,
    /// End of input
    Eof,
}

/// Lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Kind
    pub kind: TokenKind,
    /// Source range
    pub span: Span,
    /// Whether a line break precedes the token
    pub newline_before: bool,
}

const PUNCTUATORS: &[char] = &[';', ':', '=', ',', '{', '}', '(', ')', '.'];

/// Deepest expression nesting the parser accepts
pub(crate) const MAX_EXPRESSION_DEPTH: usize = 128;

/// Words that cannot name a binding
const RESERVED: &[&str] = &["const", "let", "var", "import", "export", "true", "false"];

struct Lexer<'a> {
    file: &'a str,
    text: &'a str,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a str, text: &'a str) -> Self {
        Self {
            file,
            text,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.text[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let newline_before = self.skip_trivia();
            let start = self.pos;
            let Some(c) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                    newline_before,
                });
                break;
            };
            let kind = match c {
                c if is_ident_start(c) => {
                    while self.peek_char().is_some_and(is_ident_part) {
                        self.bump();
                    }
                    TokenKind::Ident
                }
                c if c.is_ascii_digit() => {
                    self.lex_number();
                    TokenKind::Number
                }
                '"' | '\'' => {
                    self.lex_string(start, c);
                    TokenKind::Str
                }
                c if PUNCTUATORS.contains(&c) => TokenKind::Punct(c),
                _ => {
                    self.diagnostics.push(Diagnostic::at(
                        self.file,
                        start,
                        self.pos - start,
                        1127,
                        "Invalid character.",
                    ));
                    TokenKind::Unknown
                }
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
                newline_before,
            });
        }
        (tokens, self.diagnostics)
    }

    /// Skip whitespace and comments, reporting whether a line break was seen
    fn skip_trivia(&mut self) -> bool {
        let mut newline = false;
        while let Some(c) = self.peek_char() {
            match c {
                '\n' => {
                    newline = true;
                    self.bump();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => {
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '/' if self.peek_second() == Some('*') => {
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            newline = true;
                        }
                        if c == '*' && self.peek_char() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        self.diagnostics
                            .push(Diagnostic::at(self.file, self.pos, 0, 1010, "'*/' expected."));
                    }
                }
                _ => break,
            }
        }
        newline
    }

    fn lex_number(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek_char() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
    }

    fn lex_string(&mut self, start: usize, quote: char) {
        loop {
            match self.peek_char() {
                None | Some('\n') | Some('\r') => {
                    self.diagnostics.push(Diagnostic::at(
                        self.file,
                        start,
                        self.pos - start,
                        1002,
                        "Unterminated string literal.",
                    ));
                    return;
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some(c) => {
                    self.bump();
                    if c == quote {
                        return;
                    }
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Contents of a string literal with escapes resolved
fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = chars.next();
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            },
            c if Some(c) == quote => break,
            c => out.push(c),
        }
    }
    out
}

/// Identifier occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Name
    pub text: String,
    /// Source range
    pub span: Span,
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

impl VarKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "var" => Some(Self::Var),
            "let" => Some(Self::Let),
            "const" => Some(Self::Const),
            _ => None,
        }
    }

    /// Source keyword
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }

    /// Check if redeclaration is an error
    #[must_use]
    pub fn is_block_scoped(self) -> bool {
        !matches!(self, Self::Var)
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Numeric literal
    Number(Span),
    /// String literal
    Str {
        /// Unescaped contents
        value: String,
        /// Source range, quotes included
        span: Span,
    },
    /// `true` or `false`
    Bool(bool, Span),
    /// Name reference
    Name(Ident),
    /// Parenthesized expression
    Paren(Box<Expr>, Span),
    /// `object.property`
    Member {
        /// Object expression
        object: Box<Expr>,
        /// Property name
        property: Ident,
        /// Source range
        span: Span,
    },
    /// `callee(args)`
    Call {
        /// Callee expression
        callee: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
        /// Source range
        span: Span,
    },
}

impl Expr {
    /// Source range
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Number(span) | Self::Bool(_, span) | Self::Paren(_, span) => *span,
            Self::Str { span, .. } | Self::Member { span, .. } | Self::Call { span, .. } => *span,
            Self::Name(ident) => ident.span,
        }
    }

    /// Check if the expression is a literal, looking through parentheses
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Number(_) | Self::Str { .. } | Self::Bool(..) => true,
            Self::Paren(inner, _) => inner.is_literal(),
            _ => false,
        }
    }
}

/// `[export] [declare] let|const|var name[: T][= init]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    /// Has `export`
    pub exported: bool,
    /// Has `declare`
    pub ambient: bool,
    /// Keyword
    pub kind: VarKind,
    /// Bound name
    pub name: Ident,
    /// Type annotation
    pub annotation: Option<Ident>,
    /// Initializer
    pub init: Option<Expr>,
    /// Statement range
    pub span: Span,
}

/// `import { a, b } from "m"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Imported names
    pub names: Vec<Ident>,
    /// Module specifier, unquoted
    pub module: String,
    /// Specifier range, quotes included
    pub module_span: Span,
    /// Statement range
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Variable declaration
    Var(VarDecl),
    /// Named import
    Import(ImportDecl),
    /// Expression statement
    Expr(Expr, Span),
}

impl Stmt {
    /// Statement range
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Var(decl) => decl.span,
            Self::Import(decl) => decl.span,
            Self::Expr(_, span) => *span,
        }
    }
}

type ParseResult<T> = Result<T, Diagnostic>;

struct Parser<'a> {
    file: &'a str,
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    prev_end: usize,
    /// Expression nodes open on the current parse path
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(file: &'a str, text: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            file,
            text,
            tokens,
            pos: 0,
            prev_end: 0,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    fn peek(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
            self.prev_end = tok.span.end;
        }
        tok
    }

    fn slice(&self, span: Span) -> &'a str {
        &self.text[span.start..span.end]
    }

    fn is_keyword(&self, tok: Token, word: &str) -> bool {
        tok.kind == TokenKind::Ident && self.slice(tok.span) == word
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        let found = self.is_keyword(self.peek(), word);
        if found {
            self.advance();
        }
        found
    }

    fn eat_punct(&mut self, c: char) -> bool {
        let found = self.peek().kind == TokenKind::Punct(c);
        if found {
            self.advance();
        }
        found
    }

    fn error(&self, span: Span, code: u32, message: impl Into<String>) -> Diagnostic {
        Diagnostic::at(self.file, span.start, span.len(), code, message.into())
    }

    fn expect_punct(&mut self, c: char) -> ParseResult<Token> {
        let tok = self.peek();
        if tok.kind == TokenKind::Punct(c) {
            Ok(self.advance())
        } else {
            Err(self.error(tok.span, 1005, format!("'{c}' expected.")))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<Ident> {
        let tok = self.peek();
        let text = self.slice(tok.span);
        if tok.kind == TokenKind::Ident && !RESERVED.contains(&text) {
            self.advance();
            Ok(Ident {
                text: text.to_string(),
                span: tok.span,
            })
        } else {
            Err(self.error(tok.span, 1003, "Identifier expected."))
        }
    }

    /// Consume a statement terminator and return the statement end offset
    fn expect_terminator(&mut self) -> ParseResult<usize> {
        let tok = self.peek();
        if tok.kind == TokenKind::Punct(';') {
            self.advance();
            return Ok(tok.span.end);
        }
        if tok.newline_before || matches!(tok.kind, TokenKind::Eof | TokenKind::Punct('}')) {
            return Ok(self.prev_end);
        }
        Err(self.error(tok.span, 1005, "';' expected."))
    }

    /// Skip to the next statement boundary, always making progress
    fn recover(&mut self, failed_at: usize) {
        if self.pos == failed_at {
            self.advance();
        }
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::Eof => return,
                TokenKind::Punct(';') => {
                    self.advance();
                    return;
                }
                _ if tok.newline_before => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_file(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut statements = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            let start = self.pos;
            match self.parse_statement() {
                Ok(Some(stmt)) => statements.push(stmt),
                Ok(None) => {}
                Err(diag) => {
                    self.diagnostics.push(diag);
                    self.recover(start);
                }
            }
        }
        (statements, self.diagnostics)
    }

    fn parse_statement(&mut self) -> ParseResult<Option<Stmt>> {
        let first = self.peek();
        if self.eat_punct(';') {
            return Ok(None);
        }
        if self.is_keyword(first, "import") {
            return self.parse_import().map(Some);
        }

        let start = first.span.start;
        let exported = self.eat_keyword("export");
        let ambient = self.eat_keyword("declare");
        let next = self.peek();
        if next.kind == TokenKind::Ident {
            if let Some(kind) = VarKind::from_keyword(self.slice(next.span)) {
                return self.parse_var(start, exported, ambient, kind).map(Some);
            }
        }
        if exported || ambient || !self.starts_expression(next) {
            return Err(self.error(next.span, 1128, "Declaration or statement expected."));
        }

        let expr = self.parse_expression()?;
        let end = self.expect_terminator()?;
        Ok(Some(Stmt::Expr(expr, Span::new(start, end))))
    }

    fn starts_expression(&self, tok: Token) -> bool {
        match tok.kind {
            TokenKind::Ident => !matches!(self.slice(tok.span), "export" | "import"),
            TokenKind::Number | TokenKind::Str | TokenKind::Punct('(') => true,
            _ => false,
        }
    }

    fn parse_var(
        &mut self,
        start: usize,
        exported: bool,
        ambient: bool,
        kind: VarKind,
    ) -> ParseResult<Stmt> {
        self.advance();
        let name = self.expect_identifier()?;
        let annotation = if self.eat_punct(':') {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        let init = if self.eat_punct('=') {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let end = self.expect_terminator()?;
        Ok(Stmt::Var(VarDecl {
            exported,
            ambient,
            kind,
            name,
            annotation,
            init,
            span: Span::new(start, end),
        }))
    }

    fn parse_import(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span.start;
        self.expect_punct('{')?;
        let mut names = Vec::new();
        while self.peek().kind != TokenKind::Punct('}') {
            names.push(self.expect_identifier()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct('}')?;
        if !self.eat_keyword("from") {
            return Err(self.error(self.peek().span, 1005, "'from' expected."));
        }
        let tok = self.peek();
        if tok.kind != TokenKind::Str {
            return Err(self.error(tok.span, 1141, "String literal expected."));
        }
        self.advance();
        let end = self.expect_terminator()?;
        Ok(Stmt::Import(ImportDecl {
            names,
            module: unquote(self.slice(tok.span)),
            module_span: tok.span,
            span: Span::new(start, end),
        }))
    }

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        let entry = self.depth;
        let result = self.parse_postfix();
        self.depth = entry;
        result
    }

    /// Open one more expression level, failing past the nesting limit
    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(self.error(
                self.peek().span,
                2589,
                "Expression is excessively deep and possibly infinite.",
            ));
        }
        Ok(())
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let mut expr = self.parse_primary()?;
        loop {
            let start = expr.span().start;
            if matches!(self.peek().kind, TokenKind::Punct('.' | '(')) {
                self.enter()?;
            }
            if self.eat_punct('.') {
                let property = self.expect_identifier()?;
                let span = Span::new(start, property.span.end);
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    span,
                };
            } else if self.eat_punct('(') {
                let mut args = Vec::new();
                while self.peek().kind != TokenKind::Punct(')') {
                    args.push(self.parse_expression()?);
                    if !self.eat_punct(',') {
                        break;
                    }
                }
                let close = self.expect_punct(')')?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span: Span::new(start, close.span.end),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let tok = self.peek();
        let text = self.slice(tok.span);
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Expr::Number(tok.span))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::Str {
                    value: unquote(text),
                    span: tok.span,
                })
            }
            TokenKind::Ident if text == "true" || text == "false" => {
                self.advance();
                Ok(Expr::Bool(text == "true", tok.span))
            }
            TokenKind::Ident if !RESERVED.contains(&text) => {
                self.advance();
                Ok(Expr::Name(Ident {
                    text: text.to_string(),
                    span: tok.span,
                }))
            }
            TokenKind::Punct('(') => {
                self.advance();
                let inner = self.parse_expression()?;
                let close = self.expect_punct(')')?;
                Ok(Expr::Paren(Box::new(inner), Span::new(tok.span.start, close.span.end)))
            }
            _ => Err(self.error(tok.span, 1109, "Expression expected.")),
        }
    }
}

/// Parsed source file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    file_name: String,
    text: String,
    version: LanguageVersion,
    statements: Vec<Stmt>,
    diagnostics: Vec<Diagnostic>,
}

impl ParsedFile {
    /// Lex and parse `text`
    #[must_use]
    pub fn parse(file_name: &str, text: &str, version: LanguageVersion) -> Self {
        let (tokens, mut diagnostics) = Lexer::new(file_name, text).tokenize();
        let (statements, parse_diagnostics) = Parser::new(file_name, text, tokens).parse_file();
        diagnostics.extend(parse_diagnostics);
        diagnostics.sort_by_key(|d| d.location.as_ref().map_or(0, |loc| loc.start));
        Self {
            file_name: file_name.to_string(),
            text: text.to_string(),
            version,
            statements,
            diagnostics,
        }
    }

    /// Top-level statements
    #[must_use]
    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    /// Lexer and parser errors, by position
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Language level the file was parsed at
    #[must_use]
    pub fn version(&self) -> LanguageVersion {
        self.version
    }

    /// Source text of a range
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// Check if the file has its own scope
    #[must_use]
    pub fn is_module(&self) -> bool {
        self.statements.iter().any(|stmt| match stmt {
            Stmt::Import(_) => true,
            Stmt::Var(decl) => decl.exported,
            Stmt::Expr(..) => false,
        })
    }

    /// Check if the file only carries declarations
    #[must_use]
    pub fn is_declaration_file(&self) -> bool {
        self.file_name.ends_with(".d.ts")
    }
}

impl SourceHandle for ParsedFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedFile {
        ParsedFile::parse("t.ts", text, LanguageVersion(1))
    }

    fn codes(file: &ParsedFile) -> Vec<u32> {
        file.diagnostics().iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_parse_declaration() {
        let file = parse("let x: number = \"s\";");
        assert!(file.diagnostics().is_empty());
        let Stmt::Var(decl) = &file.statements()[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.kind, VarKind::Let);
        assert_eq!(decl.name.text, "x");
        assert_eq!(decl.annotation.as_ref().unwrap().text, "number");
        assert_eq!(decl.init.as_ref().unwrap().span(), Span::new(16, 19));
        assert_eq!(decl.span, Span::new(0, 20));
    }

    #[test]
    fn test_line_break_terminates() {
        let file = parse("let a = 1\nlet b = a\nconsole.log(b)");
        assert!(file.diagnostics().is_empty());
        assert_eq!(file.statements().len(), 3);
        assert!(matches!(&file.statements()[2], Stmt::Expr(Expr::Call { .. }, _)));
    }

    #[test]
    fn test_missing_semicolon() {
        let file = parse("let a = 1 2;\nlet b = 3;");
        assert_eq!(codes(&file), vec![1005]);
        let loc = file.diagnostics()[0].location.as_ref().unwrap();
        assert_eq!(loc.start, 10);
        assert_eq!(file.diagnostics()[0].message_text(), "';' expected.");
        assert_eq!(file.statements().len(), 1);
    }

    #[test]
    fn test_expression_expected() {
        let file = parse("let a = ;");
        assert_eq!(codes(&file), vec![1109]);
    }

    #[test]
    fn test_identifier_expected() {
        let file = parse("const = 1;");
        assert_eq!(codes(&file), vec![1003]);
    }

    #[test]
    fn test_unterminated_string() {
        let file = parse("let s = \"abc\nlet t = 1;");
        assert_eq!(codes(&file), vec![1002]);
        assert_eq!(file.statements().len(), 2);
    }

    #[test]
    fn test_unclosed_comment() {
        let file = parse("let a = 1; /* never closed");
        assert_eq!(codes(&file), vec![1010]);
    }

    #[test]
    fn test_invalid_character() {
        let file = parse("let a = 1; #");
        assert_eq!(codes(&file), vec![1127, 1128]);
    }

    #[test]
    fn test_comments_are_trivia() {
        let file = parse("// leading\nlet a = /* inline */ 1; // trailing");
        assert!(file.diagnostics().is_empty());
        assert_eq!(file.statements().len(), 1);
    }

    #[test]
    fn test_parse_import() {
        let file = parse("import { a, b } from './dep';");
        let Stmt::Import(decl) = &file.statements()[0] else {
            panic!("expected import");
        };
        let names: Vec<&str> = decl.names.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(decl.module, "./dep");
        assert_eq!(decl.module_span, Span::new(21, 28));
        assert!(file.is_module());
    }

    #[test]
    fn test_import_needs_string() {
        let file = parse("import { a } from dep;");
        assert_eq!(codes(&file), vec![1141]);
    }

    #[test]
    fn test_export_without_declaration() {
        let file = parse("export 1;");
        assert_eq!(codes(&file), vec![1128]);
    }

    #[test]
    fn test_script_versus_module() {
        assert!(!parse("let a = 1;").is_module());
        assert!(parse("export const a = 1;").is_module());
        let ambient = parse("declare var console: any;");
        let Stmt::Var(decl) = &ambient.statements()[0] else {
            panic!("expected declaration");
        };
        assert!(decl.ambient);
    }

    #[test]
    fn test_declaration_file() {
        let file = ParsedFile::parse("lib.d.ts", "declare const NaN: number;", LanguageVersion(1));
        assert!(file.is_declaration_file());
        assert_eq!(file.text(), "declare const NaN: number;");
    }

    #[test]
    fn test_deep_parentheses_are_rejected() {
        let text = format!("let x = {}1;\nlet y = 2;", "(".repeat(3000));
        let file = parse(&text);
        assert_eq!(codes(&file), vec![2589]);
        let loc = file.diagnostics()[0].location.as_ref().unwrap();
        assert_eq!(loc.start, 8 + MAX_EXPRESSION_DEPTH);
        assert_eq!(file.statements().len(), 1);
    }

    #[test]
    fn test_long_member_chain_is_rejected() {
        let text = format!("a{};", ".b".repeat(5000));
        assert_eq!(codes(&parse(&text)), vec![2589]);
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_EXPRESSION_DEPTH - 1;
        let text = format!("let x = {}1{};", "(".repeat(depth - 1), ")".repeat(depth - 1));
        let file = parse(&text);
        assert!(file.diagnostics().is_empty());
        assert_eq!(file.statements().len(), 1);
    }

    proptest::proptest! {
        #[test]
        fn test_parser_terminates(text in "[a-z0-9 ;:=,{}().\"'\n]{0,64}") {
            let file = parse(&text);
            for diag in file.diagnostics() {
                let loc = diag.location.as_ref().unwrap();
                proptest::prop_assert!(loc.start + loc.length <= text.len());
            }
        }
    }
}
