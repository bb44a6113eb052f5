//! Lexer for grammar sources.
//!
//! Built on [`logos`]: [`LogosToken`] declares the keywords, punctuation,
//! identifiers and literals of the grammar notation, while whitespace,
//! `//` line comments and `/* */` block comments are skipped. The
//! [`Lexer`] wraps the logos lexer, unescapes literals and attaches a
//! line/column [`Position`] to every [`Token`]. Input logos cannot
//! recognize becomes a [`TokenKind::Error`] token so that the parser can
//! report it in place.

use gllex::{LineIndex, Position};
use logos::Logos;
use std::fmt;

/// Kinds of tokens in a grammar source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Package,
    Empty,
    Any,
    AnyOf,
    Not,
    Letter,
    Number,
    Space,
    Upcase,
    Lowcase,
    Dot,
    Colon,
    Semicolon,
    Pipe,
    Bang,
    Star,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    /// Identifier with an uppercase initial.
    NonTerminal(String),
    /// Identifier with a lowercase initial.
    TokId(String),
    /// Unescaped contents of `"..."`.
    Str(String),
    /// Unescaped contents of `'.'`.
    Char(char),
    /// Unrecognized input.
    Error(String),
}

impl TokenKind {
    /// Source text of a fixed token.
    pub fn text(&self) -> &'static str {
        match self {
            TokenKind::Package => "package",
            TokenKind::Empty => "empty",
            TokenKind::Any => "any",
            TokenKind::AnyOf => "anyof",
            TokenKind::Not => "not",
            TokenKind::Letter => "letter",
            TokenKind::Number => "number",
            TokenKind::Space => "space",
            TokenKind::Upcase => "upcase",
            TokenKind::Lowcase => "lowcase",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Pipe => "|",
            TokenKind::Bang => "!",
            TokenKind::Star => "*",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrack => "[",
            TokenKind::RBrack => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LAngle => "<",
            TokenKind::RAngle => ">",
            TokenKind::NonTerminal(_) => "non-terminal",
            TokenKind::TokId(_) => "token id",
            TokenKind::Str(_) => "string literal",
            TokenKind::Char(_) => "character literal",
            TokenKind::Error(_) => "invalid input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::NonTerminal(s) | TokenKind::TokId(s) => write!(f, "`{s}`"),
            TokenKind::Str(s) => write!(f, "{s:?}"),
            TokenKind::Char(c) => write!(f, "{c:?}"),
            TokenKind::Error(s) => write!(f, "invalid input {s:?}"),
            _ => write!(f, "`{}`", self.text()),
        }
    }
}

/// A grammar token and where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
}

/// Raw tokens recognized by the `logos`-based lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum LogosToken {
    #[token("/*", block_comment)]
    BlockComment,
    #[token("package")]
    Package,
    #[token("empty")]
    Empty,
    #[token("any")]
    Any,
    #[token("anyof")]
    AnyOf,
    #[token("not")]
    Not,
    #[token("letter")]
    Letter,
    #[token("number")]
    Number,
    #[token("space")]
    Space,
    #[token("upcase")]
    Upcase,
    #[token("lowcase")]
    Lowcase,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("|")]
    Pipe,
    #[token("!")]
    Bang,
    #[token("*")]
    Star,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[regex(r"[A-Z][A-Za-z0-9_]*")]
    NonTerminal,
    #[regex(r"[a-z][A-Za-z0-9_]*")]
    TokId,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,
    #[regex(r"'([^'\\\n]|\\.)'")]
    Char,
}

/// Skips a block comment up to and including its `*/`. An unterminated
/// comment is an error covering the rest of the input.
fn block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            logos::FilterResult::Error(())
        }
    }
}

/// Resolves the escapes of a quoted literal body.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        out.push(match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            c @ ('\\' | '"' | '\'') => c,
            _ => return None,
        });
    }
    Some(out)
}

/// Source-level lexer for grammar files.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, LogosToken>,
    lines: LineIndex<'source>,
}

impl<'source> Lexer<'source> {
    /// Creates a lexer for a grammar source.
    ///
    /// # Parameters
    /// - `input`: The grammar text, already reduced to plain grammar if it
    ///   came from Markdown.
    pub fn new(input: &'source str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            lines: LineIndex::new(input),
        }
    }

    /// Position just past the end of the input.
    pub fn end_position(&self) -> Position {
        self.lines.position(self.inner.source().len())
    }

    /// Retrieves the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        let kind = self.inner.next()?;
        let slice = self.inner.slice();
        let pos = self.lines.position(self.inner.span().start);
        let quoted = || slice.get(1..slice.len() - 1).and_then(unescape);
        let kind = match kind {
            Ok(token) => match token {
                LogosToken::BlockComment => unreachable!("block comments are skipped"),
                LogosToken::Package => TokenKind::Package,
                LogosToken::Empty => TokenKind::Empty,
                LogosToken::Any => TokenKind::Any,
                LogosToken::AnyOf => TokenKind::AnyOf,
                LogosToken::Not => TokenKind::Not,
                LogosToken::Letter => TokenKind::Letter,
                LogosToken::Number => TokenKind::Number,
                LogosToken::Space => TokenKind::Space,
                LogosToken::Upcase => TokenKind::Upcase,
                LogosToken::Lowcase => TokenKind::Lowcase,
                LogosToken::Dot => TokenKind::Dot,
                LogosToken::Colon => TokenKind::Colon,
                LogosToken::Semicolon => TokenKind::Semicolon,
                LogosToken::Pipe => TokenKind::Pipe,
                LogosToken::Bang => TokenKind::Bang,
                LogosToken::Star => TokenKind::Star,
                LogosToken::LParen => TokenKind::LParen,
                LogosToken::RParen => TokenKind::RParen,
                LogosToken::LBrack => TokenKind::LBrack,
                LogosToken::RBrack => TokenKind::RBrack,
                LogosToken::LBrace => TokenKind::LBrace,
                LogosToken::RBrace => TokenKind::RBrace,
                LogosToken::LAngle => TokenKind::LAngle,
                LogosToken::RAngle => TokenKind::RAngle,
                LogosToken::NonTerminal => TokenKind::NonTerminal(slice.to_string()),
                LogosToken::TokId => TokenKind::TokId(slice.to_string()),
                LogosToken::Str => match quoted() {
                    Some(s) => TokenKind::Str(s),
                    None => TokenKind::Error(slice.to_string()),
                },
                LogosToken::Char => {
                    let mut chars = quoted().unwrap_or_default().chars().collect::<Vec<_>>();
                    match (chars.pop(), chars.is_empty()) {
                        (Some(c), true) => TokenKind::Char(c),
                        _ => TokenKind::Error(slice.to_string()),
                    }
                }
            },
            Err(()) => TokenKind::Error(slice.to_string()),
        };
        Some(Token { kind, pos })
    }

    /// Tokenizes the entire input.
    pub fn tokenize_all(input: &'source str) -> Vec<Token> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        while let Some(tok) = lex.next_token() {
            out.push(tok);
        }
        out
    }
}
