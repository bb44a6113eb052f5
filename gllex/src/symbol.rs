//! Identifiers and grammar symbols shared between the generator and the runtime.

use crate::charclass::CharClass;
use smartstring::alias::String;
use std::fmt;

/// Index of a non-terminal in [`crate::ParserTables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NtId(pub usize);

/// Index of a grammar slot in [`crate::ParserTables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub usize);

/// A token type produced by the table-driven lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenType(pub usize);

impl TokenType {
    /// Type of the tokens emitted for unrecognized input.
    pub const ERROR: TokenType = TokenType(0);
}

impl From<TokenType> for usize {
    fn from(t: TokenType) -> Self {
        t.0
    }
}

/// A terminal symbol as seen by the parser.
///
/// Token grammars use [`Terminal::Token`]; character grammars parse the
/// text directly with [`Terminal::Class`] and [`Terminal::Literal`].
/// [`Terminal::End`] is the end-of-input marker `$`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    Token(TokenType),
    Class(CharClass),
    Literal(String),
    End,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Token(t) => write!(f, "#{}", t.0),
            Terminal::Class(c) => write!(f, "{c}"),
            Terminal::Literal(s) => write!(f, "{:?}", s.as_str()),
            Terminal::End => f.write_str("$"),
        }
    }
}

/// A symbol of an alternate body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Nt(NtId),
    T(Terminal),
}

impl Symbol {
    /// `true` for a non-terminal.
    pub fn is_nt(&self) -> bool {
        matches!(self, Symbol::Nt(_))
    }
}
