//! Syntax tree of a grammar source, as written.

use gllex::{CharClass, Position};
use std::fmt;

/// Bracket kinds of lexical regular expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    /// `( ... )`
    Group,
    /// `[ ... ]`
    Optional,
    /// `{ ... }`
    ZeroOrMore,
    /// `< ... >`
    OneOrMore,
}

impl BracketKind {
    /// Opening and closing delimiter.
    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            BracketKind::Group => ("(", ")"),
            BracketKind::Optional => ("[", "]"),
            BracketKind::ZeroOrMore => ("{", "}"),
            BracketKind::OneOrMore => ("<", ">"),
        }
    }

    /// The bracket may match nothing.
    pub fn skippable(self) -> bool {
        matches!(self, BracketKind::Optional | BracketKind::ZeroOrMore)
    }

    /// The bracket may match more than once.
    pub fn repeats(self) -> bool {
        matches!(self, BracketKind::ZeroOrMore | BracketKind::OneOrMore)
    }
}

/// A bracketed set of alternates in a lexical rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    pub kind: BracketKind,
    pub alternates: Vec<Vec<LexSymbol>>,
    pub position: Position,
}

/// A symbol of a lexical rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexSymbol {
    Class(CharClass, Position),
    Bracket(Bracket),
}

impl fmt::Display for LexSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexSymbol::Class(c, _) => write!(f, "{c}"),
            LexSymbol::Bracket(b) => {
                let (open, close) = b.kind.delimiters();
                f.write_str(open)?;
                for (i, alt) in b.alternates.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write_sequence(f, alt)?;
                }
                f.write_str(close)
            }
        }
    }
}

/// Writes symbols separated by spaces.
pub fn write_sequence<W: fmt::Write>(f: &mut W, symbols: &[LexSymbol]) -> fmt::Result {
    for (i, s) in symbols.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{s}")?;
    }
    Ok(())
}

/// `[!] tokid : RegExp ;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexRule {
    /// Matched tokens are dropped by the lexer.
    pub suppress: bool,
    pub name: String,
    pub position: Position,
    pub body: Vec<LexSymbol>,
}

/// What a syntax symbol refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// `Name`
    Nt(String),
    /// `name`, a lexical rule.
    TokId(String),
    /// `"text"`
    Str(String),
    /// `'c'`
    Char(char),
    /// `letter`, `anyof "..."` and the other character classes.
    Class(CharClass),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxSymbol {
    pub kind: SymbolKind,
    pub position: Position,
}

/// One alternate; no symbols means `empty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxAlternate {
    pub symbols: Vec<SyntaxSymbol>,
    pub position: Position,
}

/// `[*] Name : Alternates ;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxRule {
    /// Marked as the start rule with `*`.
    pub start: bool,
    pub head: String,
    pub position: Position,
    pub alternates: Vec<SyntaxAlternate>,
}

/// A parsed grammar source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarAst {
    pub package: Option<(String, Position)>,
    pub lex_rules: Vec<LexRule>,
    pub syntax_rules: Vec<SyntaxRule>,
}
