//! Parser input abstraction.
//!
//! The GLL engine walks an [`Input`] by integer position. Character
//! grammars use [`CharInput`], whose positions are byte offsets into the
//! text; token grammars use [`TokenInput`], whose positions are token
//! indices. [`SourceInput`] picks one of the two at run time.

use crate::error::{LineIndex, Position};
use crate::lexer::{Lexer, LexerTables, Token};
use crate::symbol::Terminal;
use std::collections::BTreeSet;

/// Positional access to the text being parsed.
pub trait Input {
    /// Position of the end of input.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tries to match `t` at `pos` and returns the position after it.
    fn match_terminal(&self, pos: usize, t: &Terminal) -> Option<usize>;

    /// Returns `true` if any terminal of `set` matches at `pos`.
    fn test(&self, pos: usize, set: &BTreeSet<Terminal>) -> bool {
        set.iter().any(|t| self.match_terminal(pos, t).is_some())
    }

    /// Source text spanned by positions `[l, r)`.
    fn text(&self, l: usize, r: usize) -> &str;

    /// Line/column of position `pos`.
    fn position(&self, pos: usize) -> Position;

    /// Short description of what is found at `pos`, for diagnostics.
    fn describe(&self, pos: usize) -> String;
}

/// Character-level input. Positions are byte offsets.
#[derive(Debug, Clone)]
pub struct CharInput<'a> {
    text: &'a str,
    lines: LineIndex<'a>,
}

impl<'a> CharInput<'a> {
    /// Wraps `text` and indexes its line starts.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: LineIndex::new(text),
        }
    }
}

impl Input for CharInput<'_> {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn match_terminal(&self, pos: usize, t: &Terminal) -> Option<usize> {
        let rest = self.text.get(pos..)?;
        match t {
            Terminal::End => rest.is_empty().then_some(pos),
            Terminal::Class(class) => {
                let c = rest.chars().next()?;
                class.matches(c).then(|| pos + c.len_utf8())
            }
            Terminal::Literal(lit) => rest.starts_with(lit.as_str()).then(|| pos + lit.len()),
            Terminal::Token(_) => None,
        }
    }

    fn text(&self, l: usize, r: usize) -> &str {
        self.text.get(l..r).unwrap_or_default()
    }

    fn position(&self, pos: usize) -> Position {
        self.lines.position(pos)
    }

    fn describe(&self, pos: usize) -> String {
        match self.text.get(pos..).and_then(|s| s.chars().next()) {
            Some(c) => format!("{c:?}"),
            None => "end of input".to_string(),
        }
    }
}

/// Token-level input. Positions are token indices.
#[derive(Debug, Clone)]
pub struct TokenInput<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    names: Vec<String>,
    lines: LineIndex<'a>,
}

impl<'a> TokenInput<'a> {
    /// Lexes `text` with `tables` and wraps the resulting tokens.
    pub fn new(text: &'a str, tables: &LexerTables) -> Self {
        let tokens = Lexer::tokenize(tables, text);
        log::debug!("lexed {} tokens", tokens.len());
        Self::from_tokens(text, tokens, tables)
    }

    /// Wraps tokens produced elsewhere.
    pub fn from_tokens(text: &'a str, tokens: Vec<Token>, tables: &LexerTables) -> Self {
        Self {
            text,
            tokens,
            names: tables.token_names.iter().map(|s| s.to_string()).collect(),
            lines: LineIndex::new(text),
        }
    }

    /// The tokens the parser sees, suppressed ones excluded.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl Input for TokenInput<'_> {
    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn match_terminal(&self, pos: usize, t: &Terminal) -> Option<usize> {
        match t {
            Terminal::End => (pos == self.tokens.len()).then_some(pos),
            Terminal::Token(tt) => {
                let tok = self.tokens.get(pos)?;
                (tok.typ == *tt).then_some(pos + 1)
            }
            Terminal::Class(_) | Terminal::Literal(_) => None,
        }
    }

    fn text(&self, l: usize, r: usize) -> &str {
        if l >= r {
            return "";
        }
        match (self.tokens.get(l), self.tokens.get(r - 1)) {
            (Some(first), Some(last)) => self.text.get(first.lext..last.rext).unwrap_or_default(),
            _ => "",
        }
    }

    fn position(&self, pos: usize) -> Position {
        match self.tokens.get(pos) {
            Some(tok) => tok.position,
            None => self.lines.position(self.text.len()),
        }
    }

    fn describe(&self, pos: usize) -> String {
        match self.tokens.get(pos) {
            Some(tok) => {
                let name = self.names.get(tok.typ.0).map_or("?", String::as_str);
                format!("{name} {:?}", tok.text(self.text))
            }
            None => "end of input".to_string(),
        }
    }
}

/// Either kind of input, chosen by the grammar's lexing mode.
#[derive(Debug, Clone)]
pub enum SourceInput<'a> {
    Chars(CharInput<'a>),
    Tokens(TokenInput<'a>),
}

impl<'a> SourceInput<'a> {
    /// Reads `text` character by character.
    pub fn chars(text: &'a str) -> Self {
        SourceInput::Chars(CharInput::new(text))
    }

    /// Tokenizes `text` up front with the generated lexer.
    pub fn tokens(text: &'a str, tables: &LexerTables) -> Self {
        SourceInput::Tokens(TokenInput::new(text, tables))
    }

    fn inner(&self) -> &dyn Input {
        match self {
            SourceInput::Chars(i) => i,
            SourceInput::Tokens(i) => i,
        }
    }
}

impl Input for SourceInput<'_> {
    fn len(&self) -> usize {
        self.inner().len()
    }

    fn match_terminal(&self, pos: usize, t: &Terminal) -> Option<usize> {
        self.inner().match_terminal(pos, t)
    }

    fn text(&self, l: usize, r: usize) -> &str {
        self.inner().text(l, r)
    }

    fn position(&self, pos: usize) -> Position {
        self.inner().position(pos)
    }

    fn describe(&self, pos: usize) -> String {
        self.inner().describe(pos)
    }
}
