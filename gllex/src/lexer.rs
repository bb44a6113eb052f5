//! Table-driven lexer.
//!
//! [`LexerTables`] is the DFA produced from the lexical item sets: every
//! state lists its outgoing transitions in specificity order (the first
//! class that contains the next character wins) and the token type it
//! accepts, if any. [`Lexer`] runs the DFA over a string with maximal
//! munch, skipping whitespace between tokens and dropping suppressed
//! token types. Input that no rule accepts becomes an `Error` token of at
//! least one character; the lexer never fails.

use crate::charclass::CharClass;
use crate::error::{LineIndex, Position};
use crate::symbol::TokenType;
use smartstring::alias::String;
use std::collections::BTreeSet;

/// One DFA state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexerState {
    /// Outgoing transitions, most specific event first.
    pub transitions: Vec<(CharClass, usize)>,
    /// Token type accepted in this state.
    pub accept: Option<TokenType>,
}

/// The lexer DFA and its token vocabulary.
#[derive(Debug, Clone, Default)]
pub struct LexerTables {
    /// DFA states; state `0` is the start state.
    pub states: Vec<LexerState>,
    /// Token type names, indexed by [`TokenType`].
    pub token_names: Vec<String>,
    /// Token types that are recognized but never emitted.
    pub suppressed: BTreeSet<TokenType>,
}

impl LexerTables {
    /// Follows the first transition of `state` whose class contains `c`.
    #[inline]
    pub fn step(&self, state: usize, c: char) -> Option<usize> {
        self.states[state]
            .transitions
            .iter()
            .find(|(class, _)| class.matches(c))
            .map(|&(_, next)| next)
    }

    /// The token type `state` accepts, if any.
    #[inline]
    pub fn accept(&self, state: usize) -> Option<TokenType> {
        self.states.get(state).and_then(|s| s.accept)
    }

    /// Name of a token type; `?` if it is out of range.
    pub fn token_name(&self, t: TokenType) -> &str {
        self.token_names.get(t.0).map_or("?", |s| s.as_str())
    }

    /// Runs the DFA over all of `s` and returns the final state, or `None`
    /// if the DFA blocks before the end.
    pub fn run(&self, s: &str) -> Option<usize> {
        s.chars().try_fold(0, |state, c| self.step(state, c))
    }
}

/// A token: its type and byte extent in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub typ: TokenType,
    /// Byte offset of the first character.
    pub lext: usize,
    /// Byte offset just past the last character.
    pub rext: usize,
    /// Line/column of the first character.
    pub position: Position,
}

impl Token {
    /// The text of this token in `source`.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.lext..self.rext]
    }
}

/// Counters collected while lexing.
#[derive(Debug, Clone, Default)]
pub struct LexerStats {
    pub chars: usize,
    pub tokens: usize,
    pub suppressed: usize,
    pub errors: usize,
}

/// Lexer over a string slice; iterate it to obtain tokens.
pub struct Lexer<'a> {
    tables: &'a LexerTables,
    text: &'a str,
    offset: usize,
    lines: LineIndex<'a>,
    stats: LexerStats,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `text`.
    ///
    /// # Parameters
    /// - `tables`: The generated scanner DFA.
    /// - `text`: The input; tokens are produced lazily by iterating.
    pub fn new(tables: &'a LexerTables, text: &'a str) -> Self {
        Self {
            tables,
            text,
            offset: 0,
            lines: LineIndex::new(text),
            stats: LexerStats::default(),
        }
    }

    /// Tokenizes the whole text.
    pub fn tokenize(tables: &'a LexerTables, text: &'a str) -> Vec<Token> {
        Lexer::new(tables, text).collect()
    }

    /// Counters for the tokens produced so far.
    pub fn stats(&self) -> LexerStats {
        self.stats.clone()
    }

    /// Scans one token, suppressed or not. Returns `None` at end of input.
    fn scan(&mut self) -> Option<Token> {
        let rest = &self.text[self.offset..];
        self.offset += rest.len() - rest.trim_start().len();
        if self.offset >= self.text.len() {
            return None;
        }

        let lext = self.offset;
        let mut state = 0;
        let mut scanned = lext;
        let mut accepted: Option<(usize, TokenType)> = None;
        for (i, c) in self.text[lext..].char_indices() {
            let Some(next) = self.tables.step(state, c) else {
                break;
            };
            state = next;
            scanned = lext + i + c.len_utf8();
            if let Some(t) = self.tables.accept(state) {
                accepted = Some((scanned, t));
            }
        }

        let (rext, typ) = match accepted {
            Some(acc) => acc,
            None => {
                let first = self.text[lext..].chars().next().map_or(1, char::len_utf8);
                self.stats.errors += 1;
                (scanned.max(lext + first), TokenType::ERROR)
            }
        };
        self.offset = rext;
        self.stats.chars += self.text[lext..rext].chars().count();

        let token = Token {
            typ,
            lext,
            rext,
            position: self.lines.position(lext),
        };
        log::trace!(
            "token {} {:?} at {}",
            self.tables.token_name(typ),
            token.text(self.text),
            token.position
        );
        Some(token)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let token = self.scan()?;
            if self.tables.suppressed.contains(&token.typ) {
                self.stats.suppressed += 1;
                continue;
            }
            self.stats.tokens += 1;
            return Some(token);
        }
    }
}
