//! The normalized grammar model and its front end.
//!
//! A grammar source is lexed by [`lexer`], parsed into a [`GrammarAst`] by
//! the `chumsky` parser and checked by the semantic pass, which resolves
//! every name and produces a [`Grammar`]. Markdown sources are reduced to
//! their fenced code blocks first (see [`markdown`]).

pub mod ast;
mod check;
pub mod lexer;
pub mod markdown;
mod parser;

use crate::error::GrammarError;
use crate::symtab::Symtab;
use ast::{GrammarAst, LexRule};
use gllex::{NtId, Symbol, Terminal, TokenType};
use std::collections::BTreeSet;

/// What the generated parser reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Characters of the input text; no lexer is generated.
    Chars,
    /// Tokens produced by the generated lexer.
    Tokens,
}

/// A checked grammar with every name resolved.
///
/// Non-terminals are numbered in declaration order. In token mode the
/// token types are `Error`, then the lexical rules in declaration order,
/// then the literals used by the syntax rules in order of first use.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub package: Option<String>,
    pub mode: Mode,
    pub non_terminals: Symtab,
    /// Alternates of every non-terminal, indexed by [`NtId`].
    pub rules: Vec<Vec<Vec<Symbol>>>,
    pub start: NtId,
    /// Lexical rules; rule `i` produces token type `i + 1`.
    pub lex_rules: Vec<LexRule>,
    /// Token type names, indexed by [`TokenType`].
    pub token_names: Vec<String>,
    /// Keyword tokens: literal text and token type.
    pub literals: Vec<(String, TokenType)>,
    pub suppressed: BTreeSet<TokenType>,
}

impl Grammar {
    /// Alternates of every non-terminal, indexed by [`NtId`].
    pub fn rules(&self) -> &[Vec<Vec<Symbol>>] {
        &self.rules
    }

    /// The alternates of `nt`.
    pub fn alternates(&self, nt: NtId) -> &[Vec<Symbol>] {
        &self.rules[nt.0]
    }

    /// The rule marked `*`, or the first one declared.
    pub fn start_symbol(&self) -> NtId {
        self.start
    }

    /// Non-terminals in declaration order.
    pub fn non_terminals(&self) -> impl Iterator<Item = (NtId, &str)> {
        self.non_terminals
            .iter()
            .enumerate()
            .map(|(i, name)| (NtId(i), name))
    }

    /// Name of a non-terminal; `?` if `nt` is out of range.
    pub fn nt_name(&self, nt: NtId) -> &str {
        self.non_terminals.sym(nt.0).unwrap_or("?")
    }

    /// Every terminal used by a syntax rule.
    pub fn terminals(&self) -> BTreeSet<Terminal> {
        self.rules
            .iter()
            .flatten()
            .flatten()
            .filter_map(|s| match s {
                Symbol::T(t) => Some(t.clone()),
                Symbol::Nt(_) => None,
            })
            .collect()
    }

    /// Display name of a terminal. Token types resolve to their rule name or
    /// quoted literal.
    pub fn terminal_name(&self, t: &Terminal) -> String {
        match t {
            Terminal::Token(tt) => self
                .token_names
                .get(tt.0)
                .cloned()
                .unwrap_or_else(|| t.to_string()),
            _ => t.to_string(),
        }
    }

    pub fn symbol_name(&self, s: &Symbol) -> String {
        match s {
            Symbol::Nt(nt) => self.nt_name(*nt).to_string(),
            Symbol::T(t) => self.terminal_name(t),
        }
    }
}

/// Parses and checks a grammar source.
pub fn parse_source(source: &str) -> Result<Grammar, GrammarError> {
    let ast = parse_ast(source)?;
    check::check(ast).map_err(GrammarError::Semantic)
}

/// Parses a grammar source without checking it.
pub fn parse_ast(source: &str) -> Result<GrammarAst, GrammarError> {
    let eof = lexer::Lexer::new(source).end_position();
    let tokens = lexer::Lexer::tokenize_all(source);
    log::debug!("grammar source: {} tokens", tokens.len());
    parser::parse(&tokens, eof).map_err(GrammarError::Syntax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gllex::CharClass;

    #[test]
    fn character_grammar() {
        let g = parse_source("package \"p\"; S : A 'b' ; A : 'a' | empty ;").unwrap();
        assert_eq!(g.mode, Mode::Chars);
        assert_eq!(g.package.as_deref(), Some("p"));
        assert_eq!(g.start_symbol(), NtId(0));
        assert_eq!(
            g.non_terminals().map(|(_, n)| n).collect::<Vec<_>>(),
            vec!["S", "A"]
        );
        assert_eq!(
            g.alternates(NtId(0)),
            &[vec![
                Symbol::Nt(NtId(1)),
                Symbol::T(Terminal::Class(CharClass::Char('b')))
            ]]
        );
        assert!(g.alternates(NtId(1))[1].is_empty());
        assert_eq!(g.terminals().len(), 2);
        assert!(g.lex_rules.is_empty());
    }

    #[test]
    fn token_grammar_numbers_token_types() {
        let g = parse_source(
            "*Stmt : \"if\" id \"then\" Stmt | id ;\n\
             id : letter { letter } ;\n\
             !ws_comment : '#' { not \"\\n\" } ;",
        )
        .unwrap();
        assert_eq!(g.mode, Mode::Tokens);
        assert_eq!(
            g.token_names,
            vec!["Error", "id", "ws_comment", "\"if\"", "\"then\""]
        );
        assert_eq!(
            g.literals,
            vec![
                ("if".to_string(), TokenType(3)),
                ("then".to_string(), TokenType(4))
            ]
        );
        assert_eq!(g.suppressed, BTreeSet::from([TokenType(2)]));
        assert_eq!(
            g.alternates(NtId(0))[0],
            vec![
                Symbol::T(Terminal::Token(TokenType(3))),
                Symbol::T(Terminal::Token(TokenType(1))),
                Symbol::T(Terminal::Token(TokenType(4))),
                Symbol::Nt(NtId(0)),
            ]
        );
        assert_eq!(
            g.terminal_name(&Terminal::Token(TokenType(1))),
            "id".to_string()
        );
    }

    #[test]
    fn block_comments_are_skipped() {
        let g = parse_source("/* start */ S : 'a' /* b ** c */ | 'b' ; /**/").unwrap();
        assert_eq!(g.alternates(NtId(0)).len(), 2);
        assert!(matches!(
            parse_source("S : 'a' ; /* open"),
            Err(GrammarError::Syntax(_))
        ));
    }

    #[test]
    fn syntax_errors_are_reported() {
        match parse_source("S : 'a' | ;") {
            Err(GrammarError::Syntax(d)) => assert_eq!(d[0].position.column, 11),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
