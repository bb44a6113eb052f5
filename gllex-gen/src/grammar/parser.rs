//! Parser for grammar sources, built with [`chumsky`] over the tokens of
//! [`super::lexer`].

use super::ast::{
    Bracket, BracketKind, GrammarAst, LexRule, LexSymbol, SymbolKind, SyntaxAlternate,
    SyntaxRule, SyntaxSymbol,
};
use super::lexer::{Token, TokenKind};
use crate::error::Diagnostic;
use chumsky::error::RichPattern;
use chumsky::prelude::*;
use gllex::{CharClass, Position};
use std::fmt;

type Extra<'a> = extra::Err<Rich<'a, Token>>;

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

enum Rule {
    Lex(LexRule),
    Syntax(SyntaxRule),
}

/// A fixed token; yields its position.
///
/// A mismatch is reported at the token itself, so it merges with the other
/// alternatives tried there and carries the label.
fn punct<'a>(kind: TokenKind) -> impl Parser<'a, &'a [Token], Position, Extra<'a>> + Clone {
    let label = kind.text();
    chumsky::primitive::select(move |t: Token, _| (t.kind == kind).then_some(t.pos))
        .labelled(label)
}

fn string<'a>() -> impl Parser<'a, &'a [Token], (String, Position), Extra<'a>> + Clone {
    select! { Token { kind: TokenKind::Str(s), pos } => (s, pos) }.labelled("string literal")
}

/// Character classes other than `'c'`.
fn named_class<'a>() -> impl Parser<'a, &'a [Token], (CharClass, Position), Extra<'a>> + Clone {
    let set = |kind: TokenKind, make: fn(String) -> CharClass| {
        punct(kind)
            .then(string())
            .map(move |(pos, (s, _))| (make(s), pos))
    };
    choice((
        select! {
            Token { kind: TokenKind::Any | TokenKind::Dot, pos } => (CharClass::Any, pos),
            Token { kind: TokenKind::Letter, pos } => (CharClass::Letter, pos),
            Token { kind: TokenKind::Number, pos } => (CharClass::Number, pos),
            Token { kind: TokenKind::Space, pos } => (CharClass::Space, pos),
            Token { kind: TokenKind::Upcase, pos } => (CharClass::Upcase, pos),
            Token { kind: TokenKind::Lowcase, pos } => (CharClass::Lowcase, pos),
        },
        set(TokenKind::AnyOf, |s| CharClass::AnyOf(s.chars().collect())),
        set(TokenKind::Not, |s| CharClass::Not(s.chars().collect())),
    ))
    .labelled("character class")
}

fn lex_rule<'a>() -> impl Parser<'a, &'a [Token], LexRule, Extra<'a>> + Clone {
    let class = named_class().or(select! {
        Token { kind: TokenKind::Char(c), pos } => (CharClass::Char(c), pos),
    });

    let lex_symbol = recursive(|lex_symbol| {
        let alternates = lex_symbol
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .separated_by(punct(TokenKind::Pipe))
            .at_least(1)
            .collect::<Vec<_>>();
        let bracket = |open: TokenKind, close: TokenKind, kind: BracketKind| {
            punct(open)
                .then(alternates.clone())
                .then_ignore(punct(close))
                .map(move |(position, alternates)| {
                    LexSymbol::Bracket(Bracket {
                        kind,
                        alternates,
                        position,
                    })
                })
        };
        choice((
            class.map(|(c, pos)| LexSymbol::Class(c, pos)),
            bracket(TokenKind::LParen, TokenKind::RParen, BracketKind::Group),
            bracket(TokenKind::LBrack, TokenKind::RBrack, BracketKind::Optional),
            bracket(TokenKind::LBrace, TokenKind::RBrace, BracketKind::ZeroOrMore),
            bracket(TokenKind::LAngle, TokenKind::RAngle, BracketKind::OneOrMore),
        ))
        .labelled("lexical symbol")
    });

    punct(TokenKind::Bang)
        .or_not()
        .then(select! { Token { kind: TokenKind::TokId(name), pos } => (name, pos) })
        .then_ignore(punct(TokenKind::Colon))
        .then(lex_symbol.repeated().at_least(1).collect::<Vec<_>>())
        .then_ignore(punct(TokenKind::Semicolon))
        .map(|((bang, (name, position)), body)| LexRule {
            suppress: bang.is_some(),
            name,
            position,
            body,
        })
}

fn syntax_rule<'a>() -> impl Parser<'a, &'a [Token], SyntaxRule, Extra<'a>> + Clone {
    let symbol = choice((
        select! {
            Token { kind: TokenKind::NonTerminal(n), pos } => (SymbolKind::Nt(n), pos),
            Token { kind: TokenKind::TokId(n), pos } => (SymbolKind::TokId(n), pos),
            Token { kind: TokenKind::Str(s), pos } => (SymbolKind::Str(s), pos),
            Token { kind: TokenKind::Char(c), pos } => (SymbolKind::Char(c), pos),
        },
        named_class().map(|(c, pos)| (SymbolKind::Class(c), pos)),
    ))
    .map(|(kind, position)| SyntaxSymbol { kind, position })
    .labelled("symbol");

    let alternate = choice((
        punct(TokenKind::Empty).map(|position| SyntaxAlternate {
            symbols: Vec::new(),
            position,
        }),
        symbol
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|symbols: Vec<SyntaxSymbol>| SyntaxAlternate {
                position: symbols[0].position,
                symbols,
            }),
    ))
    .labelled("alternate");

    punct(TokenKind::Star)
        .or_not()
        .then(select! { Token { kind: TokenKind::NonTerminal(name), pos } => (name, pos) })
        .then_ignore(punct(TokenKind::Colon))
        .then(
            alternate
                .separated_by(punct(TokenKind::Pipe))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .then_ignore(punct(TokenKind::Semicolon))
        .map(|((star, (head, position)), alternates)| SyntaxRule {
            start: star.is_some(),
            head,
            position,
            alternates,
        })
}

/// Parser for a whole grammar source.
pub fn parser<'a>() -> impl Parser<'a, &'a [Token], GrammarAst, Extra<'a>> {
    let package = punct(TokenKind::Package)
        .ignore_then(string())
        .then_ignore(punct(TokenKind::Semicolon).or_not())
        .or_not();

    let rule = choice((lex_rule().map(Rule::Lex), syntax_rule().map(Rule::Syntax)))
        .labelled("rule");

    package
        .then(rule.repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .map(|(package, rules)| {
            let mut ast = GrammarAst {
                package,
                ..GrammarAst::default()
            };
            for rule in rules {
                match rule {
                    Rule::Lex(r) => ast.lex_rules.push(r),
                    Rule::Syntax(r) => ast.syntax_rules.push(r),
                }
            }
            ast
        })
}

/// Parses grammar tokens. `eof` is the position reported for errors at
/// the end of input.
///
/// Invalid input tokens are reported on their own, all of them, before the
/// structure is looked at.
pub fn parse(tokens: &[Token], eof: Position) -> Result<GrammarAst, Vec<Diagnostic>> {
    let invalid: Vec<_> = tokens
        .iter()
        .filter_map(|t| match &t.kind {
            TokenKind::Error(s) => Some(Diagnostic::new(format!("invalid input {s:?}"), t.pos)),
            _ => None,
        })
        .collect();
    if !invalid.is_empty() {
        return Err(invalid);
    }

    parser().parse(tokens).into_result().map_err(|errs| {
        errs.into_iter()
            .map(|e| {
                let position = tokens.get(e.span().start).map_or(eof, |t| t.pos);
                let found = match e.found().or_else(|| tokens.get(e.span().start)) {
                    Some(t) => format!("unexpected {t}"),
                    None => "unexpected end of input".to_string(),
                };
                let mut expected: Vec<String> = e
                    .expected()
                    .filter(|p| !matches!(p, RichPattern::SomethingElse))
                    .map(|p| p.to_string())
                    .collect();
                expected.sort();
                expected.dedup();
                let message = if expected.is_empty() {
                    found
                } else {
                    format!("{found}, expected {}", expected.join(", "))
                };
                Diagnostic::new(message, position)
            })
            .collect()
    })
}
