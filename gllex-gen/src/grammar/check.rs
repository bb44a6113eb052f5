//! Semantic analysis: name resolution and consistency checks.

use super::ast::{GrammarAst, SymbolKind, SyntaxRule};
use super::{Grammar, Mode};
use crate::error::Diagnostic;
use crate::symtab::Symtab;
use gllex::{CharClass, NtId, Position, Symbol, Terminal, TokenType};
use std::collections::{BTreeSet, HashMap};

/// Character mode applies when the grammar has no lexical rules and no
/// token references, and reads characters somewhere.
fn mode(ast: &GrammarAst) -> Mode {
    let kinds = || {
        ast.syntax_rules
            .iter()
            .flat_map(|r| &r.alternates)
            .flat_map(|a| &a.symbols)
            .map(|s| &s.kind)
    };
    let tokids = kinds().any(|k| matches!(k, SymbolKind::TokId(_)));
    let chars = kinds().any(|k| matches!(k, SymbolKind::Char(_) | SymbolKind::Class(_)));
    if ast.lex_rules.is_empty() && !tokids && chars {
        Mode::Chars
    } else {
        Mode::Tokens
    }
}

/// Resolves the names of `ast` and collects every semantic error.
pub(super) fn check(ast: GrammarAst) -> Result<Grammar, Vec<Diagnostic>> {
    let mut diags = Vec::new();
    let mode = mode(&ast);

    let mut lex_names = Symtab::new();
    let mut lex_rules = Vec::new();
    let mut first_lex: HashMap<String, Position> = HashMap::new();
    for rule in ast.lex_rules.iter() {
        if let Some(first) = first_lex.get(&rule.name) {
            diags.push(Diagnostic::new(
                format!("duplicate lexical rule {} (first declared at {first})", rule.name),
                rule.position,
            ));
            continue;
        }
        first_lex.insert(rule.name.clone(), rule.position);
        lex_names.add(&rule.name);
        lex_rules.push(rule.clone());
    }

    let mut non_terminals = Symtab::new();
    let mut syntax_rules: Vec<&SyntaxRule> = Vec::new();
    let mut start: Option<&SyntaxRule> = None;
    for rule in ast.syntax_rules.iter() {
        if let Some(idx) = non_terminals.idx(&rule.head) {
            diags.push(Diagnostic::new(
                format!(
                    "duplicate rule {} (first declared at {})",
                    rule.head, syntax_rules[idx].position
                ),
                rule.position,
            ));
            continue;
        }
        if rule.start {
            match start {
                Some(s) => diags.push(Diagnostic::new(
                    format!(
                        "duplicate start symbol {} (start symbol already set to {})",
                        rule.head, s.head
                    ),
                    rule.position,
                )),
                None => start = Some(rule),
            }
        }
        non_terminals.add(&rule.head);
        syntax_rules.push(rule);
    }
    let Some(&first_rule) = syntax_rules.first() else {
        diags.push(Diagnostic::new(
            "grammar has no syntax rules",
            Position::new(1, 1),
        ));
        return Err(diags);
    };
    let start_name = start.unwrap_or(first_rule).head.as_str();

    let mut token_names: Vec<String> = std::iter::once("Error".to_string())
        .chain(lex_rules.iter().map(|r| r.name.clone()))
        .collect();
    let suppressed: BTreeSet<TokenType> = lex_rules
        .iter()
        .enumerate()
        .filter(|(_, r)| r.suppress)
        .map(|(i, _)| TokenType(i + 1))
        .collect();
    let mut literals: Vec<(String, TokenType)> = Vec::new();
    let mut literal = |text: String| -> Terminal {
        if let Some((_, tt)) = literals.iter().find(|(s, _)| *s == text) {
            return Terminal::Token(*tt);
        }
        let tt = TokenType(token_names.len());
        token_names.push(format!("{text:?}"));
        literals.push((text, tt));
        Terminal::Token(tt)
    };

    let mut used = vec![false; non_terminals.len()];
    let mut rules = Vec::with_capacity(syntax_rules.len());
    for rule in syntax_rules.iter() {
        let mut alternates = Vec::with_capacity(rule.alternates.len());
        for alt in rule.alternates.iter() {
            let mut symbols = Vec::with_capacity(alt.symbols.len());
            for sym in alt.symbols.iter() {
                let resolved = match (&sym.kind, mode) {
                    (SymbolKind::Nt(name), _) => match non_terminals.idx(name) {
                        Some(idx) => {
                            used[idx] = true;
                            Some(Symbol::Nt(NtId(idx)))
                        }
                        None => {
                            diags.push(Diagnostic::new(
                                format!("no grammar rule {name}"),
                                sym.position,
                            ));
                            None
                        }
                    },
                    (SymbolKind::TokId(name), _) => match lex_names.idx(name) {
                        Some(idx) => Some(Symbol::T(Terminal::Token(TokenType(idx + 1)))),
                        None => {
                            diags.push(Diagnostic::new(
                                format!("undeclared token {name}"),
                                sym.position,
                            ));
                            None
                        }
                    },
                    (SymbolKind::Str(s), _) if s.is_empty() => {
                        diags.push(Diagnostic::new("empty string literal", sym.position));
                        None
                    }
                    (SymbolKind::Str(s), Mode::Chars) => {
                        Some(Symbol::T(Terminal::Literal(s.as_str().into())))
                    }
                    (SymbolKind::Str(s), Mode::Tokens) => Some(Symbol::T(literal(s.clone()))),
                    (SymbolKind::Char(c), Mode::Chars) => {
                        Some(Symbol::T(Terminal::Class(CharClass::Char(*c))))
                    }
                    (SymbolKind::Char(c), Mode::Tokens) => Some(Symbol::T(literal(c.to_string()))),
                    (SymbolKind::Class(c), Mode::Chars) => Some(Symbol::T(Terminal::Class(c.clone()))),
                    (SymbolKind::Class(c), Mode::Tokens) => {
                        diags.push(Diagnostic::new(
                            format!("character class {c} in syntax rule {} of a token grammar", rule.head),
                            sym.position,
                        ));
                        None
                    }
                };
                symbols.extend(resolved);
            }
            alternates.push(symbols);
        }
        rules.push(alternates);
    }

    for (idx, rule) in syntax_rules.iter().enumerate() {
        if !used[idx] && rule.head != start_name {
            diags.push(Diagnostic::new(
                format!("rule {} is not used", rule.head),
                rule.position,
            ));
        }
    }

    if !diags.is_empty() {
        diags.sort_by_key(|d| d.position);
        return Err(diags);
    }

    let start = NtId(non_terminals.idx(start_name).unwrap_or_default());
    Ok(Grammar {
        package: ast.package.map(|(name, _)| name),
        mode,
        non_terminals,
        rules,
        start,
        lex_rules,
        token_names,
        literals,
        suppressed,
    })
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, Mode, parse_source};
    use crate::error::GrammarError;
    use gllex::{NtId, Position};

    fn semantic_errors(src: &str) -> Vec<String> {
        match parse_source(src) {
            Err(GrammarError::Semantic(d)) => d.iter().map(|d| d.to_string()).collect(),
            other => panic!("expected semantic errors, got {other:?}"),
        }
    }

    fn ok(src: &str) -> Grammar {
        match parse_source(src) {
            Ok(g) => g,
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn all_errors_are_collected() {
        let errs = semantic_errors(
            "S : A x ;\n\
             S : 'a' ;\n\
             *T : 'b' S ;\n\
             *U : U ;",
        );
        assert_eq!(
            errs,
            vec![
                "1:5: no grammar rule A",
                "1:7: undeclared token x",
                "2:1: duplicate rule S (first declared at 1:1)",
                "4:2: duplicate start symbol U (start symbol already set to T)",
            ]
        );
    }

    #[test]
    fn unused_rules_are_errors() {
        let errs = semantic_errors("S : 'a' ; A : 'b' ; B : B 'c' ;");
        assert_eq!(errs, vec!["1:11: rule A is not used"]);
    }

    #[test]
    fn classes_need_a_character_grammar() {
        let errs = semantic_errors("S : id letter ; id : < letter > ;");
        assert_eq!(
            errs,
            vec!["1:8: character class letter in syntax rule S of a token grammar"]
        );
        assert_eq!(ok("S : letter number ;").mode, Mode::Chars);
    }

    #[test]
    fn duplicate_lexical_rules() {
        let errs = semantic_errors("S : a ; a : 'x' ; a : 'y' ;");
        assert_eq!(errs, vec!["1:19: duplicate lexical rule a (first declared at 1:9)"]);
    }

    #[test]
    fn start_rule_is_marked_or_first() {
        assert_eq!(ok("A : 'a' B ; *B : 'b' A | empty ;").start_symbol(), NtId(1));
        assert_eq!(ok("A : 'a' B ; B : 'b' | empty ;").start_symbol(), NtId(0));
    }

    #[test]
    fn empty_grammar() {
        let errs = semantic_errors("x : 'x' ;");
        assert_eq!(errs, vec![format!("{}: grammar has no syntax rules", Position::new(1, 1))]);
    }
}
