//! Assembly of the runtime tables.

use crate::first_follow::FirstFollow;
use crate::grammar::Grammar;
use crate::lexfsa::ItemSets;
use crate::slots::SlotTable;
use gllex::{LexerState, LexerTables, ParserTables};

/// Builds the tables the GLL engine runs on.
pub fn parser_tables(grammar: &Grammar, ff: &FirstFollow, slots: SlotTable) -> ParserTables {
    let nt_names = grammar.non_terminals().map(|(_, n)| n.into()).collect();
    let token_names = grammar.token_names.iter().map(|n| n.as_str().into()).collect();
    let follow = grammar
        .non_terminals()
        .map(|(nt, _)| ff.follow(nt).clone())
        .collect();
    let (slots, select) = slots.into_parts();
    ParserTables::new(
        nt_names,
        token_names,
        grammar.rules().to_vec(),
        slots,
        select,
        follow,
        grammar.start_symbol(),
    )
}

/// Builds the lexer DFA from the item sets of a token grammar.
pub fn lexer_tables(grammar: &Grammar, sets: &ItemSets) -> LexerTables {
    LexerTables {
        states: sets
            .states
            .iter()
            .map(|s| LexerState {
                transitions: s.transitions.clone(),
                accept: s.accept,
            })
            .collect(),
        token_names: grammar.token_names.iter().map(|n| n.as_str().into()).collect(),
        suppressed: grammar.suppressed.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_source;
    use crate::test_grammars::{KEYWORDS, LEX1};
    use gllex::{Lexer, TokenType};

    fn lexer(src: &str) -> LexerTables {
        let g = parse_source(src).unwrap();
        let sets = ItemSets::build(&g).unwrap();
        lexer_tables(&g, &sets)
    }

    fn types(tables: &LexerTables, text: &str) -> Vec<String> {
        Lexer::tokenize(tables, text)
            .iter()
            .map(|t| tables.token_name(t.typ).to_string())
            .collect()
    }

    #[test]
    fn optional_prefix_tokens() {
        let tables = lexer(LEX1);
        assert_eq!(types(&tables, " a "), vec!["Error"]);
        assert_eq!(types(&tables, " ab "), vec!["rule1"]);
        assert_eq!(types(&tables, " bb "), vec!["rule1", "rule1"]);
        assert_eq!(types(&tables, " ab c "), vec!["rule1", "Error"]);
        assert_eq!(types(&tables, " c c c "), vec!["Error", "Error", "Error"]);
    }

    #[test]
    fn each_literal_lexes_to_its_own_token() {
        let g = parse_source(KEYWORDS).unwrap();
        let sets = ItemSets::build(&g).unwrap();
        let tables = lexer_tables(&g, &sets);
        for (text, token) in &g.literals {
            let state = tables.run(text).unwrap();
            assert_eq!(tables.accept(state), Some(*token));
            let tokens = Lexer::tokenize(&tables, text);
            assert_eq!(tokens.len(), 1, "literal {text}");
            assert_eq!(tokens[0].typ, *token);
        }
    }

    #[test]
    fn suppressed_tokens_are_dropped() {
        let tables = lexer(KEYWORDS);
        assert_eq!(
            types(&tables, "if x // note\nthen y = 42;"),
            vec!["\"if\"", "id", "\"then\"", "id", "\"=\"", "num", "\";\""]
        );
        assert_eq!(tables.token_name(TokenType::ERROR), "Error");
    }
}
