//! Dotted items over lexical rules.

use super::pos::Pos;
use crate::grammar::ast::LexSymbol;
use gllex::{CharClass, TokenType};
use std::collections::HashSet;
use std::fmt::Write;

/// A rule recognized by the lexer: a lexical rule, or a literal used by
/// the syntax rules spelled out as a sequence of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRule {
    pub name: String,
    pub body: Vec<LexSymbol>,
    pub token: TokenType,
    pub literal: bool,
}

/// A rule and a dot position in its body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub rule: usize,
    pub pos: Pos,
}

impl Item {
    /// The dot before the rule body.
    pub fn new(rule: usize) -> Self {
        Item {
            rule,
            pos: Pos::new(),
        }
    }

    /// The innermost sequence holding the dot.
    fn sequence<'r>(&self, rules: &'r [ItemRule]) -> &'r [LexSymbol] {
        let mut seq = rules[self.rule].body.as_slice();
        for (p, j) in self.pos.path() {
            match &seq[p] {
                LexSymbol::Bracket(b) => seq = &b.alternates[j],
                LexSymbol::Class(..) => unreachable!("item position {} enters a class", self.pos),
            }
        }
        seq
    }

    /// The symbol after the dot, if any.
    pub fn symbol<'r>(&self, rules: &'r [ItemRule]) -> Option<&'r LexSymbol> {
        self.sequence(rules).get(self.pos.top())
    }

    /// The character class after the dot, if the dot is before one.
    pub fn class<'r>(&self, rules: &'r [ItemRule]) -> Option<&'r CharClass> {
        match self.symbol(rules) {
            Some(LexSymbol::Class(c, _)) => Some(c),
            _ => None,
        }
    }

    /// The dot is at the end of the rule body.
    pub fn is_reduce(&self, rules: &[ItemRule]) -> bool {
        self.pos.depth() == 0 && self.symbol(rules).is_none()
    }

    /// The item with the dot moved past the next symbol.
    pub fn advance(&self) -> Item {
        let mut next = self.clone();
        next.pos.inc();
        next
    }

    /// The closure of this item under moves that read no input.
    ///
    /// Only settled items are returned: those with the dot before a
    /// character class and top-level reduce items. Brackets are entered
    /// through each of their alternates, `[ ]` and `{ }` may be skipped,
    /// and the end of a `{ }` or `< >` alternate loops back before the
    /// bracket.
    pub fn emoves(&self, rules: &[ItemRule]) -> Vec<Item> {
        let mut settled = Vec::new();
        let mut seen = HashSet::new();
        let mut work = vec![self.clone()];
        while let Some(item) = work.pop() {
            if !seen.insert(item.clone()) {
                continue;
            }
            match item.symbol(rules) {
                Some(LexSymbol::Class(..)) => settled.push(item),
                Some(LexSymbol::Bracket(b)) => {
                    for j in 0..b.alternates.len() {
                        let mut inner = item.clone();
                        inner.pos.push(j);
                        work.push(inner);
                    }
                    if b.kind.skippable() {
                        work.push(item.advance());
                    }
                }
                None if item.pos.depth() == 0 => settled.push(item),
                None => {
                    let mut before = item.clone();
                    before.pos.pop();
                    let kind = match before.symbol(rules) {
                        Some(LexSymbol::Bracket(b)) => b.kind,
                        _ => unreachable!("item position {} leaves no bracket", item.pos),
                    };
                    work.push(before.advance());
                    if kind.repeats() {
                        work.push(before);
                    }
                }
            }
        }
        settled
    }

    /// Renders the item as `name : symbols` with `•` at the dot.
    pub fn render(&self, rules: &[ItemRule]) -> String {
        let rule = &rules[self.rule];
        let mut out = format!("{} :", rule.name);
        let mut prefix = Vec::new();
        self.render_sequence(&rule.body, &mut prefix, &mut out);
        out
    }

    fn render_sequence(&self, seq: &[LexSymbol], prefix: &mut Vec<usize>, out: &mut String) {
        let at_dot = |prefix: &[usize], p: usize| {
            let pos = self.pos.as_slice();
            pos.len() == prefix.len() + 1 && pos.starts_with(prefix) && pos[prefix.len()] == p
        };
        for (p, sym) in seq.iter().enumerate() {
            out.push(' ');
            if at_dot(prefix, p) {
                out.push('•');
            }
            match sym {
                LexSymbol::Class(c, _) => {
                    let _ = write!(out, "{c}");
                }
                LexSymbol::Bracket(b) => {
                    let (open, close) = b.kind.delimiters();
                    out.push_str(open);
                    for (j, alt) in b.alternates.iter().enumerate() {
                        if j > 0 {
                            out.push_str(" |");
                        }
                        prefix.extend([p, j]);
                        self.render_sequence(alt, prefix, out);
                        prefix.truncate(prefix.len() - 2);
                    }
                    out.push(' ');
                    out.push_str(close);
                }
            }
        }
        if at_dot(prefix, seq.len()) {
            out.push_str(" •");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::{Bracket, BracketKind};
    use gllex::Position;

    fn class(c: CharClass) -> LexSymbol {
        LexSymbol::Class(c, Position::default())
    }

    fn bracket(kind: BracketKind, alternates: Vec<Vec<LexSymbol>>) -> LexSymbol {
        LexSymbol::Bracket(Bracket {
            kind,
            alternates,
            position: Position::default(),
        })
    }

    fn rule(body: Vec<LexSymbol>) -> Vec<ItemRule> {
        vec![ItemRule {
            name: "r".into(),
            body,
            token: TokenType(1),
            literal: false,
        }]
    }

    fn rendered(rules: &[ItemRule], items: &[Item]) -> Vec<String> {
        let mut out: Vec<_> = items.iter().map(|i| i.render(rules)).collect();
        out.sort();
        out
    }

    #[test]
    fn optional_prefix() {
        let rules = rule(vec![
            bracket(BracketKind::Optional, vec![vec![class(CharClass::Char('a'))]]),
            class(CharClass::Char('b')),
        ]);
        let start = Item::new(0).emoves(&rules);
        assert_eq!(
            rendered(&rules, &start),
            vec!["r : [ 'a' ] •'b'", "r : [ •'a' ] 'b'"]
        );
        let after_a = start
            .iter()
            .find(|i| i.class(&rules) == Some(&CharClass::Char('a')))
            .unwrap()
            .advance()
            .emoves(&rules);
        assert_eq!(rendered(&rules, &after_a), vec!["r : [ 'a' ] •'b'"]);
    }

    #[test]
    fn repetition_loops_and_reduces() {
        let rules = rule(vec![
            class(CharClass::Letter),
            bracket(
                BracketKind::ZeroOrMore,
                vec![vec![class(CharClass::Letter)], vec![class(CharClass::Number)]],
            ),
        ]);
        let after_first = Item::new(0).advance().emoves(&rules);
        assert_eq!(
            rendered(&rules, &after_first),
            vec![
                "r : letter { letter | number } •",
                "r : letter { letter | •number }",
                "r : letter { •letter | number }",
            ]
        );
        assert_eq!(after_first.iter().filter(|i| i.is_reduce(&rules)).count(), 1);

        let looped: Vec<_> = after_first
            .iter()
            .filter(|i| i.class(&rules) == Some(&CharClass::Number))
            .flat_map(|i| i.advance().emoves(&rules))
            .collect();
        assert_eq!(rendered(&rules, &looped), rendered(&rules, &after_first));
    }

    #[test]
    fn nullable_loop_body_terminates() {
        let rules = rule(vec![bracket(
            BracketKind::ZeroOrMore,
            vec![vec![bracket(
                BracketKind::Optional,
                vec![vec![class(CharClass::Char('x'))]],
            )]],
        )]);
        let items = Item::new(0).emoves(&rules);
        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().filter(|i| i.is_reduce(&rules)).count(), 1);
    }
}
