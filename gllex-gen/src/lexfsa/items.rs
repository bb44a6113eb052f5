use super::event;
use super::item::{Item, ItemRule};
use crate::error::TableError;
use crate::grammar::Grammar;
use crate::grammar::ast::LexSymbol;
use gllex::{CharClass, Position, TokenType};
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};

/// A lexer state: its settled items, ordered transitions and accepted
/// token type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSet {
    pub items: BTreeSet<Item>,
    pub transitions: Vec<(CharClass, usize)>,
    pub accept: Option<TokenType>,
}

/// The canonical item sets of the lexer.
#[derive(Debug, Clone)]
pub struct ItemSets {
    pub rules: Vec<ItemRule>,
    pub states: Vec<ItemSet>,
}

/// Lexical rules in declaration order, then one rule per literal.
fn item_rules(grammar: &Grammar) -> Vec<ItemRule> {
    let lex = grammar
        .lex_rules
        .iter()
        .enumerate()
        .map(|(i, r)| ItemRule {
            name: r.name.clone(),
            body: r.body.clone(),
            token: TokenType(i + 1),
            literal: false,
        });
    let literals = grammar.literals.iter().map(|(text, token)| ItemRule {
        name: format!("{text:?}"),
        body: text
            .chars()
            .map(|c| LexSymbol::Class(CharClass::Char(c), Position::default()))
            .collect(),
        token: *token,
        literal: true,
    });
    lex.chain(literals).collect()
}

impl ItemSets {
    /// Builds the item sets of a token grammar.
    ///
    /// State 0 holds the initial items of every rule. Each state is
    /// followed on its events in specificity order; an event advances
    /// every item whose class contains it.
    ///
    /// # Errors
    /// [`TableError::OverlappingEvents`] if a state reads incomparable
    /// classes, and [`TableError::MultipleLiterals`] if a state accepts
    /// more than one literal.
    pub fn build(grammar: &Grammar) -> Result<ItemSets, TableError> {
        let rules = item_rules(grammar);
        let start: BTreeSet<Item> = (0..rules.len())
            .flat_map(|r| Item::new(r).emoves(&rules))
            .collect();

        let mut sets = ItemSets {
            rules,
            states: Vec::new(),
        };
        let mut index: HashMap<BTreeSet<Item>, usize> = HashMap::new();
        index.insert(start.clone(), 0);
        sets.states.push(ItemSet {
            items: start,
            transitions: Vec::new(),
            accept: None,
        });

        let mut i = 0;
        while i < sets.states.len() {
            let accept = sets.accept(i)?;
            let events: BTreeSet<CharClass> = sets.states[i]
                .items
                .iter()
                .filter_map(|item| item.class(&sets.rules).cloned())
                .collect();
            let events = event::ordered(&events).map_err(|pairs| TableError::OverlappingEvents {
                state: i,
                items: sets.render(i),
                pairs: pairs
                    .into_iter()
                    .map(|(a, b)| (a.to_string(), b.to_string()))
                    .collect(),
            })?;

            let mut transitions = Vec::with_capacity(events.len());
            for ev in events {
                let next: BTreeSet<Item> = sets.states[i]
                    .items
                    .iter()
                    .filter(|item| {
                        item.class(&sets.rules)
                            .is_some_and(|sym| event::is_subset(&ev, sym))
                    })
                    .flat_map(|item| item.advance().emoves(&sets.rules))
                    .collect();
                let to = match index.get(&next) {
                    Some(&to) => to,
                    None => {
                        let to = sets.states.len();
                        index.insert(next.clone(), to);
                        sets.states.push(ItemSet {
                            items: next,
                            transitions: Vec::new(),
                            accept: None,
                        });
                        to
                    }
                };
                transitions.push((ev, to));
            }
            sets.states[i].transitions = transitions;
            sets.states[i].accept = accept;
            i += 1;
        }
        log::debug!("lexer item sets: {} states", sets.states.len());
        Ok(sets)
    }

    /// The token type state `i` accepts.
    ///
    /// A literal wins over lexical rules; otherwise the first declared
    /// lexical rule wins.
    fn accept(&self, i: usize) -> Result<Option<TokenType>, TableError> {
        let reducing: Vec<&ItemRule> = self.states[i]
            .items
            .iter()
            .filter(|item| item.is_reduce(&self.rules))
            .map(|item| &self.rules[item.rule])
            .collect();
        let literals: Vec<&ItemRule> = reducing.iter().copied().filter(|r| r.literal).collect();
        match literals.as_slice() {
            [] => {}
            [lit] => return Ok(Some(lit.token)),
            _ => {
                return Err(TableError::MultipleLiterals {
                    state: i,
                    literals: literals.iter().map(|r| r.name.clone()).collect(),
                    items: self.render(i),
                });
            }
        }
        let Some(first) = reducing.iter().min_by_key(|r| r.token) else {
            return Ok(None);
        };
        if reducing.len() > 1 {
            log::warn!(
                "lexer state S{i} accepts {}; choosing {}",
                reducing
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                first.name
            );
        }
        Ok(Some(first.token))
    }

    /// The items of state `i`, rendered.
    pub fn render(&self, i: usize) -> Vec<String> {
        self.states[i]
            .items
            .iter()
            .map(|item| item.render(&self.rules))
            .collect()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// `true` if there are no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Writes every state as `S<n>:` followed by its items, the accepted
/// token and its `event -> S<m>` transitions.
pub fn write_item_sets<W: Write>(
    out: &mut W,
    sets: &ItemSets,
    token_names: &[String],
) -> io::Result<()> {
    for (i, state) in sets.states.iter().enumerate() {
        writeln!(out, "S{i}:")?;
        for item in sets.render(i) {
            writeln!(out, "  {item}")?;
        }
        let accept = state
            .accept
            .and_then(|t| token_names.get(t.0))
            .map_or("Error", |s| s.as_str());
        writeln!(out, "accept: {accept}")?;
        writeln!(out, "Transitions:")?;
        for (ev, to) in &state.transitions {
            writeln!(out, "  {ev} -> S{to}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
