// FIRST and FOLLOW sets over the normalized grammar.

use crate::error::TableError;
use crate::grammar::Grammar;
use gllex::{NtId, Symbol, Terminal};
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};

/// An element of a FIRST set: a terminal, or the empty string ϵ.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookahead {
    Empty,
    T(Terminal),
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookahead::Empty => f.write_str("ϵ"),
            Lookahead::T(t) => write!(f, "{t}"),
        }
    }
}

pub type FirstSet = BTreeSet<Lookahead>;

/// FIRST sets of every non-terminal and FOLLOW sets of every non-terminal.
///
/// FIRST of a terminal is the terminal itself and is not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    first: Vec<FirstSet>,
    follow: Vec<BTreeSet<Terminal>>,
}

impl FirstFollow {
    /// Computes FIRST and FOLLOW for a grammar, rejecting non-terminals
    /// that can never be called.
    ///
    /// # Errors
    /// [`TableError::EmptyFollow`] lists every non-terminal whose FOLLOW
    /// set is empty.
    pub fn new(grammar: &Grammar) -> Result<Self, TableError> {
        let ff = Self::compute(grammar.rules(), grammar.start_symbol());
        let never_called: Vec<String> = grammar
            .non_terminals()
            .filter(|(nt, _)| ff.follow(*nt).is_empty())
            .map(|(_, name)| name.to_string())
            .collect();
        if !never_called.is_empty() {
            return Err(TableError::EmptyFollow(never_called));
        }
        log::debug!(
            "first/follow: {} non-terminals, {} nullable",
            ff.first.len(),
            ff.first.iter().filter(|f| f.contains(&Lookahead::Empty)).count()
        );
        Ok(ff)
    }

    /// Computes FIRST and FOLLOW sets to a fixed point.
    ///
    /// # Parameters
    /// - `rules`: Alternates of each non-terminal, indexed by [`NtId`].
    /// - `start`: The start symbol; its FOLLOW set is seeded with `$`.
    pub fn compute(rules: &[Vec<Vec<Symbol>>], start: NtId) -> Self {
        let mut ff = FirstFollow {
            first: vec![FirstSet::new(); rules.len()],
            follow: vec![BTreeSet::new(); rules.len()],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for (nt, alternates) in rules.iter().enumerate() {
                let mut first = FirstSet::new();
                for alt in alternates {
                    first.extend(ff.first_of_string(alt));
                }
                if first != ff.first[nt] {
                    ff.first[nt] = first;
                    changed = true;
                }
            }
        }

        if let Some(follow) = ff.follow.get_mut(start.0) {
            follow.insert(Terminal::End);
        }
        let mut changed = true;
        while changed {
            changed = false;
            for (head, alternates) in rules.iter().enumerate() {
                for alt in alternates {
                    for (k, sym) in alt.iter().enumerate() {
                        let Symbol::Nt(n) = sym else {
                            continue;
                        };
                        let rest = ff.first_of_string(&alt[k + 1..]);
                        let mut gained: BTreeSet<Terminal> = rest
                            .iter()
                            .filter_map(|l| match l {
                                Lookahead::T(t) => Some(t.clone()),
                                Lookahead::Empty => None,
                            })
                            .collect();
                        if rest.contains(&Lookahead::Empty) {
                            gained.extend(ff.follow[head].iter().cloned());
                        }
                        let follow = &mut ff.follow[n.0];
                        let before = follow.len();
                        follow.extend(gained);
                        changed |= follow.len() != before;
                    }
                }
            }
        }
        ff
    }

    /// FIRST of a single symbol.
    pub fn first_of_symbol(&self, sym: &Symbol) -> FirstSet {
        match sym {
            Symbol::T(t) => FirstSet::from([Lookahead::T(t.clone())]),
            Symbol::Nt(nt) => self.first[nt.0].clone(),
        }
    }

    /// FIRST of a symbol string; ϵ is included only if every symbol is
    /// nullable, so the empty string yields `{ϵ}`.
    pub fn first_of_string(&self, symbols: &[Symbol]) -> FirstSet {
        let mut first = FirstSet::new();
        for sym in symbols {
            let fs = self.first_of_symbol(sym);
            let nullable = fs.contains(&Lookahead::Empty);
            first.extend(fs.into_iter().filter(|l| *l != Lookahead::Empty));
            if !nullable {
                return first;
            }
        }
        first.insert(Lookahead::Empty);
        first
    }

    /// FOLLOW of a non-terminal.
    pub fn follow(&self, nt: NtId) -> &BTreeSet<Terminal> {
        &self.follow[nt.0]
    }

    /// Returns `true` if `sym` derives the empty string.
    pub fn nullable(&self, sym: &Symbol) -> bool {
        match sym {
            Symbol::T(_) => false,
            Symbol::Nt(nt) => self.first[nt.0].contains(&Lookahead::Empty),
        }
    }

    /// Terminals that may start `suffix` in a rule for `head`:
    /// `FIRST(suffix) \ {ϵ}`, plus `FOLLOW(head)` when `suffix` is nullable.
    pub fn select(&self, head: NtId, suffix: &[Symbol]) -> BTreeSet<Terminal> {
        let first = self.first_of_string(suffix);
        let nullable = first.contains(&Lookahead::Empty);
        let mut select: BTreeSet<Terminal> = first
            .into_iter()
            .filter_map(|l| match l {
                Lookahead::T(t) => Some(t),
                Lookahead::Empty => None,
            })
            .collect();
        if nullable {
            select.extend(self.follow(head).iter().cloned());
        }
        select
    }
}

/// Writes one `sym: a b ...` line per FIRST set, non-terminals first, then
/// one `Follow(NT): ...` line per FOLLOW set.
pub fn write_first_follow<W: Write>(
    out: &mut W,
    grammar: &Grammar,
    ff: &FirstFollow,
) -> io::Result<()> {
    let name = |l: &Lookahead| match l {
        Lookahead::Empty => "ϵ".to_string(),
        Lookahead::T(t) => grammar.terminal_name(t),
    };
    for (nt, nt_name) in grammar.non_terminals() {
        write!(out, "{nt_name}:")?;
        for l in ff.first_of_symbol(&Symbol::Nt(nt)).iter() {
            write!(out, " {}", name(l))?;
        }
        writeln!(out)?;
    }
    for t in grammar.terminals() {
        let t_name = grammar.terminal_name(&t);
        writeln!(out, "{t_name}: {t_name}")?;
    }
    writeln!(out)?;
    for (nt, nt_name) in grammar.non_terminals() {
        write!(out, "Follow({nt_name}):")?;
        for t in ff.follow(nt) {
            write!(out, " {}", grammar.terminal_name(t))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_source;
    use crate::test_grammars::{AMBIGUOUS, EPSILON_PREFIX, EXPR};
    use gllex::CharClass;

    fn ch(c: char) -> Terminal {
        Terminal::Class(CharClass::Char(c))
    }

    fn la(c: char) -> Lookahead {
        Lookahead::T(ch(c))
    }

    #[test]
    fn epsilon_prefix_sets() {
        let g = parse_source(EPSILON_PREFIX).unwrap();
        let ff = FirstFollow::new(&g).unwrap();
        let (s, a) = (NtId(0), NtId(1));
        assert_eq!(ff.first_of_symbol(&Symbol::Nt(s)), FirstSet::from([la('a'), la('b')]));
        assert_eq!(
            ff.first_of_symbol(&Symbol::Nt(a)),
            FirstSet::from([Lookahead::Empty, la('a')])
        );
        assert_eq!(ff.follow(s), &BTreeSet::from([Terminal::End]));
        assert_eq!(ff.follow(a), &BTreeSet::from([ch('b')]));
        assert_eq!(ff.first_of_string(&[]), FirstSet::from([Lookahead::Empty]));
        assert_eq!(ff.select(a, &[]), BTreeSet::from([ch('b')]));
        assert_eq!(
            ff.select(s, g.alternates(s)[0].as_slice()),
            BTreeSet::from([ch('a'), ch('b')])
        );
    }

    #[test]
    fn recomputation_is_identical() {
        for src in [AMBIGUOUS, EPSILON_PREFIX, EXPR] {
            let g = parse_source(src).unwrap();
            let a = FirstFollow::compute(g.rules(), g.start_symbol());
            let b = FirstFollow::compute(g.rules(), g.start_symbol());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_is_first_only_of_nullable_non_terminals() {
        for src in [AMBIGUOUS, EPSILON_PREFIX, EXPR] {
            let g = parse_source(src).unwrap();
            let ff = FirstFollow::new(&g).unwrap();
            for t in g.terminals() {
                assert!(!ff.first_of_symbol(&Symbol::T(t)).contains(&Lookahead::Empty));
            }
            for (nt, _) in g.non_terminals() {
                let expected = g
                    .alternates(nt)
                    .iter()
                    .any(|alt| alt.iter().all(|s| ff.nullable(s)));
                assert_eq!(
                    ff.first_of_symbol(&Symbol::Nt(nt)).contains(&Lookahead::Empty),
                    expected
                );
            }
        }
    }

    #[test]
    fn never_called_rules_are_rejected() {
        // B is only reachable through itself.
        let g = parse_source("S : 'a' ; B : 'b' B ;").unwrap();
        let err = FirstFollow::new(&g).unwrap_err();
        assert_eq!(err, TableError::EmptyFollow(vec!["B".into()]));
        assert_eq!(
            err.to_string(),
            "production B has empty follow set; it is never called"
        );
    }

    #[test]
    fn report_format() {
        let g = parse_source(EPSILON_PREFIX).unwrap();
        let ff = FirstFollow::new(&g).unwrap();
        let mut out = Vec::new();
        write_first_follow(&mut out, &g, &ff).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("S: 'a' 'b'\nA: ϵ 'a'\n"), "{text}");
        assert!(text.ends_with("Follow(S): $\nFollow(A): 'b'\n"), "{text}");
    }
}
