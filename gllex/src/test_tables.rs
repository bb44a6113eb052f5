//! Hand-built parser tables shared by the runtime tests.

use crate::charclass::CharClass;
use crate::symbol::{NtId, Symbol, Terminal};
use crate::tables::{ParserTables, Slot};

pub fn ch(c: char) -> Terminal {
    Terminal::Class(CharClass::Char(c))
}

pub fn t(c: char) -> Symbol {
    Symbol::T(ch(c))
}

pub fn nt(i: usize) -> Symbol {
    Symbol::Nt(NtId(i))
}

/// Builds tables from rules, laying out slots the way the generator does
/// (sorted by head name, alternate, position). `select` gives the
/// test-select set of every slot by label.
pub fn build(
    names: &[&str],
    rules: Vec<Vec<Vec<Symbol>>>,
    select: Vec<(&str, Vec<Terminal>)>,
    follow: Vec<Vec<Terminal>>,
) -> ParserTables {
    let mut keys = Vec::new();
    for (h, alts) in rules.iter().enumerate() {
        for (a, body) in alts.iter().enumerate() {
            for pos in 0..=body.len() {
                keys.push((names[h], h, a, pos, body.len()));
            }
        }
    }
    keys.sort();
    let slots: Vec<Slot> = keys
        .iter()
        .map(|&(name, h, alt, pos, len)| Slot {
            head: NtId(h),
            alt,
            pos,
            label: format!("{name}{alt}R{pos}").into(),
            end_of_rule: pos >= len,
            first_of_rule: pos <= 1 && len > 1,
        })
        .collect();
    let select = slots
        .iter()
        .map(|s| {
            select
                .iter()
                .find(|(label, _)| *label == s.label.as_str())
                .map(|(_, set)| set.iter().cloned().collect())
                .unwrap_or_else(|| panic!("no select set for {}", s.label))
        })
        .collect();
    ParserTables::new(
        names.iter().map(|&n| n.into()).collect(),
        vec![],
        rules,
        slots,
        select,
        follow.into_iter().map(|f| f.into_iter().collect()).collect(),
        NtId(0),
    )
}

/// `S : 'a' S | empty ;`
pub fn a_star() -> ParserTables {
    let (a, end) = (ch('a'), Terminal::End);
    build(
        &["S"],
        vec![vec![vec![t('a'), nt(0)], vec![]]],
        vec![
            ("S0R0", vec![a.clone()]),
            ("S0R1", vec![a, end.clone()]),
            ("S0R2", vec![end.clone()]),
            ("S1R0", vec![end.clone()]),
        ],
        vec![vec![end]],
    )
}

/// `S : A S | B S | empty ; A : 'a' ; B : 'a' ;`
pub fn ambiguous() -> ParserTables {
    let (a, end) = (ch('a'), Terminal::End);
    let a_end = vec![a.clone(), end.clone()];
    build(
        &["S", "A", "B"],
        vec![
            vec![vec![nt(1), nt(0)], vec![nt(2), nt(0)], vec![]],
            vec![vec![t('a')]],
            vec![vec![t('a')]],
        ],
        vec![
            ("A0R0", vec![a.clone()]),
            ("A0R1", a_end.clone()),
            ("B0R0", vec![a.clone()]),
            ("B0R1", a_end.clone()),
            ("S0R0", vec![a.clone()]),
            ("S0R1", a_end.clone()),
            ("S0R2", vec![end.clone()]),
            ("S1R0", vec![a]),
            ("S1R1", a_end.clone()),
            ("S1R2", vec![end.clone()]),
            ("S2R0", vec![end.clone()]),
        ],
        vec![vec![end], a_end.clone(), a_end],
    )
}

/// `S : A | B ; A : 'x' ; B : C ; C : D ; D : 'x' ;`
pub fn chain() -> ParserTables {
    let xs = vec![ch('x')];
    let ends = vec![Terminal::End];
    build(
        &["S", "A", "B", "C", "D"],
        vec![
            vec![vec![nt(1)], vec![nt(2)]],
            vec![vec![t('x')]],
            vec![vec![nt(3)]],
            vec![vec![nt(4)]],
            vec![vec![t('x')]],
        ],
        vec![
            ("S0R0", xs.clone()),
            ("S0R1", ends.clone()),
            ("S1R0", xs.clone()),
            ("S1R1", ends.clone()),
            ("A0R0", xs.clone()),
            ("A0R1", ends.clone()),
            ("B0R0", xs.clone()),
            ("B0R1", ends.clone()),
            ("C0R0", xs.clone()),
            ("C0R1", ends.clone()),
            ("D0R0", xs.clone()),
            ("D0R1", ends.clone()),
        ],
        vec![ends; 5],
    )
}
