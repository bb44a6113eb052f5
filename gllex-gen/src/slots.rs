//! Grammar slots.
//!
//! A slot is a dotted position in an alternate. Every alternate of length
//! `n` has slots `0..=n`; an epsilon alternate has the single slot `0`.
//! Slots are sorted by (head name, alternate, position) before numbering,
//! so ids do not depend on hash order and are stable across runs.

use crate::first_follow::{FirstFollow, Lookahead};
use crate::grammar::Grammar;
use gllex::{NtId, ParserTables, Slot, SlotId, Symbol, Terminal};
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};

/// The slot table of a grammar, with the test-select set of every slot.
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: Vec<Slot>,
    select: Vec<BTreeSet<Terminal>>,
    suffixes: Vec<Vec<Symbol>>,
    by_position: HashMap<(NtId, usize, usize), SlotId>,
    by_label: HashMap<String, SlotId>,
}

/// Label of the slot at (head, alternate, position), e.g. `S0R1`.
pub fn label(head: &str, alt: usize, pos: usize) -> String {
    format!("{head}{alt}R{pos}")
}

/// Whether reaching the slot after a symbol needs no intermediate BSR
/// entry: the dot is at most after the first of two or more symbols,
/// unless the alternate starts with the same nullable symbol twice.
fn first_of_rule(ff: &FirstFollow, symbols: &[Symbol], pos: usize) -> bool {
    if pos > 1 || symbols.len() <= 1 {
        return false;
    }
    let repeated_nullable = symbols[0] == symbols[1]
        && ff
            .first_of_symbol(&symbols[0])
            .contains(&Lookahead::Empty);
    !repeated_nullable
}

impl SlotTable {
    /// Enumerates every slot of the grammar and computes its select set.
    ///
    /// Slots are numbered by head name, then alternate, then position, so the
    /// numbering does not depend on the order rules were declared in.
    ///
    /// # Parameters
    /// - `grammar`: The checked grammar.
    /// - `ff`: FIRST and FOLLOW sets of `grammar`.
    ///
    /// # Returns
    /// The slot table with select sets and suffix FIRST sets filled in.
    pub fn new(grammar: &Grammar, ff: &FirstFollow) -> Self {
        let mut keyed = Vec::new();
        for (nt, name) in grammar.non_terminals() {
            for (alt, symbols) in grammar.alternates(nt).iter().enumerate() {
                for pos in 0..=symbols.len() {
                    keyed.push((name, nt, alt, pos));
                }
            }
        }
        keyed.sort();

        let mut table = SlotTable {
            slots: Vec::with_capacity(keyed.len()),
            select: Vec::with_capacity(keyed.len()),
            suffixes: Vec::with_capacity(keyed.len()),
            by_position: HashMap::with_capacity(keyed.len()),
            by_label: HashMap::with_capacity(keyed.len()),
        };
        for (name, head, alt, pos) in keyed {
            let symbols = &grammar.alternates(head)[alt];
            let id = SlotId(table.slots.len());
            let slot = Slot {
                head,
                alt,
                pos,
                label: label(name, alt, pos).into(),
                end_of_rule: pos >= symbols.len(),
                first_of_rule: first_of_rule(ff, symbols, pos),
            };
            table.by_position.insert((head, alt, pos), id);
            table.by_label.insert(slot.label.to_string(), id);
            table.select.push(ff.select(head, &symbols[pos..]));
            table.suffixes.push(symbols[pos..].to_vec());
            table.slots.push(slot);
        }
        log::debug!("grammar slots: {}", table.slots.len());
        table
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` if the grammar has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots, indexed by [`SlotId`].
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns the slot `id`.
    ///
    /// # Panics
    /// If `id` does not come from this table.
    pub fn get(&self, id: SlotId) -> &Slot {
        &self.slots[id.0]
    }

    /// Finds the slot at a position inside an alternate.
    ///
    /// # Parameters
    /// - `head`: The non-terminal the alternate belongs to.
    /// - `alt`: Index of the alternate within `head`'s rule.
    /// - `pos`: Number of symbols before the dot, `0..=len`.
    ///
    /// # Returns
    /// The slot's id, or `None` if no such position exists.
    pub fn lookup(&self, head: NtId, alt: usize, pos: usize) -> Option<SlotId> {
        self.by_position.get(&(head, alt, pos)).copied()
    }

    /// Finds a slot by its label, e.g. `S0R1`.
    pub fn by_label(&self, label: &str) -> Option<SlotId> {
        self.by_label.get(label).copied()
    }

    /// Symbols after the dot.
    pub fn suffix(&self, id: SlotId) -> &[Symbol] {
        &self.suffixes[id.0]
    }

    /// Test-select set of a slot.
    pub fn select(&self, id: SlotId) -> &BTreeSet<Terminal> {
        &self.select[id.0]
    }

    /// Slots and their test-select sets, in id order.
    pub fn into_parts(self) -> (Vec<Slot>, Vec<BTreeSet<Terminal>>) {
        (self.slots, self.select)
    }
}

/// Writes one `label: string-form` line per slot.
pub fn write_slots<W: Write>(out: &mut W, tables: &ParserTables) -> io::Result<()> {
    for (i, slot) in tables.slots.iter().enumerate() {
        writeln!(out, "{}: {}", slot.label, tables.slot_string(SlotId(i)))?;
    }
    Ok(())
}
