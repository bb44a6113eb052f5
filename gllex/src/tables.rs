//! Immutable parser tables consumed by the GLL engine.
//!
//! A [`ParserTables`] value is everything the engine needs to know about a
//! grammar: the alternates of each non-terminal, the grammar slots with
//! their flags, the test-select set of every slot and the FOLLOW set of
//! every non-terminal. The tables are produced once by the generator and
//! can be shared by any number of parse runs.

use crate::symbol::{NtId, SlotId, Symbol, Terminal};
use smartstring::alias::String;
use std::collections::{BTreeSet, HashMap};

/// A grammar slot: the dot before symbol `pos` of alternate `alt` of `head`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub head: NtId,
    pub alt: usize,
    pub pos: usize,
    /// Stable label of the form `{Head}{alt}R{pos}`.
    pub label: String,
    /// The dot is at the end of the alternate.
    pub end_of_rule: bool,
    /// Reaching this slot after a symbol does not produce an intermediate
    /// BSR entry.
    pub first_of_rule: bool,
}

/// Tables driving a GLL parse.
#[derive(Debug, Clone)]
pub struct ParserTables {
    /// Non-terminal names, indexed by [`NtId`].
    pub nt_names: Vec<String>,
    /// Token type names, indexed by [`crate::TokenType`].
    pub token_names: Vec<String>,
    /// Alternates of each non-terminal, indexed by [`NtId`].
    pub rules: Vec<Vec<Vec<Symbol>>>,
    /// All slots, indexed by [`SlotId`].
    pub slots: Vec<Slot>,
    /// Test-select set of each slot, indexed by [`SlotId`].
    pub select: Vec<BTreeSet<Terminal>>,
    /// FOLLOW set of each non-terminal, indexed by [`NtId`].
    pub follow: Vec<BTreeSet<Terminal>>,
    /// The start symbol.
    pub start: NtId,
    slot_index: HashMap<(NtId, usize, usize), SlotId>,
}

impl ParserTables {
    /// Assembles the tables and indexes the slots by (head, alternate, position).
    pub fn new(
        nt_names: Vec<String>,
        token_names: Vec<String>,
        rules: Vec<Vec<Vec<Symbol>>>,
        slots: Vec<Slot>,
        select: Vec<BTreeSet<Terminal>>,
        follow: Vec<BTreeSet<Terminal>>,
        start: NtId,
    ) -> Self {
        let slot_index = slots
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.head, s.alt, s.pos), SlotId(i)))
            .collect();
        Self {
            nt_names,
            token_names,
            rules,
            slots,
            select,
            follow,
            start,
            slot_index,
        }
    }

    /// The slot `id`.
    #[inline]
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.0]
    }

    /// Looks up the slot for (head, alternate, position).
    #[inline]
    pub fn slot_at(&self, head: NtId, alt: usize, pos: usize) -> Option<SlotId> {
        self.slot_index.get(&(head, alt, pos)).copied()
    }

    /// The alternates of `nt`.
    #[inline]
    pub fn alternates(&self, nt: NtId) -> &[Vec<Symbol>] {
        &self.rules[nt.0]
    }

    /// The symbols of the alternate a slot belongs to.
    #[inline]
    pub fn slot_symbols(&self, id: SlotId) -> &[Symbol] {
        let slot = self.slot(id);
        &self.rules[slot.head.0][slot.alt]
    }

    /// Name of a non-terminal.
    pub fn nt_name(&self, nt: NtId) -> &str {
        &self.nt_names[nt.0]
    }

    /// Finds a non-terminal by name.
    pub fn nt_by_name(&self, name: &str) -> Option<NtId> {
        self.nt_names.iter().position(|n| n == name).map(NtId)
    }

    /// Human-readable name of a terminal, resolving token types.
    pub fn terminal_name(&self, t: &Terminal) -> std::string::String {
        match t {
            Terminal::Token(tt) => match self.token_names.get(tt.0) {
                Some(name) => name.to_string(),
                None => t.to_string(),
            },
            _ => t.to_string(),
        }
    }

    /// Human-readable name of a symbol.
    pub fn symbol_name(&self, s: &Symbol) -> std::string::String {
        match s {
            Symbol::Nt(nt) => self.nt_name(*nt).to_string(),
            Symbol::T(t) => self.terminal_name(t),
        }
    }

    /// Dotted form of a slot, e.g. `S : A • 'b'`.
    pub fn slot_string(&self, id: SlotId) -> std::string::String {
        let slot = self.slot(id);
        let mut out = format!("{} :", self.nt_name(slot.head));
        let symbols = self.slot_symbols(id);
        for (i, s) in symbols.iter().enumerate() {
            if i == slot.pos {
                out.push_str(" •");
            }
            out.push(' ');
            out.push_str(&self.symbol_name(s));
        }
        if slot.pos >= symbols.len() {
            out.push_str(" •");
        }
        out
    }
}
