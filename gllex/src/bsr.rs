//! Binary Subtree Representation of the parse forest.
//!
//! A BSR entry `(slot, lext, pivot, rext)` states that the symbols of an
//! alternate up to `slot` derive the input `[lext, rext)`, with the last
//! of those symbols deriving `[pivot, rext)`. Entries whose slot is at the
//! end of its alternate are *NT entries*: complete derivations of the
//! alternate's head. The remaining entries are *intermediate* and only
//! exist to split long alternates into binary pieces.
//!
//! Entries live in an insertion-ordered arena and are addressed by index.
//! They are never removed; disambiguation marks them as ignored instead.

use crate::input::Input;
use crate::symbol::{NtId, SlotId, Symbol};
use crate::tables::ParserTables;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Write};

/// One BSR entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bsr {
    pub slot: SlotId,
    pub lext: usize,
    pub pivot: usize,
    pub rext: usize,
}

/// A residual ambiguity in a forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// Several NT entries derive `head` over the same extent.
    Alternatives {
        head: NtId,
        lext: usize,
        rext: usize,
        entries: Vec<usize>,
    },
    /// One NT entry splits into its symbols in more than one way.
    Pivots { entry: usize, count: usize },
}

/// The BSR set produced by one parse run.
#[derive(Debug, Clone)]
pub struct BsrSet<'t> {
    tables: &'t ParserTables,
    input_len: usize,
    entries: IndexSet<Bsr>,
    ignored: Vec<bool>,
    nt_index: HashMap<(NtId, usize, usize), Vec<usize>>,
    mid_index: HashMap<(SlotId, usize, usize), Vec<usize>>,
}

impl<'t> BsrSet<'t> {
    /// Creates an empty set for one parse run.
    ///
    /// # Parameters
    /// - `tables`: The parser tables the entries' slots refer to.
    /// - `input_len`: Length of the input, in characters or tokens. A root
    ///   entry spans `[0, input_len)`.
    pub fn new(tables: &'t ParserTables, input_len: usize) -> Self {
        Self {
            tables,
            input_len,
            entries: IndexSet::new(),
            ignored: Vec::new(),
            nt_index: HashMap::new(),
            mid_index: HashMap::new(),
        }
    }

    /// The tables the set was built against.
    pub fn tables(&self) -> &'t ParserTables {
        self.tables
    }

    /// Records that the alternate prefix ending at `slot` derives
    /// `[lext, rext)` split at `pivot`. Slots that are first-of-rule and
    /// not end-of-rule produce nothing. Returns `true` if a new entry was
    /// added.
    pub fn add(&mut self, slot: SlotId, lext: usize, pivot: usize, rext: usize) -> bool {
        let s = self.tables.slot(slot);
        if !s.end_of_rule && s.first_of_rule {
            return false;
        }
        let (idx, new) = self.entries.insert_full(Bsr {
            slot,
            lext,
            pivot,
            rext,
        });
        if new {
            self.ignored.push(false);
            if s.end_of_rule {
                self.nt_index.entry((s.head, lext, rext)).or_default().push(idx);
            } else {
                self.mid_index.entry((slot, lext, rext)).or_default().push(idx);
            }
        }
        new
    }

    /// Number of entries, ignored ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `idx`, ignored or not.
    ///
    /// # Panics
    /// If `idx` is not below [`len`](Self::len).
    pub fn entry(&self, idx: usize) -> &Bsr {
        &self.entries[idx]
    }

    /// Iterates over all entries with their indices, in insertion order.
    /// Ignored entries are included; filter with [`is_ignored`](Self::is_ignored).
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Bsr)> {
        self.entries.iter().enumerate()
    }

    /// `true` if the entry's slot ends its alternate, so it records a complete non-terminal.
    pub fn is_nt_entry(&self, idx: usize) -> bool {
        self.tables.slot(self.entries[idx].slot).end_of_rule
    }

    /// Head non-terminal of the entry's alternate.
    pub fn head(&self, idx: usize) -> NtId {
        self.tables.slot(self.entries[idx].slot).head
    }

    /// Alternate index of the entry.
    pub fn alternate(&self, idx: usize) -> usize {
        self.tables.slot(self.entries[idx].slot).alt
    }

    /// Whether a disambiguation rule has ignored the entry.
    pub fn is_ignored(&self, idx: usize) -> bool {
        self.ignored[idx]
    }

    /// Marks an entry as ignored. Returns `true` if it was not ignored before.
    pub fn ignore(&mut self, idx: usize) -> bool {
        !std::mem::replace(&mut self.ignored[idx], true)
    }

    /// Indices of all NT entries, in insertion order.
    pub fn nt_entry_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.entries.len()).filter(|&i| self.is_nt_entry(i))
    }

    /// Non-ignored NT entries deriving `head` over `[lext, rext)`.
    pub fn nt_entries(&self, head: NtId, lext: usize, rext: usize) -> Vec<usize> {
        self.nt_index
            .get(&(head, lext, rext))
            .map(|v| v.iter().copied().filter(|&i| !self.ignored[i]).collect())
            .unwrap_or_default()
    }

    /// Non-ignored NT entries of the start symbol spanning the whole input.
    pub fn roots(&self) -> Vec<usize> {
        self.nt_entries(self.tables.start, 0, self.input_len)
    }

    /// The single root, if there is exactly one.
    pub fn root(&self) -> Option<usize> {
        match self.roots().as_slice() {
            [r] => Some(*r),
            _ => None,
        }
    }

    /// Source text spanned by an entry.
    pub fn text<'i, I: Input + ?Sized>(&self, idx: usize, input: &'i I) -> &'i str {
        let e = &self.entries[idx];
        input.text(e.lext, e.rext)
    }

    /// Non-ignored intermediate entries of slot (head, alt, pos) over `[lext, rext)`.
    fn mids(
        &self,
        head: NtId,
        alt: usize,
        pos: usize,
        lext: usize,
        rext: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        self.tables
            .slot_at(head, alt, pos)
            .and_then(|slot| self.mid_index.get(&(slot, lext, rext)))
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|&m| !self.ignored[m])
    }

    /// Returns `true` if some non-ignored NT entry derives `head` over `[lext, rext)`.
    pub fn has_nt_entry(&self, head: NtId, lext: usize, rext: usize) -> bool {
        self.nt_index
            .get(&(head, lext, rext))
            .is_some_and(|v| v.iter().any(|&i| !self.ignored[i]))
    }

    /// Returns `true` if entry `idx` can no longer be part of a tree.
    ///
    /// That is the case when its last symbol is a non-terminal with no
    /// surviving derivation over `[pivot, rext)`, or when nothing survives
    /// that derives the symbols before it over `[lext, pivot)`. Applies to
    /// NT and intermediate entries alike.
    pub fn is_orphan(&self, idx: usize) -> bool {
        let e = self.entries[idx];
        let s = self.tables.slot(e.slot);
        if s.pos == 0 {
            return false;
        }
        let symbols = self.tables.slot_symbols(e.slot);
        let derives = |i: usize, l: usize, r: usize| match &symbols[i] {
            Symbol::Nt(x) => self.has_nt_entry(*x, l, r),
            Symbol::T(_) => true,
        };
        if !derives(s.pos - 1, e.pivot, e.rext) {
            return true;
        }
        match s.pos - 1 {
            0 => false,
            1 => !derives(0, e.lext, e.pivot),
            q => self.mids(s.head, s.alt, q, e.lext, e.pivot).next().is_none(),
        }
    }

    /// Every way the first `pos` symbols of (head, alt) can split `[lext, rext)`.
    fn prefixes(
        &self,
        head: NtId,
        alt: usize,
        pos: usize,
        lext: usize,
        rext: usize,
    ) -> Vec<Vec<(usize, usize)>> {
        match pos {
            0 if lext == rext => vec![vec![]],
            0 => vec![],
            1 => vec![vec![(lext, rext)]],
            _ => self
                .mids(head, alt, pos, lext, rext)
                .flat_map(|m| {
                    let pivot = self.entries[m].pivot;
                    let mut v = self.prefixes(head, alt, pos - 1, lext, pivot);
                    v.iter_mut().for_each(|d| d.push((pivot, rext)));
                    v
                })
                .collect(),
        }
    }

    /// Every split of an entry into the extents of its symbols. An epsilon
    /// entry has one empty decomposition.
    pub fn decompositions(&self, idx: usize) -> Vec<Vec<(usize, usize)>> {
        let e = self.entries[idx];
        let s = self.tables.slot(e.slot);
        if s.pos == 0 {
            return vec![vec![]];
        }
        let mut v = self.prefixes(s.head, s.alt, s.pos - 1, e.lext, e.pivot);
        v.iter_mut().for_each(|d| d.push((e.pivot, e.rext)));
        v
    }

    /// Number of decompositions, without enumerating them.
    pub fn decomposition_count(&self, idx: usize) -> usize {
        let e = self.entries[idx];
        let s = self.tables.slot(e.slot);
        if s.pos == 0 {
            return 1;
        }
        let mut memo = HashMap::new();
        self.count_prefixes(s.head, s.alt, s.pos - 1, e.lext, e.pivot, &mut memo)
    }

    fn count_prefixes(
        &self,
        head: NtId,
        alt: usize,
        pos: usize,
        lext: usize,
        rext: usize,
        memo: &mut HashMap<(usize, usize), usize>,
    ) -> usize {
        match pos {
            0 => usize::from(lext == rext),
            1 => 1,
            _ => {
                if let Some(&n) = memo.get(&(pos, rext)) {
                    return n;
                }
                let pivots: Vec<usize> = self
                    .mids(head, alt, pos, lext, rext)
                    .map(|m| self.entries[m].pivot)
                    .collect();
                let n = pivots
                    .into_iter()
                    .map(|p| self.count_prefixes(head, alt, pos - 1, lext, p, memo))
                    .sum();
                memo.insert((pos, rext), n);
                n
            }
        }
    }

    /// Distinct extents of the `i`-th symbol over all decompositions of an entry.
    pub fn symbol_extents(&self, idx: usize, i: usize) -> Vec<(usize, usize)> {
        let e = self.entries[idx];
        let s = self.tables.slot(e.slot);
        if i >= s.pos {
            return vec![];
        }
        if i + 1 == s.pos {
            return vec![(e.pivot, e.rext)];
        }
        // walk back through the intermediate entries covering symbols
        // i+1 .. pos-1, one frontier of right extents per prefix length
        let mut out = IndexSet::new();
        let mut seen = HashSet::new();
        let mut work = VecDeque::from([(s.pos - 1, e.pivot)]);
        while let Some((pos, rext)) = work.pop_front() {
            if !seen.insert((pos, rext)) {
                continue;
            }
            if pos == i + 1 {
                if pos == 1 {
                    out.insert((e.lext, rext));
                } else {
                    for m in self.mids(s.head, s.alt, pos, e.lext, rext) {
                        out.insert((self.entries[m].pivot, rext));
                    }
                }
            } else {
                for m in self.mids(s.head, s.alt, pos, e.lext, rext) {
                    work.push_back((pos - 1, self.entries[m].pivot));
                }
            }
        }
        out.into_iter().collect()
    }

    /// Extents of a terminal at symbol index `i`.
    pub fn t_child(&self, idx: usize, i: usize) -> Vec<(usize, usize)> {
        match self.tables.slot_symbols(self.entries[idx].slot).get(i) {
            Some(Symbol::T(_)) => self.symbol_extents(idx, i),
            _ => vec![],
        }
    }

    /// Non-ignored NT entries that can stand for the `i`-th symbol of an
    /// entry, over all its decompositions. Empty if that symbol is a terminal.
    pub fn nt_children(&self, idx: usize, i: usize) -> Vec<usize> {
        let Some(&Symbol::Nt(x)) = self.tables.slot_symbols(self.entries[idx].slot).get(i) else {
            return vec![];
        };
        let mut out = IndexSet::new();
        for (l, r) in self.symbol_extents(idx, i) {
            out.extend(self.nt_entries(x, l, r));
        }
        out.into_iter().collect()
    }

    /// Ambiguities reachable from the roots, in breadth-first order. More
    /// than one root counts as an ambiguity of the start symbol.
    pub fn ambiguities(&self) -> Vec<Ambiguity> {
        let mut found = Vec::new();
        let roots = self.roots();
        if roots.len() > 1 {
            found.push(Ambiguity::Alternatives {
                head: self.tables.start,
                lext: 0,
                rext: self.input_len,
                entries: roots.clone(),
            });
        }
        let mut spans = HashSet::from([(self.tables.start, 0, self.input_len)]);
        let mut seen = HashSet::new();
        let mut work: VecDeque<usize> = roots.into();
        while let Some(idx) = work.pop_front() {
            if !seen.insert(idx) {
                continue;
            }
            let count = self.decomposition_count(idx);
            if count > 1 {
                found.push(Ambiguity::Pivots { entry: idx, count });
            }
            let symbols = self.tables.slot_symbols(self.entries[idx].slot);
            for (i, sym) in symbols.iter().enumerate() {
                let Symbol::Nt(x) = *sym else { continue };
                for (l, r) in self.symbol_extents(idx, i) {
                    let children = self.nt_entries(x, l, r);
                    if spans.insert((x, l, r)) && children.len() > 1 {
                        found.push(Ambiguity::Alternatives {
                            head: x,
                            lext: l,
                            rext: r,
                            entries: children.clone(),
                        });
                    }
                    work.extend(children);
                }
            }
        }
        found
    }

    /// `true` if [`ambiguities`](Self::ambiguities) finds anything.
    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguities().is_empty()
    }

    /// Writes a human-readable ambiguity report.
    pub fn write_report<W: Write, I: Input + ?Sized>(
        &self,
        out: &mut W,
        input: &I,
    ) -> io::Result<()> {
        let roots = self.roots();
        writeln!(out, "entries: {}", self.entries.len())?;
        writeln!(
            out,
            "ignored: {}",
            self.ignored.iter().filter(|&&b| b).count()
        )?;
        writeln!(out, "roots: {}", roots.len())?;
        let ambiguities = self.ambiguities();
        if ambiguities.is_empty() {
            writeln!(out, "no ambiguities")?;
            return Ok(());
        }
        for a in ambiguities {
            match a {
                Ambiguity::Alternatives {
                    head,
                    lext,
                    rext,
                    entries,
                } => {
                    writeln!(
                        out,
                        "ambiguous {} {}..{} {:?}: {} derivations",
                        self.tables.nt_name(head),
                        lext,
                        rext,
                        input.text(lext, rext),
                        entries.len()
                    )?;
                    for i in entries {
                        writeln!(out, "    {}", self.describe(i))?;
                    }
                }
                Ambiguity::Pivots { entry, count } => {
                    writeln!(
                        out,
                        "ambiguous split of {} {:?}: {} ways",
                        self.describe(entry),
                        self.text(entry, input),
                        count
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Same as [`BsrSet::write_report`], into a string.
    pub fn ambiguity_report<I: Input + ?Sized>(&self, input: &I) -> String {
        let mut buf = Vec::new();
        let _ = self.write_report(&mut buf, input);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn describe(&self, idx: usize) -> String {
        let e = &self.entries[idx];
        format!(
            "{} ({}, {}, {}) {}",
            self.tables.slot(e.slot).label,
            e.lext,
            e.pivot,
            e.rext,
            self.tables.slot_string(e.slot)
        )
    }

    /// Writes every entry, one per line.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (i, _) in self.iter() {
            let mark = if self.ignored[i] { " ignored" } else { "" };
            writeln!(out, "{i}: {}{mark}", self.describe(i))?;
        }
        Ok(())
    }
}
