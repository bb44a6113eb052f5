//! The GLL engine.
//!
//! The engine interprets [`ParserTables`] with the Clustered Nonterminal
//! Parsing formulation of GLL: descriptors `(slot, k, i)` say "resume the
//! alternate at `slot`, whose rule instance started at `k`, at input
//! position `i`". A FIFO worklist `R` holds pending descriptors and the
//! set `U` makes sure each one is processed once. Calls share GSS cluster
//! nodes keyed by (non-terminal, position), and every recognized piece of
//! an alternate is recorded in the [`BsrSet`].
//!
//! Failures never stop the run: each failed test-select, terminal match or
//! follow check is recorded, and only the furthest position (with all
//! terminals expected there) is reported if no root is produced.

use crate::bsr::BsrSet;
use crate::error::{GllError, ParseError};
use crate::gss::Gss;
use crate::input::Input;
use crate::symbol::{NtId, SlotId, Symbol, Terminal};
use crate::tables::ParserTables;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Policy knobs of a parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Stop with [`GllError::DescriptorLimit`] after this many descriptors.
    pub max_descriptors: Option<usize>,
}

/// Counters collected during a parse run.
#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub descriptors: usize,
    pub gss_nodes: usize,
    pub gss_edges: usize,
    pub bsr_entries: usize,
    pub errors: usize,
}

/// A successful parse: the forest and the stack it was built with.
#[derive(Debug)]
pub struct ParseResult<'t> {
    pub bsr: BsrSet<'t>,
    pub gss: Gss,
    pub stats: ParserStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Descriptor {
    slot: SlotId,
    k: usize,
    i: usize,
}

struct Gll<'t, 'i, I: Input + ?Sized> {
    tables: &'t ParserTables,
    input: &'i I,
    r: VecDeque<Descriptor>,
    u: HashSet<Descriptor>,
    gss: Gss,
    bsr: BsrSet<'t>,
    failure: Option<(usize, BTreeSet<Terminal>)>,
    stats: ParserStats,
}

/// Parses `input` with `tables`.
///
/// Returns the BSR forest if at least one derivation of the start symbol
/// spans the whole input, otherwise the furthest parse error.
///
/// # Errors
///
/// [`GllError::Parse`] if the input is not in the language and
/// [`GllError::DescriptorLimit`] if `options` caps the work and the cap is hit.
pub fn parse<'t, I: Input + ?Sized>(
    tables: &'t ParserTables,
    input: &I,
    options: &ParseOptions,
) -> Result<ParseResult<'t>, GllError> {
    let mut gll = Gll {
        tables,
        input,
        r: VecDeque::new(),
        u: HashSet::new(),
        gss: Gss::new(),
        bsr: BsrSet::new(tables, input.len()),
        failure: None,
        stats: ParserStats::default(),
    };
    gll.run(options)?;

    gll.stats.gss_nodes = gll.gss.len();
    gll.stats.gss_edges = gll.gss.edge_count();
    gll.stats.bsr_entries = gll.bsr.len();
    log::debug!(
        "parsed {} positions: {} descriptors, {} GSS nodes, {} GSS edges, {} BSR entries",
        input.len(),
        gll.stats.descriptors,
        gll.stats.gss_nodes,
        gll.stats.gss_edges,
        gll.stats.bsr_entries
    );

    if gll.bsr.roots().is_empty() {
        return Err(gll.error().into());
    }
    Ok(ParseResult {
        bsr: gll.bsr,
        gss: gll.gss,
        stats: gll.stats,
    })
}

impl<'t, I: Input + ?Sized> Gll<'t, '_, I> {
    fn run(&mut self, options: &ParseOptions) -> Result<(), GllError> {
        let start = self.tables.start;
        self.gss.ensure(start, 0);
        self.nt_add(start, 0);
        while let Some(d) = self.r.pop_front() {
            self.stats.descriptors += 1;
            if let Some(limit) = options.max_descriptors {
                if self.stats.descriptors > limit {
                    return Err(GllError::DescriptorLimit { limit, pos: d.i });
                }
            }
            if log::log_enabled!(log::Level::Trace) {
                log::trace!(
                    "{}: {} k={} i={}",
                    self.tables.slot(d.slot).label,
                    self.tables.slot_string(d.slot),
                    d.k,
                    d.i
                );
            }
            self.process(d);
        }
        Ok(())
    }

    fn slot_id(&self, head: NtId, alt: usize, pos: usize) -> SlotId {
        self.tables
            .slot_at(head, alt, pos)
            .unwrap_or_else(|| panic!("no slot for {}:{alt}:{pos}", self.tables.nt_name(head)))
    }

    fn process(&mut self, d: Descriptor) {
        let tables = self.tables;
        let Descriptor { slot, k, mut i } = d;
        let s = tables.slot(slot);
        let (head, alt) = (s.head, s.alt);
        let symbols = &tables.alternates(head)[alt];

        if symbols.is_empty() {
            self.bsr.add(slot, k, i, i);
            self.end_of_rule(head, k, i);
            return;
        }

        for pos in s.pos..symbols.len() {
            let pre = self.slot_id(head, alt, pos);
            if pos > 0 && !self.input.test(i, &tables.select[pre.0]) {
                self.fail(i, &tables.select[pre.0]);
                return;
            }
            let post = self.slot_id(head, alt, pos + 1);
            match &symbols[pos] {
                Symbol::T(t) => match self.input.match_terminal(i, t) {
                    Some(j) => {
                        self.bsr.add(post, k, i, j);
                        i = j;
                    }
                    None => {
                        self.fail(i, &BTreeSet::from([t.clone()]));
                        return;
                    }
                },
                Symbol::Nt(x) => {
                    self.call(post, k, i, *x);
                    return;
                }
            }
        }
        self.end_of_rule(head, k, i);
    }

    fn end_of_rule(&mut self, head: NtId, k: usize, i: usize) {
        let tables = self.tables;
        let follow = &tables.follow[head.0];
        if self.input.test(i, follow) {
            self.rtn(head, k, i);
        } else {
            self.fail(i, follow);
        }
    }

    /// Schedules every alternate of `x` whose select set passes at `j`.
    fn nt_add(&mut self, x: NtId, j: usize) {
        let tables = self.tables;
        let mut expected = BTreeSet::new();
        let mut scheduled = false;
        for alt in 0..tables.alternates(x).len() {
            let slot = self.slot_id(x, alt, 0);
            let select = &tables.select[slot.0];
            if self.input.test(j, select) {
                self.dsc_add(slot, j, j);
                scheduled = true;
            } else {
                expected.extend(select.iter().cloned());
            }
        }
        if !scheduled {
            self.fail(j, &expected);
        }
    }

    /// Calls `x` at `j` from a rule instance starting at `k`; `ret` is the
    /// slot after `x`.
    fn call(&mut self, ret: SlotId, k: usize, j: usize, x: NtId) {
        let created = self.gss.ensure(x, j);
        let Some(popped) = self.gss.add_edge(x, j, ret, k) else {
            return;
        };
        for h in popped {
            self.dsc_add(ret, k, h);
            self.bsr.add(ret, k, j, h);
        }
        if created {
            self.nt_add(x, j);
        }
    }

    /// Returns from the call of `x` at `k` with right extent `j`.
    fn rtn(&mut self, x: NtId, k: usize, j: usize) {
        let Some(edges) = self.gss.pop(x, k, j) else {
            return;
        };
        for (ret, i) in edges {
            self.dsc_add(ret, i, j);
            self.bsr.add(ret, i, k, j);
        }
    }

    fn dsc_add(&mut self, slot: SlotId, k: usize, i: usize) {
        let d = Descriptor { slot, k, i };
        if self.u.insert(d) {
            self.r.push_back(d);
        }
    }

    /// Keeps the furthest failure, merging the expected terminals of
    /// failures at the same position.
    fn fail(&mut self, pos: usize, expected: &BTreeSet<Terminal>) {
        self.stats.errors += 1;
        match &mut self.failure {
            Some((p, set)) if *p == pos => {
                set.extend(expected.iter().cloned());
                return;
            }
            Some((p, _)) if *p > pos => return,
            _ => {}
        }
        self.failure = Some((pos, expected.clone()));
    }

    fn error(&self) -> ParseError {
        let (pos, expected) = match &self.failure {
            Some((pos, set)) => (*pos, set.clone()),
            None => (self.input.len(), BTreeSet::from([Terminal::End])),
        };
        ParseError {
            pos,
            position: self.input.position(pos),
            found: self.input.describe(pos),
            expected_names: expected
                .iter()
                .map(|t| self.tables.terminal_name(t))
                .collect(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CharInput;
    use crate::test_tables::{a_star, ambiguous, ch};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn right_recursion_accepts_any_count() {
        init_logger();
        let tables = a_star();
        for text in ["", "a", "aaaa"] {
            let res = parse(&tables, &CharInput::new(text), &ParseOptions::default()).unwrap();
            assert_eq!(res.bsr.roots().len(), 1, "{text:?}");
            assert!(!res.bsr.is_ambiguous());
            // one cluster node per position
            assert_eq!(res.gss.len(), text.len() + 1);
        }
    }

    #[test]
    fn furthest_failure_is_reported() {
        let tables = a_star();
        let err = parse(&tables, &CharInput::new("aab"), &ParseOptions::default()).unwrap_err();
        let GllError::Parse(err) = err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(err.pos, 2);
        assert_eq!(err.expected, BTreeSet::from([ch('a'), Terminal::End]));
        assert_eq!(err.found, "'b'");
        assert_eq!(
            err.to_string(),
            "parse error at 1:3: unexpected 'b', expected one of 'a', $"
        );
    }

    #[test]
    fn descriptor_limit_stops_the_run() {
        let tables = a_star();
        let options = ParseOptions {
            max_descriptors: Some(2),
        };
        let err = parse(&tables, &CharInput::new("aaaa"), &options).unwrap_err();
        assert_eq!(err, GllError::DescriptorLimit { limit: 2, pos: 2 });
    }

    #[test]
    fn ambiguous_input_keeps_both_derivations() {
        let tables = ambiguous();
        let input = CharInput::new("a");
        let res = parse(&tables, &input, &ParseOptions::default()).unwrap();
        let roots = res.bsr.roots();
        assert_eq!(roots.len(), 2);
        let alts: BTreeSet<_> = roots.iter().map(|&r| res.bsr.alternate(r)).collect();
        assert_eq!(alts, BTreeSet::from([0, 1]));
        assert!(res.bsr.is_ambiguous());
        assert!(res.bsr.root().is_none());
    }

    #[test]
    fn same_input_gives_same_forest() {
        let tables = ambiguous();
        let input = CharInput::new("aaa");
        let a = parse(&tables, &input, &ParseOptions::default()).unwrap();
        let b = parse(&tables, &input, &ParseOptions::default()).unwrap();
        let ea: Vec<_> = a.bsr.iter().map(|(_, e)| *e).collect();
        let eb: Vec<_> = b.bsr.iter().map(|(_, e)| *e).collect();
        assert_eq!(ea, eb);
        let unique: HashSet<_> = ea.iter().collect();
        assert_eq!(unique.len(), ea.len());
        assert_eq!(a.stats.bsr_entries, ea.len());
    }
}
