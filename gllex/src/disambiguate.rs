//! Post-parse disambiguation of a BSR forest.
//!
//! Two rules are applied, both of which only mark entries as ignored:
//!
//! * **Reserved words.** An NT entry whose head is guarded by a reserved
//!   word list and whose spanned text is one of those words is ignored.
//!   This is how keywords stop being parsed as identifiers.
//! * **Orphans.** An entry whose last symbol, or whose prefix, has no
//!   surviving derivation cannot be part of any tree and is ignored.
//!   Intermediate entries are checked too, so a pruned child also prunes
//!   the splits built on it. Ignoring one entry can orphan its parents,
//!   so this repeats until a pass changes nothing.

use crate::bsr::BsrSet;
use crate::input::Input;
use crate::symbol::NtId;
use std::collections::{BTreeSet, HashMap};

/// Keywords of the grammar notation itself, the default reserved words.
pub const RESERVED_WORDS: &[&str] = &[
    "empty", "any", "anyof", "letter", "number", "space", "upcase", "lowcase", "not",
];

/// Outcome of a disambiguation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisambiguationStats {
    /// Entries ignored for spanning a reserved word.
    pub reserved: usize,
    /// Entries ignored as orphans.
    pub orphans: usize,
    /// Orphan passes, the final quiet pass included.
    pub passes: usize,
}

/// Configurable disambiguation pass.
#[derive(Debug, Clone, Default)]
pub struct Disambiguator {
    reserved: HashMap<NtId, BTreeSet<String>>,
}

impl Disambiguator {
    /// A disambiguator with no reserved-word guards; it only removes orphans.
    pub fn new() -> Self {
        Self::default()
    }

    /// Guards `heads` against deriving any of `words`.
    pub fn reserved<W, S>(mut self, heads: impl IntoIterator<Item = NtId>, words: W) -> Self
    where
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: BTreeSet<String> = words.into_iter().map(Into::into).collect();
        for head in heads {
            self.reserved
                .entry(head)
                .or_default()
                .extend(words.iter().cloned());
        }
        self
    }

    /// Applies both rules to `bsr`.
    pub fn run<I: Input + ?Sized>(&self, bsr: &mut BsrSet<'_>, input: &I) -> DisambiguationStats {
        let reserved = self.ignore_reserved(bsr, input);
        let before = ignored_count(bsr);
        let passes = remove_orphans(bsr);
        let stats = DisambiguationStats {
            reserved,
            orphans: ignored_count(bsr) - before,
            passes,
        };
        log::debug!(
            "disambiguation: {} reserved, {} orphans in {} passes, {} roots left",
            stats.reserved,
            stats.orphans,
            stats.passes,
            bsr.roots().len()
        );
        stats
    }

    fn ignore_reserved<I: Input + ?Sized>(&self, bsr: &mut BsrSet<'_>, input: &I) -> usize {
        if self.reserved.is_empty() {
            return 0;
        }
        let hits: Vec<usize> = bsr
            .nt_entry_indices()
            .filter(|&idx| !bsr.is_ignored(idx))
            .filter(|&idx| {
                self.reserved
                    .get(&bsr.head(idx))
                    .is_some_and(|words| words.contains(bsr.text(idx, input)))
            })
            .collect();
        for &idx in &hits {
            log::trace!(
                "reserved word {:?} as {}",
                bsr.text(idx, input),
                bsr.tables().nt_name(bsr.head(idx))
            );
            bsr.ignore(idx);
        }
        hits.len()
    }
}

fn ignored_count(bsr: &BsrSet<'_>) -> usize {
    (0..bsr.len()).filter(|&i| bsr.is_ignored(i)).count()
}

/// Ignores orphaned entries, NT and intermediate, until a pass ignores
/// nothing. Returns the number of passes, the quiet one included.
pub fn remove_orphans(bsr: &mut BsrSet<'_>) -> usize {
    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for idx in 0..bsr.len() {
            if !bsr.is_ignored(idx) && bsr.is_orphan(idx) {
                bsr.ignore(idx);
                changed = true;
            }
        }
        if !changed {
            return passes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CharInput;
    use crate::parser::{ParseOptions, parse};
    use crate::test_tables::{ambiguous, chain};

    #[test]
    fn reserved_word_removes_one_derivation() {
        let tables = ambiguous();
        let input = CharInput::new("a");
        let mut res = parse(&tables, &input, &ParseOptions::default()).unwrap();
        assert_eq!(res.bsr.roots().len(), 2);

        let b = tables.nt_by_name("B").unwrap();
        let stats = Disambiguator::new()
            .reserved([b], ["a"])
            .run(&mut res.bsr, &input);
        assert_eq!(stats.reserved, 1);
        assert_eq!(stats.orphans, 1);
        let root = res.bsr.root().unwrap();
        assert_eq!(res.bsr.alternate(root), 0);
        assert!(!res.bsr.is_ambiguous());
    }

    #[test]
    fn orphans_propagate_and_converge() {
        let tables = chain();
        let input = CharInput::new("x");
        let mut res = parse(&tables, &input, &ParseOptions::default()).unwrap();
        assert_eq!(res.bsr.roots().len(), 2);

        let d = tables.nt_by_name("D").unwrap();
        let stats = Disambiguator::new()
            .reserved([d], ["x"])
            .run(&mut res.bsr, &input);
        assert_eq!(stats.reserved, 1);
        // C, B and S via B are orphaned
        assert_eq!(stats.orphans, 3);
        assert!(stats.passes <= 4);
        assert_eq!(res.bsr.roots().len(), 1);

        // a second run has nothing left to do
        assert_eq!(remove_orphans(&mut res.bsr), 1);
    }

    #[test]
    fn default_words_do_not_touch_unguarded_heads() {
        let tables = ambiguous();
        let input = CharInput::new("a");
        let mut res = parse(&tables, &input, &ParseOptions::default()).unwrap();
        let stats = Disambiguator::new().run(&mut res.bsr, &input);
        assert_eq!(stats, DisambiguationStats { reserved: 0, orphans: 0, passes: 1 });
        assert!(RESERVED_WORDS.contains(&"anyof"));
    }
}
