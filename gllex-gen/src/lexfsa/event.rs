//! Transition events: the character classes a lexer state can read next.
//!
//! Events out of a state are tried in order at run time, so a class must
//! come before every class that strictly contains it. Events that overlap
//! without one containing the other cannot be ordered and make the
//! grammar lexically ambiguous.

use gllex::CharClass;
use std::collections::BTreeSet;

fn is_unicode(c: &CharClass) -> bool {
    c.is_unicode_class()
}

/// Returns `true` if every character of `a` is in `b`.
///
/// Distinct built-in unicode classes are disjoint, except that `upcase`
/// and `lowcase` are part of `letter`.
pub fn is_subset(a: &CharClass, b: &CharClass) -> bool {
    use CharClass::*;
    match (a, b) {
        (_, Any) => true,
        (Any, _) => false,
        (Char(c), _) => b.matches(*c),
        (AnyOf(set), _) => set.iter().all(|c| b.matches(*c)),
        (Not(x), Not(y)) => y.is_subset(x),
        (Not(_), _) => false,
        (Upcase | Lowcase, Letter) => true,
        (u, v) if is_unicode(u) && is_unicode(v) => u == v,
        (u, Not(set)) => set.iter().all(|c| !u.matches(*c)),
        _ => false,
    }
}

/// Returns `true` if `a` and `b` may share a character.
pub fn overlaps(a: &CharClass, b: &CharClass) -> bool {
    use CharClass::*;
    match (a, b) {
        (Any, _) | (_, Any) => true,
        (Char(c), x) | (x, Char(c)) => x.matches(*c),
        (AnyOf(set), x) | (x, AnyOf(set)) => set.iter().any(|c| x.matches(*c)),
        (Not(_), _) | (_, Not(_)) => true,
        (Upcase | Lowcase, Letter) | (Letter, Upcase | Lowcase) => true,
        (u, v) => u == v,
    }
}

/// Overlapping events neither of which contains the other.
pub fn incomparable(events: &BTreeSet<CharClass>) -> Vec<(CharClass, CharClass)> {
    let events: Vec<_> = events.iter().collect();
    let mut pairs = Vec::new();
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            if overlaps(a, b) && !is_subset(a, b) && !is_subset(b, a) {
                pairs.push(((*a).clone(), (*b).clone()));
            }
        }
    }
    pairs
}

/// Orders events so that every strict subset precedes its supersets.
///
/// Among the events with no remaining strict subset the smallest by kind
/// rank, then value, goes first: single characters, sets, the unicode
/// classes, `not`, and `any` last.
///
/// # Errors
/// Returns the incomparable overlapping pairs if there are any.
pub fn ordered(
    events: &BTreeSet<CharClass>,
) -> Result<Vec<CharClass>, Vec<(CharClass, CharClass)>> {
    let pairs = incomparable(events);
    if !pairs.is_empty() {
        return Err(pairs);
    }
    let mut rest: Vec<&CharClass> = events.iter().collect();
    let mut out = Vec::with_capacity(rest.len());
    while !rest.is_empty() {
        // `rest` is sorted, so the first minimal event is the smallest.
        let idx = rest
            .iter()
            .position(|e| !rest.iter().any(|o| o != e && is_subset(o, e)))
            .unwrap_or(0);
        out.push(rest.remove(idx).clone());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharClass::*;

    fn set(s: &str) -> BTreeSet<char> {
        s.chars().collect()
    }

    #[test]
    fn subsets() {
        assert!(is_subset(&Char('a'), &Letter));
        assert!(is_subset(&Char('a'), &AnyOf(set("abc"))));
        assert!(!is_subset(&AnyOf(set("abc")), &Char('a')));
        assert!(is_subset(&AnyOf(set("ab")), &Lowcase));
        assert!(is_subset(&Upcase, &Letter));
        assert!(!is_subset(&Letter, &Upcase));
        assert!(!is_subset(&Number, &Letter));
        assert!(is_subset(&Not(set("ab")), &Not(set("a"))));
        assert!(is_subset(&Letter, &Not(set("\n"))));
        assert!(!is_subset(&Letter, &Not(set("x"))));
        assert!(is_subset(&Not(set("x")), &Any));
        assert!(!is_subset(&Any, &Not(set("x"))));
    }

    #[test]
    fn ordering_puts_subsets_first() {
        let events = BTreeSet::from([Any, Letter, Char('z'), Number, Upcase, AnyOf(set("xy"))]);
        assert_eq!(
            ordered(&events).unwrap(),
            vec![Char('z'), AnyOf(set("xy")), Upcase, Letter, Number, Any]
        );

        let events = BTreeSet::from([Not(set("\"")), Char('"'), Char('\\')]);
        assert_eq!(
            ordered(&events).unwrap(),
            vec![Char('"'), Char('\\'), Not(set("\""))]
        );
    }

    #[test]
    fn overlapping_events_are_rejected() {
        let events = BTreeSet::from([AnyOf(set("a1")), Letter, Char('b')]);
        assert_eq!(ordered(&events), Err(vec![(AnyOf(set("a1")), Letter)]));

        let events = BTreeSet::from([Not(set("\n")), AnyOf(set("\n\t"))]);
        assert_eq!(incomparable(&events).len(), 1);
    }
}
