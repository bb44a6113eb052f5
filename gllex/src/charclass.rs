//! Character terminals shared by lexical rules and character-level parsing.

use std::collections::BTreeSet;
use std::fmt;

/// A set of characters named by a grammar terminal.
///
/// The variant order is the specificity rank used when lexer transitions
/// that are not ordered by inclusion have to be ordered anyway, so the
/// derived `Ord` is meaningful: single characters first, `any` last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharClass {
    /// A single character, e.g. `'a'`.
    Char(char),
    /// `anyof "abc"`.
    AnyOf(BTreeSet<char>),
    /// `upcase`.
    Upcase,
    /// `lowcase`.
    Lowcase,
    /// `letter`.
    Letter,
    /// `number`.
    Number,
    /// `space`.
    Space,
    /// `not "abc"`: any character outside the set.
    Not(BTreeSet<char>),
    /// `any` (also written `.`).
    Any,
}

impl CharClass {
    /// Returns `true` if `c` belongs to this class.
    pub fn matches(&self, c: char) -> bool {
        match self {
            CharClass::Char(x) => *x == c,
            CharClass::AnyOf(set) => set.contains(&c),
            CharClass::Upcase => c.is_uppercase(),
            CharClass::Lowcase => c.is_lowercase(),
            CharClass::Letter => c.is_alphabetic(),
            CharClass::Number => c.is_numeric(),
            CharClass::Space => c.is_whitespace(),
            CharClass::Not(set) => !set.contains(&c),
            CharClass::Any => true,
        }
    }

    /// The explicit members of a finite class.
    pub fn members(&self) -> Option<BTreeSet<char>> {
        match self {
            CharClass::Char(c) => Some(BTreeSet::from([*c])),
            CharClass::AnyOf(set) => Some(set.clone()),
            _ => None,
        }
    }

    /// Returns `true` for the built-in unicode classes.
    pub fn is_unicode_class(&self) -> bool {
        matches!(
            self,
            CharClass::Upcase
                | CharClass::Lowcase
                | CharClass::Letter
                | CharClass::Number
                | CharClass::Space
        )
    }
}

fn quoted(set: &BTreeSet<char>) -> String {
    format!("{:?}", set.iter().collect::<String>())
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharClass::Char(c) => write!(f, "{c:?}"),
            CharClass::AnyOf(set) => write!(f, "anyof {}", quoted(set)),
            CharClass::Upcase => f.write_str("upcase"),
            CharClass::Lowcase => f.write_str("lowcase"),
            CharClass::Letter => f.write_str("letter"),
            CharClass::Number => f.write_str("number"),
            CharClass::Space => f.write_str("space"),
            CharClass::Not(set) => write!(f, "not {}", quoted(set)),
            CharClass::Any => f.write_str("any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> BTreeSet<char> {
        s.chars().collect()
    }

    #[test]
    fn class_membership() {
        assert!(CharClass::Char('x').matches('x'));
        assert!(!CharClass::Char('x').matches('y'));
        assert!(CharClass::AnyOf(set("+-")).matches('-'));
        assert!(CharClass::Not(set("\n")).matches('a'));
        assert!(!CharClass::Not(set("\n")).matches('\n'));
        assert!(CharClass::Letter.matches('ж'));
        assert!(CharClass::Upcase.matches('Q'));
        assert!(!CharClass::Lowcase.matches('Q'));
        assert!(CharClass::Number.matches('7'));
        assert!(CharClass::Space.matches('\t'));
        assert!(CharClass::Any.matches('\u{1F600}'));
    }

    #[test]
    fn display_round_trips_grammar_syntax() {
        assert_eq!(CharClass::Char('a').to_string(), "'a'");
        assert_eq!(CharClass::Char('\n').to_string(), "'\\n'");
        assert_eq!(CharClass::AnyOf(set("ba")).to_string(), "anyof \"ab\"");
        assert_eq!(CharClass::Not(set("\"")).to_string(), "not \"\\\"\"");
        assert_eq!(CharClass::Any.to_string(), "any");
    }

    #[test]
    fn rank_orders_specific_first() {
        let mut v = vec![
            CharClass::Any,
            CharClass::Letter,
            CharClass::Not(set("a")),
            CharClass::Char('z'),
            CharClass::AnyOf(set("ab")),
            CharClass::Upcase,
        ];
        v.sort();
        assert_eq!(v[0], CharClass::Char('z'));
        assert_eq!(v[1], CharClass::AnyOf(set("ab")));
        assert_eq!(v[2], CharClass::Upcase);
        assert_eq!(v[3], CharClass::Letter);
        assert_eq!(v[5], CharClass::Any);
    }
}
