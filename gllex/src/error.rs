//! Source locations and runtime error types.
//!
//! [`Position`] locates diagnostics in the text being parsed and
//! [`LineIndex`] converts byte offsets into 1-based line/column positions.
//! [`ParseError`] is the failure report of the GLL engine and [`GllError`]
//! wraps it together with the policy errors a caller can provoke.
//!
//! # Examples
//!
//! ```rust
//! # use gllex::{LineIndex, Position};
//! let text = "ab\ncd";
//! let lines = LineIndex::new(text);
//! assert_eq!(lines.position(4), Position::new(2, 2));
//! ```

use crate::symbol::Terminal;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A 1-based line/column position in source text.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number (character position in the line).
    pub column: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of a text to line/column positions.
///
/// Line starts are computed once; each lookup is a binary search followed
/// by a character count within the line.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Indexes the line starts of `text`.
    pub fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    /// Returns the position of byte `offset`. Offsets past the end map to
    /// the position just after the last character.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.starts.partition_point(|&s| s <= offset);
        let start = self.starts[line - 1];
        let column = self
            .text
            .get(start..offset)
            .map_or(offset - start, |s| s.chars().count());
        Position::new(line, column + 1)
    }
}

/// A GLL parse failure.
///
/// The engine reports the furthest input position at which a test-select,
/// a terminal match or a follow check failed, merging every terminal that
/// would have been acceptable there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {position}: unexpected {found}, expected one of {}", .expected_names.join(", "))]
pub struct ParseError {
    /// Input position of the failure (token index or byte offset).
    pub pos: usize,
    /// Line/column of the failure in the source text.
    pub position: Position,
    /// Description of what was found at `pos`.
    pub found: String,
    /// Terminals that would have been accepted at `pos`.
    pub expected: BTreeSet<Terminal>,
    /// Display names of `expected`, in the same order.
    pub expected_names: Vec<String>,
}

/// Errors returned by [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GllError {
    /// The input does not belong to the language.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The caller's descriptor budget was exhausted.
    #[error("descriptor limit of {limit} exceeded at input position {pos}")]
    DescriptorLimit {
        /// The configured limit.
        limit: usize,
        /// Input position of the descriptor that exceeded it.
        pos: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_positions() {
        let text = "one\ntwo\n\nthree";
        let lines = LineIndex::new(text);
        assert_eq!(lines.position(0), Position::new(1, 1));
        assert_eq!(lines.position(2), Position::new(1, 3));
        assert_eq!(lines.position(4), Position::new(2, 1));
        assert_eq!(lines.position(9), Position::new(4, 1));
        assert_eq!(lines.position(100), Position::new(4, 6));
    }

    #[test]
    fn columns_count_characters() {
        let text = "αβ x";
        let lines = LineIndex::new(text);
        let x = text.find('x').unwrap();
        assert_eq!(lines.position(x), Position::new(1, 4));
    }

    #[test]
    fn parse_error_message_lists_expected() {
        let err = ParseError {
            pos: 0,
            position: Position::new(1, 1),
            found: "'c'".into(),
            expected: BTreeSet::new(),
            expected_names: vec!["'a'".into(), "'b'".into()],
        };
        assert_eq!(
            err.to_string(),
            "parse error at 1:1: unexpected 'c', expected one of 'a', 'b'"
        );
        let err: GllError = err.into();
        assert!(matches!(err, GllError::Parse(_)));
    }
}
