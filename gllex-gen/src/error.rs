//! Errors reported while turning a grammar into tables.

use gllex::Position;
use std::fmt;
use thiserror::Error;

/// A located message about the grammar source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    /// Creates a diagnostic at `position`.
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

fn lines<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|d| format!("  {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn never_called(names: &[String]) -> String {
    names
        .iter()
        .map(|nt| format!("production {nt} has empty follow set; it is never called"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn event_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(a, b)| format!("{a} / {b}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The grammar source is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The source does not follow the grammar notation.
    #[error("syntax errors in grammar:\n{}", lines(.0))]
    Syntax(Vec<Diagnostic>),

    /// The grammar is well-formed but inconsistent.
    #[error("semantic errors in grammar:\n{}", lines(.0))]
    Semantic(Vec<Diagnostic>),
}

impl GrammarError {
    /// All diagnostics, in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            GrammarError::Syntax(d) | GrammarError::Semantic(d) => d,
        }
    }
}

/// A consistent grammar for which no tables can be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Non-terminals that can never be called.
    #[error("{}", never_called(.0))]
    EmptyFollow(Vec<String>),

    /// Transition events of a lexer state that overlap without one
    /// containing the other.
    #[error("lexical ambiguity in state S{state}: overlapping events {}\nitems:\n{}", event_pairs(.pairs), lines(.items))]
    OverlappingEvents {
        state: usize,
        items: Vec<String>,
        pairs: Vec<(String, String)>,
    },

    /// More than one literal accepted by the same lexer state.
    #[error("literals {} accepted by the same state S{state}\nitems:\n{}", .literals.join(", "), lines(.items))]
    MultipleLiterals {
        state: usize,
        literals: Vec<String>,
        items: Vec<String>,
    },
}
