//! Lexical item sets: the scanner DFA of a token grammar.
//!
//! Every lexical rule and every literal used by the syntax rules is a
//! regular expression over character classes. An [`item::Item`] is a rule
//! with a dot position, tracked through nested brackets by a [`pos::Pos`]
//! stack. [`ItemSets::build`] computes the canonical item sets, orders the
//! transitions of each state by specificity (see [`event`]) and decides
//! which token type each state accepts.

pub mod event;
pub mod item;
mod items;
pub mod pos;

pub use items::{ItemSet, ItemSets, write_item_sets};
