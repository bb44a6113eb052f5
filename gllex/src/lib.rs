//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! GLL parsing runtime.
//!
//! `gllex` interprets the tables produced by `gllex-gen`:
//!  * **lexing** with a table-driven DFA ([`Lexer`], [`LexerTables`])
//!  * **parsing** with the GLL algorithm over a graph-structured stack,
//!    producing a Binary Subtree Representation forest ([`parse`], [`BsrSet`])
//!  * **disambiguation** of the forest ([`Disambiguator`])
//!  * **tree building** once a single derivation is left ([`build_tree`])
//!
//! Any context-free grammar is accepted, ambiguous and left-recursive
//! ones included.

mod bsr;
mod charclass;
mod disambiguate;
mod error;
mod gss;
mod input;
mod lexer;
mod parser;
mod symbol;
mod tables;
mod tree;

#[cfg(test)]
mod test_tables;

pub use crate::bsr::{Ambiguity, Bsr, BsrSet};
pub use crate::charclass::CharClass;
pub use crate::disambiguate::{
    DisambiguationStats, Disambiguator, RESERVED_WORDS, remove_orphans,
};
pub use crate::error::{GllError, LineIndex, ParseError, Position};
pub use crate::gss::{Gss, GssNode};
pub use crate::input::{CharInput, Input, SourceInput, TokenInput};
pub use crate::lexer::{Lexer, LexerState, LexerStats, LexerTables, Token};
pub use crate::parser::{ParseOptions, ParseResult, ParserStats, parse};
pub use crate::symbol::{NtId, SlotId, Symbol, Terminal, TokenType};
pub use crate::tables::{ParserTables, Slot};
pub use crate::tree::{Tree, TreeError, build_tree};
