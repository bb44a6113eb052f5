//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! GLL parser generator.
//!
//! `gllex-gen` turns a grammar into the tables the `gllex` runtime runs on:
//!  * **front end**: the grammar notation, optionally embedded in Markdown
//!    ([`grammar`])
//!  * **FIRST/FOLLOW** sets and the **grammar slots** with their select
//!    sets ([`first_follow`], [`slots`])
//!  * **lexical item sets**, the scanner DFA of token grammars ([`lexfsa`])
//!  * **orchestration** and text reports ([`generate`])
//!
//! The `gllex` binary (feature `cli`) generates the tables for a grammar and
//! parses input files with them.

pub mod error;
pub mod first_follow;
pub mod generate;
pub mod grammar;
pub mod lexfsa;
pub mod slots;
mod symtab;
pub mod tables;

#[cfg(test)]
mod test_grammars;

pub use error::{Diagnostic, GrammarError, TableError};
pub use first_follow::{FirstFollow, Lookahead, write_first_follow};
pub use generate::{GenConfig, Generated, generate, load, report};
pub use grammar::{Grammar, Mode, parse_source};
pub use lexfsa::{ItemSets, write_item_sets};
pub use slots::{SlotTable, write_slots};
pub use tables::{lexer_tables, parser_tables};
