//! Trellis: an ambiguity-tolerant, bottom-up chart parser over lattices of
//! pre-tagged, possibly overlapping text spans.
//!
//! A host supplies a [`Grammar`] of production rules and a [`LayerGraph`]
//! built from tagged terminal spans; [`parse_graph`] saturates the graph with
//! derived phrase nodes, resolving ambiguity through priority-, score-, and
//! set-based conflict rules. [`enumerate`] provides offline grammar testing:
//! exhaustive phrase listing and n-gram fingerprints.

pub use crate::errors::{GrammarError, ParseError};

pub mod attributes;
pub mod enumerate;
pub mod errors;
pub mod grammar;
pub mod graph;
pub mod parser;

pub use attributes::{AttrValue, Attributes, RESERVED_ATTRIBUTES};
pub use enumerate::{ngram_fingerprint, phrase_list, PhraseConfig};
pub use grammar::{Grammar, GrammarBuilder, NoOpSemantics, Rule, RuleSemantics};
pub use graph::{LayerGraph, NodeData, NodeId, NodeKind, Support, TerminalSpan};
pub use parser::{get_match, parse_graph, try_insert, ResolverConfig};
