//! Unified diagnostics for the trellis engine.
//!
//! Grammar configuration problems are fatal and surface synchronously, before
//! any parsing begins. The single mid-parse failure mode is a rule decorator
//! emitting an attribute outside the grammar's whitelist; that aborts the
//! offending parse and nothing else, leaving the `Grammar` reusable.
//!
//! Validator rejections and conflict-resolution rejections are not errors:
//! they are the normal disambiguation mechanism and never surface here.

use miette::Diagnostic;
use thiserror::Error;

/// Fail-fast errors raised while building or mutating a [`Grammar`].
///
/// [`Grammar`]: crate::grammar::Grammar
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GrammarError {
    /// A symbol contains parentheses outside the `SEQ(...)` / `MSEQ(...)`
    /// wrapper syntax.
    #[error("malformed symbol '{symbol}'")]
    #[diagnostic(
        code(trellis::grammar::malformed_symbol),
        help("parentheses are only legal as the SEQ(X) / MSEQ(X) repetition wrappers")
    )]
    MalformedSymbol { symbol: String },

    /// A rule was given an empty right-hand side.
    #[error("rule for '{lhs}' has an empty right-hand side")]
    #[diagnostic(code(trellis::grammar::empty_rhs))]
    EmptyRhs { lhs: String },

    /// The same `(lhs, rhs)` pair appears more than once in the grammar.
    #[error("duplicate rule '{lhs} -> {rhs}'")]
    #[diagnostic(
        code(trellis::grammar::duplicate_rule),
        help("each (lhs, rhs) pair may appear at most once; vary priority or group on the existing rule instead")
    )]
    DuplicateRule { lhs: String, rhs: String },

    /// A whitelisted attribute name collides with a name the engine reserves
    /// for node bookkeeping.
    #[error("attribute name '{name}' is reserved by the engine")]
    #[diagnostic(code(trellis::grammar::reserved_attribute))]
    ReservedAttribute { name: String },

    /// The grammar's symbol-dependency graph is cyclic while `depth_limit`
    /// is unbounded, so parsing could not be proven to terminate.
    #[error("grammar is cyclic ('{symbol}' can derive itself) and no depth limit is set")]
    #[diagnostic(
        code(trellis::grammar::cyclic),
        help("set a finite depth_limit, or break the cycle in the rules")
    )]
    CyclicGrammar { symbol: String },
}

/// Errors that abort a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    /// A decorator produced an attribute outside the grammar's
    /// `legal_attributes` whitelist.
    #[error("rule '{lhs}' decorated a node with illegal attribute '{attribute}'")]
    #[diagnostic(
        code(trellis::parse::illegal_attribute),
        help("declare the attribute in the grammar's legal_attributes, or drop it from the decorator")
    )]
    IllegalAttribute { lhs: String, attribute: String },
}
