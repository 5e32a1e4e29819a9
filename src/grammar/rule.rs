//! Production rules and the per-rule semantics hooks.
//!
//! A rule is `lhs -> rhs` plus a priority, a conflict group, and a
//! [`RuleSemantics`] strategy supplying the validator, decorator, and scoring
//! hooks. Symbol syntax is checked at construction: parentheses are rejected
//! everywhere except the `SEQ(X)` / `MSEQ(X)` repetition wrappers.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::attributes::Attributes;
use crate::errors::GrammarError;
use crate::graph::Support;

// ============================================================================
// SYMBOL SYNTAX
// ============================================================================

/// Returns the inner symbol of a `SEQ(X)` wrapper, if `symbol` is one.
pub fn seq_inner(symbol: &str) -> Option<&str> {
    symbol.strip_prefix("SEQ(")?.strip_suffix(')')
}

/// Returns the inner symbol of an `MSEQ(X)` wrapper, if `symbol` is one.
pub fn mseq_inner(symbol: &str) -> Option<&str> {
    symbol.strip_prefix("MSEQ(")?.strip_suffix(')')
}

/// Returns the inner symbol of either repetition wrapper.
pub fn repetition_inner(symbol: &str) -> Option<&str> {
    seq_inner(symbol).or_else(|| mseq_inner(symbol))
}

fn is_plain(symbol: &str) -> bool {
    !symbol.is_empty() && !symbol.contains('(') && !symbol.contains(')')
}

fn validate_lhs(symbol: &str) -> Result<(), GrammarError> {
    if is_plain(symbol) {
        Ok(())
    } else {
        Err(GrammarError::MalformedSymbol {
            symbol: symbol.to_string(),
        })
    }
}

fn validate_rhs_symbol(symbol: &str) -> Result<(), GrammarError> {
    if is_plain(symbol) {
        return Ok(());
    }
    if let Some(inner) = repetition_inner(symbol) {
        if is_plain(inner) {
            return Ok(());
        }
    }
    Err(GrammarError::MalformedSymbol {
        symbol: symbol.to_string(),
    })
}

// ============================================================================
// RULE SEMANTICS - validator / decorator / scoring strategy
// ============================================================================

/// Per-rule hooks applied to every candidate support sequence.
///
/// All three default to no-ops: every match is valid, carries no attributes,
/// and scores zero. Implementations see the matched support through a
/// [`Support`] view over the graph.
pub trait RuleSemantics: Send + Sync {
    /// Accept or reject a candidate support. Rejection is silent; it is the
    /// normal filtering mechanism, not an error.
    fn validate(&self, _support: &Support<'_>) -> bool {
        true
    }

    /// Produce the attribute map for a node derived over `support`. Every key
    /// must be in the grammar's `legal_attributes` whitelist.
    fn decorate(&self, _support: &Support<'_>) -> Attributes {
        Attributes::new()
    }

    /// Score the derivation. Higher scores win start/end conflicts.
    fn score(&self, _support: &Support<'_>) -> f64 {
        0.0
    }
}

/// The default semantics: always valid, no attributes, score zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSemantics;

impl RuleSemantics for NoOpSemantics {}

// ============================================================================
// RULE
// ============================================================================

/// One production `lhs -> rhs`.
///
/// # Examples
///
/// ```rust
/// use trellis::grammar::Rule;
/// let rule = Rule::new("NP", &["DET", "SEQ(ADJ)", "N"]).unwrap().with_priority(1);
/// assert_eq!(rule.lhs, "NP");
/// assert_eq!(rule.priority, 1);
/// ```
#[derive(Clone)]
pub struct Rule {
    pub lhs: String,
    pub rhs: Vec<String>,
    /// Numerically lower is stronger in support-conflict resolution.
    pub priority: i64,
    /// Conflict partition key; defaults to a hash of `(lhs, rhs)`.
    pub group: u64,
    semantics: Arc<dyn RuleSemantics>,
}

impl Rule {
    /// Builds a rule, validating symbol syntax on both sides.
    pub fn new(lhs: impl Into<String>, rhs: &[&str]) -> Result<Self, GrammarError> {
        let lhs = lhs.into();
        validate_lhs(&lhs)?;
        if rhs.is_empty() {
            return Err(GrammarError::EmptyRhs { lhs });
        }
        for symbol in rhs {
            validate_rhs_symbol(symbol)?;
        }
        let rhs: Vec<String> = rhs.iter().map(|s| s.to_string()).collect();
        let group = default_group(&lhs, &rhs);
        Ok(Self {
            lhs,
            rhs,
            priority: 0,
            group,
            semantics: Arc::new(NoOpSemantics),
        })
    }

    /// Internal constructor for synthesized SEQ/MSEQ rules; the lhs is a
    /// wrapper symbol, which `new` would reject.
    pub(crate) fn synthesized(lhs: &str, rhs: &[&str]) -> Self {
        let rhs: Vec<String> = rhs.iter().map(|s| s.to_string()).collect();
        let group = default_group(lhs, &rhs);
        Self {
            lhs: lhs.to_string(),
            rhs,
            priority: 0,
            group,
            semantics: Arc::new(NoOpSemantics),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_group(mut self, group: u64) -> Self {
        self.group = group;
        self
    }

    pub fn with_semantics(mut self, semantics: Arc<dyn RuleSemantics>) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn semantics(&self) -> &dyn RuleSemantics {
        self.semantics.as_ref()
    }

    /// The rhs as a single space-joined string, for error messages and
    /// duplicate detection.
    pub fn rhs_text(&self) -> String {
        self.rhs.join(" ")
    }
}

fn default_group(lhs: &str, rhs: &[String]) -> u64 {
    let mut hasher = DefaultHasher::new();
    lhs.hash(&mut hasher);
    rhs.hash(&mut hasher);
    hasher.finish()
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("priority", &self.priority)
            .field("group", &self.group)
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.rhs_text())
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs
            && self.rhs == other.rhs
            && self.priority == other.priority
            && self.group == other.group
    }
}

impl Eq for Rule {}

// Ordering is by priority alone (then lhs/rhs for determinism); it exists for
// stable iteration, not for conflict resolution.
impl PartialOrd for Rule {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rule {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.lhs.cmp(&other.lhs))
            .then_with(|| self.rhs.cmp(&other.rhs))
    }
}
