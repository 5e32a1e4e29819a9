//! Grammar construction, validation, and derived indices.
//!
//! A [`Grammar`] is a validated rule set plus lazily cached lookup tables:
//! terminal/nonterminal partitions, the rhs-position `rule_map`, and the
//! hidden rule tables that reduce `SEQ(X)` / `MSEQ(X)` repetition to ordinary
//! bottom-up rules. Mutation through [`Grammar::add_rule`] drops the cache;
//! the next accessor rebuilds it.

pub mod rule;

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::OnceCell;

use crate::attributes::RESERVED_ATTRIBUTES;
use crate::errors::GrammarError;

pub use rule::{mseq_inner, repetition_inner, seq_inner, NoOpSemantics, Rule, RuleSemantics};

/// A `(rule index, rhs position)` pair: which rule a symbol occurs in, and
/// where. The index addresses the table the lookup map belongs to (regular,
/// hidden, or mseq).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleAt {
    pub rule: usize,
    pub pos: usize,
}

pub(crate) type RuleMap = HashMap<String, Vec<RuleAt>>;

/// Derived lookup tables, rebuilt from scratch whenever the rule set changes.
#[derive(Debug, Default)]
pub(crate) struct Indices {
    pub terminals: BTreeSet<String>,
    pub nonterminals: BTreeSet<String>,
    /// symbol -> every (regular rule, rhs position) it occurs at.
    pub rule_map: RuleMap,
    /// lhs -> regular rules producing it; used by the phrase enumerator.
    pub lhs_map: HashMap<String, Vec<usize>>,
    /// Synthesized `S -> S S` / `S -> X` rules for every `SEQ(X)` symbol `S`.
    pub hidden_rules: Vec<Rule>,
    pub hidden_rule_map: RuleMap,
    /// Same synthesis for `MSEQ(X)` symbols.
    pub mseq_rules: Vec<Rule>,
    pub mseq_rule_map: RuleMap,
}

impl Indices {
    fn build(rules: &[Rule]) -> Self {
        let mut idx = Indices::default();

        for (i, rule) in rules.iter().enumerate() {
            idx.nonterminals.insert(rule.lhs.clone());
            idx.lhs_map.entry(rule.lhs.clone()).or_default().push(i);
            for (pos, symbol) in rule.rhs.iter().enumerate() {
                idx.rule_map
                    .entry(symbol.clone())
                    .or_default()
                    .push(RuleAt { rule: i, pos });
            }
        }

        // Each distinct SEQ/MSEQ symbol S wrapping X gets two synthesized
        // rules: S -> S S (left- or right-growth) and S -> X (seed). The
        // wrapper symbol itself becomes a nonterminal.
        let mut synthesized: HashSet<&str> = HashSet::new();
        for rule in rules {
            for symbol in &rule.rhs {
                if synthesized.contains(symbol.as_str()) {
                    continue;
                }
                if let Some(inner) = seq_inner(symbol) {
                    synthesized.insert(symbol.as_str());
                    synthesize(symbol, inner, &mut idx.hidden_rules, &mut idx.hidden_rule_map);
                    idx.nonterminals.insert(symbol.clone());
                } else if let Some(inner) = mseq_inner(symbol) {
                    synthesized.insert(symbol.as_str());
                    synthesize(symbol, inner, &mut idx.mseq_rules, &mut idx.mseq_rule_map);
                    idx.nonterminals.insert(symbol.clone());
                }
            }
        }

        // Terminal candidates: plain rhs symbols plus the inner symbol of
        // every wrapper. Whatever is not produced by some lhs is terminal.
        for rule in rules {
            for symbol in &rule.rhs {
                let candidate = repetition_inner(symbol).unwrap_or(symbol);
                if !idx.nonterminals.contains(candidate) {
                    idx.terminals.insert(candidate.to_string());
                }
            }
        }

        idx
    }
}

fn synthesize(symbol: &str, inner: &str, rules: &mut Vec<Rule>, map: &mut RuleMap) {
    let grow = rules.len();
    rules.push(Rule::synthesized(symbol, &[symbol, symbol]));
    let seed = rules.len();
    rules.push(Rule::synthesized(symbol, &[inner]));

    let at_symbol = map.entry(symbol.to_string()).or_default();
    at_symbol.push(RuleAt { rule: grow, pos: 0 });
    at_symbol.push(RuleAt { rule: grow, pos: 1 });
    map.entry(inner.to_string())
        .or_default()
        .push(RuleAt { rule: seed, pos: 0 });
}

// ============================================================================
// GRAMMAR
// ============================================================================

/// A validated rule set with derived indices and parse bounds.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
    start_symbols: Vec<String>,
    depth_limit: Option<usize>,
    width_limit: Option<usize>,
    legal_attributes: HashSet<String>,
    indices: OnceCell<Indices>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn start_symbols(&self) -> &[String] {
        &self.start_symbols
    }

    /// Maximum number of rule-application rounds per node; `None` means
    /// unbounded, which is only legal for statically acyclic grammars.
    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    /// Maximum number of terminal leaves a derived node may span.
    pub fn width_limit(&self) -> Option<usize> {
        self.width_limit
    }

    pub fn legal_attributes(&self) -> &HashSet<String> {
        &self.legal_attributes
    }

    /// Appends a rule, re-running duplicate and cycle validation, and drops
    /// the cached indices.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), GrammarError> {
        if self
            .rules
            .iter()
            .any(|r| r.lhs == rule.lhs && r.rhs == rule.rhs)
        {
            return Err(GrammarError::DuplicateRule {
                lhs: rule.lhs.clone(),
                rhs: rule.rhs_text(),
            });
        }
        self.rules.push(rule);
        if self.depth_limit.is_none() {
            if let Some(symbol) = find_cycle(&self.rules) {
                self.rules.pop();
                return Err(GrammarError::CyclicGrammar { symbol });
            }
        }
        self.indices = OnceCell::new();
        Ok(())
    }

    /// Symbols that only ever occur on the right-hand side.
    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.indices().terminals
    }

    /// Symbols produced by at least one rule (hidden SEQ/MSEQ rules count).
    pub fn nonterminals(&self) -> &BTreeSet<String> {
        &self.indices().nonterminals
    }

    /// Every (rule, rhs position) a symbol occurs at in the regular rules.
    pub fn rule_positions(&self, symbol: &str) -> &[RuleAt] {
        self.indices()
            .rule_map
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether parsing applied to this grammar is statically guaranteed to
    /// bottom out: true iff the symbol-dependency digraph (lhs -> each rhs
    /// symbol, plus a self-loop per SEQ/MSEQ symbol) is acyclic.
    pub fn has_finite_max_depth(&self) -> bool {
        find_cycle(&self.rules).is_none()
    }

    pub(crate) fn indices(&self) -> &Indices {
        self.indices.get_or_init(|| Indices::build(&self.rules))
    }

    /// True if `name` occurs as an rhs symbol of any rule, regular or
    /// synthesized; only such nodes can seed or extend a derivation.
    pub(crate) fn occurs_in_rhs(&self, name: &str) -> bool {
        let idx = self.indices();
        idx.rule_map.contains_key(name)
            || idx.hidden_rule_map.contains_key(name)
            || idx.mseq_rule_map.contains_key(name)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Accumulates configuration for a [`Grammar`]; all validation happens in
/// [`GrammarBuilder::build`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
    start_symbols: Vec<String>,
    depth_limit: Option<usize>,
    width_limit: Option<usize>,
    legal_attributes: HashSet<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn start_symbols(mut self, symbols: &[&str]) -> Self {
        self.start_symbols = symbols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = Some(limit);
        self
    }

    pub fn width_limit(mut self, limit: usize) -> Self {
        self.width_limit = Some(limit);
        self
    }

    pub fn legal_attributes(mut self, names: &[&str]) -> Self {
        self.legal_attributes = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Validates and freezes the grammar: duplicate `(lhs, rhs)` pairs,
    /// reserved attribute names, and a cyclic dependency graph combined with
    /// an unbounded depth limit are all fatal here, before any parsing.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut seen: HashSet<(&str, String)> = HashSet::new();
        for rule in &self.rules {
            if !seen.insert((rule.lhs.as_str(), rule.rhs_text())) {
                return Err(GrammarError::DuplicateRule {
                    lhs: rule.lhs.clone(),
                    rhs: rule.rhs_text(),
                });
            }
        }

        for name in &self.legal_attributes {
            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                return Err(GrammarError::ReservedAttribute { name: name.clone() });
            }
        }

        if self.depth_limit.is_none() {
            if let Some(symbol) = find_cycle(&self.rules) {
                return Err(GrammarError::CyclicGrammar { symbol });
            }
        }

        Ok(Grammar {
            rules: self.rules,
            start_symbols: self.start_symbols,
            depth_limit: self.depth_limit,
            width_limit: self.width_limit,
            legal_attributes: self.legal_attributes,
            indices: OnceCell::new(),
        })
    }
}

// ============================================================================
// CYCLE DETECTION
// ============================================================================

/// Searches the symbol-dependency digraph for a cycle, returning a symbol on
/// one if found. Every SEQ/MSEQ symbol carries a self-loop, so any grammar
/// using repetition requires a finite depth limit.
fn find_cycle(rules: &[Rule]) -> Option<String> {
    let mut edges: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for rule in rules {
        for symbol in &rule.rhs {
            edges
                .entry(rule.lhs.as_str())
                .or_default()
                .insert(symbol.as_str());
            if let Some(inner) = repetition_inner(symbol) {
                let wrapped = edges.entry(symbol.as_str()).or_default();
                wrapped.insert(symbol.as_str());
                wrapped.insert(inner);
            }
        }
    }

    let mut done: HashSet<&str> = HashSet::new();
    let mut on_path: HashSet<&str> = HashSet::new();
    for &start in edges.keys() {
        if let Some(symbol) = visit(start, &edges, &mut done, &mut on_path) {
            return Some(symbol);
        }
    }
    None
}

fn visit<'a>(
    symbol: &'a str,
    edges: &HashMap<&'a str, BTreeSet<&'a str>>,
    done: &mut HashSet<&'a str>,
    on_path: &mut HashSet<&'a str>,
) -> Option<String> {
    if done.contains(symbol) {
        return None;
    }
    if !on_path.insert(symbol) {
        return Some(symbol.to_string());
    }
    if let Some(next) = edges.get(symbol) {
        for &successor in next {
            if let Some(found) = visit(successor, edges, done, on_path) {
                return Some(found);
            }
        }
    }
    on_path.remove(symbol);
    done.insert(symbol);
    None
}
