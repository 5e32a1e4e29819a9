//! Offline phrase enumeration and grammar fingerprinting.
//!
//! These tools never touch a layer graph: they expand the grammar top-down
//! from its start symbols to list every terminal sequence it can generate,
//! for grammar testing and regression fingerprints. Validators, decorators,
//! and scoring are ignored throughout.

use std::collections::BTreeSet;

use crate::grammar::{repetition_inner, Grammar};

/// Bounds for [`phrase_list`]. `max_depth` falls back to the grammar's depth
/// limit when unset; `None` on both sides means unbounded, which the
/// grammar's acyclicity already makes finite.
#[derive(Debug, Clone)]
pub struct PhraseConfig {
    pub max_depth: Option<usize>,
    /// How far `SEQ(X)` / `MSEQ(X)` symbols are unrolled.
    pub max_repetitions: usize,
    /// Phrases wider than this are pruned; falls back to the grammar's width
    /// limit.
    pub width_limit: Option<usize>,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_repetitions: 3,
            width_limit: None,
        }
    }
}

/// Every distinct terminal-symbol sequence the grammar can generate from its
/// start symbols, within the configured bounds.
pub fn phrase_list(grammar: &Grammar, config: &PhraseConfig) -> BTreeSet<Vec<String>> {
    let depth = config.max_depth.or(grammar.depth_limit());
    let width = config.width_limit.or(grammar.width_limit());

    let mut phrases = BTreeSet::new();
    for start in grammar.start_symbols() {
        phrases.extend(expand(grammar, start, depth, config.max_repetitions));
    }
    if let Some(width) = width {
        phrases.retain(|p| p.len() <= width);
    }
    phrases
}

fn expand(
    grammar: &Grammar,
    symbol: &str,
    depth: Option<usize>,
    max_repetitions: usize,
) -> BTreeSet<Vec<String>> {
    if let Some(inner) = repetition_inner(symbol) {
        if depth == Some(0) {
            return BTreeSet::new();
        }
        let units = expand(grammar, inner, depth.map(|d| d - 1), max_repetitions);
        return unroll(&units, max_repetitions);
    }

    let idx = grammar.indices();
    let Some(producers) = idx.lhs_map.get(symbol) else {
        // Terminal: generates exactly itself.
        return BTreeSet::from([vec![symbol.to_string()]]);
    };
    if depth == Some(0) {
        return BTreeSet::new();
    }

    let mut out = BTreeSet::new();
    for &rule in producers {
        let rule = &grammar.rules()[rule];
        let mut partials: Vec<Vec<String>> = vec![Vec::new()];
        for rhs_symbol in &rule.rhs {
            let expansions = expand(grammar, rhs_symbol, depth.map(|d| d - 1), max_repetitions);
            if expansions.is_empty() {
                partials.clear();
                break;
            }
            let mut next = Vec::with_capacity(partials.len() * expansions.len());
            for partial in &partials {
                for expansion in &expansions {
                    let mut seq = partial.clone();
                    seq.extend(expansion.iter().cloned());
                    next.push(seq);
                }
            }
            partials = next;
        }
        out.extend(partials);
    }
    out
}

/// `units` repeated 1..=max_repetitions times, every combination.
fn unroll(units: &BTreeSet<Vec<String>>, max_repetitions: usize) -> BTreeSet<Vec<String>> {
    let mut out = BTreeSet::new();
    let mut current: Vec<Vec<String>> = vec![Vec::new()];
    for _ in 0..max_repetitions {
        let mut next = Vec::new();
        for seq in &current {
            for unit in units {
                let mut grown = seq.clone();
                grown.extend(unit.iter().cloned());
                next.push(grown);
            }
        }
        out.extend(next.iter().cloned());
        current = next;
    }
    out
}

/// Reduces enumerated phrases to a minimal covering-n-gram fingerprint: each
/// phrase contributes the set of its length-`n` windows (the whole phrase if
/// it is shorter), and any set that is a subset of another kept set is
/// discarded.
pub fn ngram_fingerprint(
    phrases: &BTreeSet<Vec<String>>,
    n: usize,
) -> BTreeSet<BTreeSet<Vec<String>>> {
    let sets: BTreeSet<BTreeSet<Vec<String>>> = phrases
        .iter()
        .map(|phrase| {
            if phrase.len() <= n {
                BTreeSet::from([phrase.clone()])
            } else {
                phrase.windows(n).map(<[String]>::to_vec).collect()
            }
        })
        .collect();

    sets.iter()
        .filter(|&s| !sets.iter().any(|t| t.len() > s.len() && t.is_superset(s)))
        .cloned()
        .collect()
}
