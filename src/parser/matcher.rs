//! Support-sequence enumeration.
//!
//! Given a rule and an anchor node known to sit at rhs position `pos`, walk
//! the lattice left and right to enumerate every contiguous, name-matching,
//! edge-connected node sequence realizing the full rhs. Worst case is
//! exponential in local ambiguity fan-out; the depth and width limits keep it
//! tractable on real lattices.

use crate::grammar::Rule;
use crate::graph::{LayerGraph, NodeId};

/// Every full-length support sequence for `rule` anchored at `anchor`
/// occupying rhs position `pos`.
pub fn get_match(graph: &LayerGraph, rule: &Rule, anchor: NodeId, pos: usize) -> Vec<Vec<NodeId>> {
    let lefts = extend_left(graph, &rule.rhs[..pos], anchor);
    if lefts.is_empty() {
        return Vec::new();
    }
    let rights = extend_right(graph, &rule.rhs[pos + 1..], anchor);

    let mut matches = Vec::new();
    for left in &lefts {
        for right in &rights {
            let mut seq = Vec::with_capacity(rule.rhs.len());
            seq.extend_from_slice(left);
            seq.push(anchor);
            seq.extend_from_slice(right);
            matches.push(seq);
        }
    }
    matches
}

/// All ways to satisfy `symbols` ending immediately before `from`, matched
/// right to left over predecessor edges. The empty symbol list matches once,
/// with the empty sequence.
fn extend_left(graph: &LayerGraph, symbols: &[String], from: NodeId) -> Vec<Vec<NodeId>> {
    if symbols.is_empty() {
        return vec![Vec::new()];
    }
    let (rest, last) = symbols.split_at(symbols.len() - 1);
    let mut out = Vec::new();
    for &p in graph.preds(from) {
        if graph.node(p).name == last[0] {
            for mut seq in extend_left(graph, rest, p) {
                seq.push(p);
                out.push(seq);
            }
        }
    }
    out
}

/// Mirror of `extend_left` over successor edges, matched left to right.
fn extend_right(graph: &LayerGraph, symbols: &[String], from: NodeId) -> Vec<Vec<NodeId>> {
    if symbols.is_empty() {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for &s in graph.succs(from) {
        if graph.node(s).name == symbols[0] {
            for rest in extend_right(graph, &symbols[1..], s) {
                let mut seq = Vec::with_capacity(symbols.len());
                seq.push(s);
                seq.extend(rest);
                out.push(seq);
            }
        }
    }
    out
}
