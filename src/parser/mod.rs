//! The bottom-up fixpoint loop driving matcher and conflict resolver to
//! saturation.
//!
//! A worklist of `(node, depth)` pairs is seeded with every node whose name
//! occurs on some right-hand side. Popping a node enumerates every rule it
//! could extend across the regular, hidden-SEQ, and MSEQ tables, builds the
//! corresponding node variant per accepted support, and attempts insertion.
//! Inserted nodes re-enter the worklist one level deeper until the depth
//! limit cuts them off; removed nodes are skipped, never re-processed.

pub mod matcher;
pub mod resolver;

use std::collections::VecDeque;

use crate::errors::ParseError;
use crate::grammar::{Grammar, Rule, RuleAt};
use crate::graph::{LayerGraph, NodeData, NodeId, NodeKind, Support};

pub use matcher::get_match;
pub use resolver::{try_insert, ResolverConfig};

/// The three rule tables a node can extend, each mapping to a node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleTable {
    Regular,
    Hidden,
    MSeq,
}

impl RuleTable {
    const ALL: [RuleTable; 3] = [RuleTable::Regular, RuleTable::Hidden, RuleTable::MSeq];

    fn node_kind(self) -> NodeKind {
        match self {
            RuleTable::Regular => NodeKind::NonTerminal,
            RuleTable::Hidden => NodeKind::Plus,
            RuleTable::MSeq => NodeKind::MSeq,
        }
    }
}

/// Runs the grammar over the graph to saturation (or to the depth limit),
/// destructively growing it with derived nodes. The caller reads results back
/// through [`LayerGraph::nodes_named`] for its configured output symbols.
pub fn parse_graph(
    graph: &mut LayerGraph,
    grammar: &Grammar,
    config: &ResolverConfig,
) -> Result<(), ParseError> {
    let depth_limit = grammar.depth_limit().unwrap_or(usize::MAX);

    let mut worklist: VecDeque<(NodeId, usize)> = graph
        .live_nodes()
        .filter(|&id| grammar.occurs_in_rhs(&graph.node(id).name))
        .map(|id| (id, 0))
        .collect();

    while let Some((node, depth)) = worklist.pop_front() {
        if !graph.is_alive(node) {
            continue;
        }
        let name = graph.node(node).name.clone();

        for table in RuleTable::ALL {
            let entries = positions(grammar, table, &name);
            for &RuleAt { rule, pos } in entries {
                let rule = rule_in(grammar, table, rule);
                for support in get_match(graph, rule, node, pos) {
                    // Hidden and MSEQ rules are valid by construction; only
                    // regular rules consult the validator.
                    if table == RuleTable::Regular
                        && !rule.semantics().validate(&Support::new(graph, &support))
                    {
                        continue;
                    }
                    let Some(candidate) =
                        build_candidate(graph, grammar, rule, table.node_kind(), &support)?
                    else {
                        continue;
                    };
                    if let Some(inserted) = try_insert(graph, candidate, config) {
                        if depth < depth_limit && grammar.occurs_in_rhs(&graph.node(inserted).name)
                        {
                            worklist.push_back((inserted, depth + 1));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn positions<'g>(grammar: &'g Grammar, table: RuleTable, name: &str) -> &'g [RuleAt] {
    let idx = grammar.indices();
    let map = match table {
        RuleTable::Regular => &idx.rule_map,
        RuleTable::Hidden => &idx.hidden_rule_map,
        RuleTable::MSeq => &idx.mseq_rule_map,
    };
    map.get(name).map(Vec::as_slice).unwrap_or(&[])
}

fn rule_in(grammar: &Grammar, table: RuleTable, index: usize) -> &Rule {
    match table {
        RuleTable::Regular => &grammar.rules()[index],
        RuleTable::Hidden => &grammar.indices().hidden_rules[index],
        RuleTable::MSeq => &grammar.indices().mseq_rules[index],
    }
}

/// Materializes the node a rule application would insert: span, terminals,
/// and leaves from the support; score and attributes from the rule's
/// semantics; priority and group from the rule. Returns `Ok(None)` when the
/// node would exceed the width limit — such candidates are discarded without
/// ever reaching the resolver.
fn build_candidate(
    graph: &LayerGraph,
    grammar: &Grammar,
    rule: &Rule,
    kind: NodeKind,
    support: &[NodeId],
) -> Result<Option<NodeData>, ParseError> {
    let mut candidate = graph.derive(rule.lhs.clone(), kind, support);
    if let Some(limit) = grammar.width_limit() {
        if candidate.width() > limit {
            return Ok(None);
        }
    }

    let view = Support::new(graph, support);
    candidate.score = rule.semantics().score(&view);
    candidate.priority = rule.priority;
    candidate.group = rule.group;
    candidate.attributes = rule.semantics().decorate(&view);

    for key in candidate.attributes.keys() {
        if !grammar.legal_attributes().contains(key) {
            return Err(ParseError::IllegalAttribute {
                lhs: rule.lhs.clone(),
                attribute: key.clone(),
            });
        }
    }
    Ok(Some(candidate))
}
