//! Conflict resolution: the gate every derived node passes through before
//! joining the graph.
//!
//! Rejection here is the normal disambiguation mechanism, not an error. The
//! checks run in a fixed order: exact-duplicate rejection, priority-based
//! support conflicts within a group, score-based conflicts at a shared
//! `(start, end)` or terminal set, and the unordered-support subset rule for
//! MSEQ nodes.

use std::collections::BTreeSet;

use crate::graph::{LayerGraph, NodeData, NodeId, NodeKind};

/// Toggles for the individual conflict checks. Defaults match the engine's
/// standard behavior: support and start/end resolution on, terminal-set
/// resolution off.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Priority comparison among same-group nodes sharing a leaf.
    pub resolve_support_conflicts: bool,
    /// Score comparison among same-named nodes at the same `(start, end)`.
    pub resolve_start_end_conflicts: bool,
    /// Score comparison among same-named nodes over the same leaf set,
    /// regardless of span.
    pub resolve_terminal_conflicts: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            resolve_support_conflicts: true,
            resolve_start_end_conflicts: true,
            resolve_terminal_conflicts: false,
        }
    }
}

/// Decides whether `candidate` may join the graph. On acceptance, every node
/// it supersedes is removed, the candidate is inserted and wired into the
/// lattice, and its id is returned. `None` means the candidate lost and the
/// graph is unchanged.
pub fn try_insert(
    graph: &mut LayerGraph,
    candidate: NodeData,
    config: &ResolverConfig,
) -> Option<NodeId> {
    for &existing in graph.nodes_at(candidate.start, candidate.end) {
        if graph.node(existing).same_derivation(&candidate) {
            return None;
        }
    }

    let mut doomed: BTreeSet<NodeId> = BTreeSet::new();

    if config.resolve_support_conflicts
        && matches!(candidate.kind, NodeKind::NonTerminal | NodeKind::Plus)
    {
        for &leaf in &candidate.leaves {
            for &fellow in graph.derived_from(leaf) {
                // A node never conflicts with its own support.
                if candidate.support.contains(&fellow) {
                    continue;
                }
                let data = graph.node(fellow);
                if data.group != candidate.group
                    || !matches!(data.kind, NodeKind::NonTerminal | NodeKind::Plus)
                {
                    continue;
                }
                if data.priority < candidate.priority {
                    return None;
                }
                if candidate.priority < data.priority {
                    doomed.insert(fellow);
                }
            }
        }
    }

    if config.resolve_start_end_conflicts {
        for &existing in graph.nodes_at(candidate.start, candidate.end) {
            if candidate.support.contains(&existing) {
                continue;
            }
            let data = graph.node(existing);
            if data.name != candidate.name || data.is_leaf() {
                continue;
            }
            if data.score > candidate.score {
                return None;
            }
            if candidate.score > data.score {
                doomed.insert(existing);
            }
        }
    }

    if config.resolve_terminal_conflicts {
        let leaf_set: BTreeSet<NodeId> = candidate.leaves.iter().copied().collect();
        // Any node over the same leaf set is derived from the first leaf.
        if let Some(&first_leaf) = candidate.leaves.first() {
            for &fellow in graph.derived_from(first_leaf) {
                if candidate.support.contains(&fellow) {
                    continue;
                }
                let data = graph.node(fellow);
                if data.name != candidate.name {
                    continue;
                }
                let fellow_set: BTreeSet<NodeId> = data.leaves.iter().copied().collect();
                if fellow_set != leaf_set {
                    continue;
                }
                if data.score > candidate.score {
                    return None;
                }
                if candidate.score > data.score {
                    doomed.insert(fellow);
                }
            }
        }
    }

    if candidate.kind == NodeKind::MSeq {
        let support_set: BTreeSet<NodeId> = candidate.support.iter().copied().collect();
        for &leaf in &candidate.leaves {
            for &fellow in graph.derived_from(leaf) {
                let data = graph.node(fellow);
                if data.kind != NodeKind::MSeq || data.name != candidate.name {
                    continue;
                }
                let fellow_set: BTreeSet<NodeId> = data.support.iter().copied().collect();
                if fellow_set.is_superset(&support_set) {
                    return None;
                }
                if fellow_set.is_subset(&support_set) {
                    doomed.insert(fellow);
                }
            }
        }
    }

    for id in doomed {
        graph.remove_node(id);
    }
    Some(graph.insert_derived(candidate))
}
