//! The layer graph: a DAG of terminal and derived nodes over a text,
//! connected by "immediately precedes" edges.
//!
//! Nodes live in a growable arena addressed by [`NodeId`]; adjacency is kept
//! as per-node index lists, removal is slot invalidation. Two auxiliary
//! indices serve the conflict resolver: `(start, end)` span lookup, and a
//! leaf-to-derived map (the parse-tree view) answering "which nodes were
//! already derived over this leaf".
//!
//! The adjacency contract: an edge runs from A to B iff `end(A) == start(B)`.
//! Ambiguous taggings fan out from a shared start and fan back in at a shared
//! end; the parser never sees gaps or overlaps as adjacent.

pub mod node;

use std::collections::HashMap;

pub use node::{NodeData, NodeId, NodeKind, TerminalSpan};

/// Growable node arena plus adjacency and lookup indices.
#[derive(Debug, Default, Clone)]
pub struct LayerGraph {
    nodes: Vec<NodeData>,
    pred: Vec<Vec<NodeId>>,
    succ: Vec<Vec<NodeId>>,
    span_index: HashMap<(usize, usize), Vec<NodeId>>,
    /// leaf id -> every derived node whose transitive support contains it.
    derived_index: HashMap<NodeId, Vec<NodeId>>,
}

impl LayerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial lattice from tagged spans: one leaf per span, an
    /// edge for every zero-gap adjacency. Leaf ids are assigned in input
    /// order.
    pub fn from_spans(spans: &[TerminalSpan]) -> Self {
        let mut graph = Self::new();
        let mut by_start: HashMap<usize, Vec<NodeId>> = HashMap::new();
        let mut ids = Vec::with_capacity(spans.len());
        for span in spans {
            let id = graph.push(NodeData::leaf(span));
            by_start.entry(span.start).or_default().push(id);
            ids.push(id);
        }
        for (&id, span) in ids.iter().zip(spans) {
            if let Some(successors) = by_start.get(&span.end) {
                for &next in successors {
                    graph.add_edge(id, next);
                }
            }
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes[id.0].alive
    }

    pub fn preds(&self, id: NodeId) -> &[NodeId] {
        &self.pred[id.0]
    }

    pub fn succs(&self, id: NodeId) -> &[NodeId] {
        &self.succ[id.0]
    }

    /// Live nodes indexed at exactly `(start, end)`.
    pub fn nodes_at(&self, start: usize, end: usize) -> &[NodeId] {
        self.span_index
            .get(&(start, end))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Live derived nodes whose transitive support contains `leaf`.
    pub fn derived_from(&self, leaf: NodeId) -> &[NodeId] {
        self.derived_index
            .get(&leaf)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.alive)
            .map(|(i, _)| NodeId(i))
    }

    /// Live nodes with the given name; how hosts extract their configured
    /// output nonterminals after a parse.
    pub fn nodes_named(&self, name: &str) -> Vec<NodeId> {
        self.live_nodes()
            .filter(|&id| self.node(id).name == name)
            .collect()
    }

    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.live_nodes()
            .filter(|&id| self.node(id).is_leaf())
            .collect()
    }

    /// Assembles a derived node record over `support` without inserting it:
    /// span from the first/last element, terminals and leaves concatenated in
    /// order. For `Plus` / `MSeq` kinds, support elements that are themselves
    /// same-name nodes of the same kind are replaced by their own support, so
    /// every association of a run yields the same record.
    ///
    /// Score, priority, group, and attributes start at their defaults.
    pub fn derive(&self, name: impl Into<String>, kind: NodeKind, support: &[NodeId]) -> NodeData {
        let name = name.into();
        let start = self.node(support[0]).start;
        let end = self.node(support[support.len() - 1]).end;

        let mut terminals = Vec::new();
        let mut leaves = Vec::new();
        for &child in support {
            let child = self.node(child);
            terminals.extend(child.terminals.iter().cloned());
            leaves.extend(child.leaves.iter().copied());
        }

        let support = match kind {
            NodeKind::Plus | NodeKind::MSeq => {
                let mut flat = Vec::with_capacity(support.len());
                for &child in support {
                    let data = self.node(child);
                    if data.kind == kind && data.name == name {
                        flat.extend(data.support.iter().copied());
                    } else {
                        flat.push(child);
                    }
                }
                flat
            }
            _ => support.to_vec(),
        };

        NodeData {
            name,
            start,
            end,
            terminals,
            leaves,
            support,
            score: 0.0,
            priority: 0,
            group: 0,
            attributes: crate::attributes::Attributes::new(),
            text: None,
            kind,
            alive: true,
        }
    }

    /// Inserts a derived node, wiring it into the lattice: it inherits every
    /// predecessor edge of its first support element and every successor edge
    /// of its last. Conflict checks belong to the resolver, not here.
    pub(crate) fn insert_derived(&mut self, data: NodeData) -> NodeId {
        let first = data.support.first().copied();
        let last = data.support.last().copied();
        let id = self.push(data);
        if let (Some(first), Some(last)) = (first, last) {
            let preds = self.pred[first.0].clone();
            for p in preds {
                self.add_edge(p, id);
            }
            let succs = self.succ[last.0].clone();
            for s in succs {
                self.add_edge(id, s);
            }
        }
        id
    }

    /// Invalidates a node: detaches its edges and removes it from every
    /// index. The arena slot is never reused.
    pub(crate) fn remove_node(&mut self, id: NodeId) {
        if !self.nodes[id.0].alive {
            return;
        }
        self.nodes[id.0].alive = false;

        let preds = std::mem::take(&mut self.pred[id.0]);
        for p in preds {
            self.succ[p.0].retain(|&x| x != id);
        }
        let succs = std::mem::take(&mut self.succ[id.0]);
        for s in succs {
            self.pred[s.0].retain(|&x| x != id);
        }

        let key = (self.nodes[id.0].start, self.nodes[id.0].end);
        if let Some(at_span) = self.span_index.get_mut(&key) {
            at_span.retain(|&x| x != id);
        }
        let leaves = self.nodes[id.0].leaves.clone();
        for leaf in leaves {
            if let Some(derived) = self.derived_index.get_mut(&leaf) {
                derived.retain(|&x| x != id);
            }
        }
    }

    fn push(&mut self, mut data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        if data.is_leaf() {
            data.leaves = vec![id];
        } else {
            for &leaf in &data.leaves {
                self.derived_index.entry(leaf).or_default().push(id);
            }
        }
        self.span_index
            .entry((data.start, data.end))
            .or_default()
            .push(id);
        self.nodes.push(data);
        self.pred.push(Vec::new());
        self.succ.push(Vec::new());
        id
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.succ[from.0].push(to);
        self.pred[to.0].push(from);
    }
}

// ============================================================================
// SUPPORT VIEW
// ============================================================================

/// A borrowed view of a candidate support sequence, handed to the
/// [`RuleSemantics`] hooks.
///
/// [`RuleSemantics`]: crate::grammar::RuleSemantics
pub struct Support<'g> {
    graph: &'g LayerGraph,
    ids: &'g [NodeId],
}

impl<'g> Support<'g> {
    pub fn new(graph: &'g LayerGraph, ids: &'g [NodeId]) -> Self {
        Self { graph, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        self.ids
    }

    pub fn node(&self, i: usize) -> &NodeData {
        self.graph.node(self.ids[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeData> {
        self.ids.iter().map(|&id| self.graph.node(id))
    }

    /// Names of the direct children, in order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|n| n.name.as_str()).collect()
    }

    /// Surface texts of the spanned leaves, in span order.
    pub fn texts(&self) -> Vec<&str> {
        self.iter()
            .flat_map(|n| n.leaves.iter())
            .map(|&leaf| self.graph.node(leaf).text.as_deref().unwrap_or(""))
            .collect()
    }

    /// Terminal symbol names spanned, in span order.
    pub fn terminals(&self) -> Vec<&str> {
        self.iter()
            .flat_map(|n| n.terminals.iter())
            .map(String::as_str)
            .collect()
    }
}
