//! Node records stored in the layer-graph arena.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// Arena index of a node. Stable for the lifetime of the graph; removal
/// invalidates the slot rather than reusing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which construction produced a node. The kinds share one record shape and
/// differ only in how conflict resolution treats them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Backed directly by an input span.
    Leaf,
    /// Built from a matched regular rule.
    NonTerminal,
    /// Built from a hidden `SEQ(X)` rule.
    Plus,
    /// Built from a hidden `MSEQ(X)` rule; conflicts compare support as an
    /// unordered set.
    MSeq,
}

/// A pre-tagged input span, the collaborator-facing input contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSpan {
    pub name: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl TerminalSpan {
    pub fn new(name: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            start,
            end,
        }
    }
}

/// One node of the layer graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    pub start: usize,
    pub end: usize,
    /// Leaf symbol names spanned, in span order.
    pub terminals: Vec<String>,
    /// Arena ids of the leaves spanned, in span order.
    pub leaves: Vec<NodeId>,
    /// Direct children this node was built from. For `Plus` / `MSeq` nodes
    /// nested same-name repetition nodes are flattened away, so alternate
    /// associations of the same run collapse into one support list.
    pub support: Vec<NodeId>,
    pub score: f64,
    pub priority: i64,
    pub group: u64,
    pub attributes: Attributes,
    /// Surface text; present on leaves only.
    pub text: Option<String>,
    pub kind: NodeKind,
    pub(crate) alive: bool,
}

impl NodeData {
    pub(crate) fn leaf(span: &TerminalSpan) -> Self {
        Self {
            name: span.name.clone(),
            start: span.start,
            end: span.end,
            terminals: vec![span.name.clone()],
            leaves: Vec::new(),
            support: Vec::new(),
            score: 0.0,
            priority: 0,
            group: 0,
            attributes: Attributes::new(),
            text: Some(span.text.clone()),
            kind: NodeKind::Leaf,
            alive: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Number of terminal leaves spanned; bounded by the grammar's width limit.
    pub fn width(&self) -> usize {
        self.terminals.len()
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_group(mut self, group: u64) -> Self {
        self.group = group;
        self
    }

    /// Exact-duplicate check used by conflict resolution: two derivations are
    /// identical when every conflict-relevant field agrees.
    pub(crate) fn same_derivation(&self, other: &NodeData) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.start == other.start
            && self.end == other.end
            && self.support == other.support
            && self.group == other.group
            && self.priority == other.priority
            && self.score == other.score
    }
}
