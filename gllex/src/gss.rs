//! Graph-structured stack.
//!
//! Nodes are clusters keyed by (non-terminal, input position): one node
//! per call of a non-terminal at a position, however many callers share
//! it. Each node keeps its incoming calling contexts as edges of
//! (return slot, caller's left extent) and the right extents at which the
//! call has already returned ("pops"), so that late callers can be
//! resumed without re-parsing.

use crate::symbol::{NtId, SlotId};
use indexmap::{IndexMap, IndexSet};

/// A cluster node of the GSS.
#[derive(Debug, Clone, Default)]
pub struct GssNode {
    /// Calling contexts: (return slot, caller's left extent).
    pub edges: IndexSet<(SlotId, usize)>,
    /// Right extents at which this call has returned.
    pub popped: IndexSet<usize>,
}

/// The graph-structured stack of one parse run.
#[derive(Debug, Clone, Default)]
pub struct Gss {
    nodes: IndexMap<(NtId, usize), GssNode>,
}

impl Gss {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cluster nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` before the first node is created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of edges over all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.edges.len()).sum()
    }

    /// The node of `nt` called at input position `pos`, if it exists.
    pub fn node(&self, nt: NtId, pos: usize) -> Option<&GssNode> {
        self.nodes.get(&(nt, pos))
    }

    /// Iterates over nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NtId, usize, &GssNode)> {
        self.nodes.iter().map(|(&(nt, pos), node)| (nt, pos, node))
    }

    /// Creates the node (nt, pos) if missing. Returns `true` if it was created.
    pub fn ensure(&mut self, nt: NtId, pos: usize) -> bool {
        let before = self.nodes.len();
        self.nodes.entry((nt, pos)).or_default();
        self.nodes.len() > before
    }

    /// Adds edge (slot, lext) to node (nt, pos), creating the node if
    /// needed. Returns `None` if the edge already existed, otherwise the
    /// right extents already popped from the node.
    pub fn add_edge(
        &mut self,
        nt: NtId,
        pos: usize,
        slot: SlotId,
        lext: usize,
    ) -> Option<Vec<usize>> {
        let node = self.nodes.entry((nt, pos)).or_default();
        if node.edges.insert((slot, lext)) {
            Some(node.popped.iter().copied().collect())
        } else {
            None
        }
    }

    /// Records a return of node (nt, pos) at right extent `rext`. Returns
    /// `None` if that pop was already recorded, otherwise the node's edges.
    pub fn pop(&mut self, nt: NtId, pos: usize, rext: usize) -> Option<Vec<(SlotId, usize)>> {
        let node = self.nodes.entry((nt, pos)).or_default();
        if node.popped.insert(rext) {
            Some(node.edges.iter().copied().collect())
        } else {
            None
        }
    }
}
