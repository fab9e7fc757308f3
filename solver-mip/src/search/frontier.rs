//! Best-bound frontier of pending nodes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{NodeId, Subproblem};

/// Heap entry: node bound and creation order.
#[derive(Debug, Clone, Copy)]
struct Entry {
    bound: f64,
    id: NodeId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Larger bound first, then the earlier-created node
        self.bound
            .total_cmp(&other.bound)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Pending nodes stored in an arena indexed by [`NodeId`], selected through a
/// max-heap on `parent_bound`.
#[derive(Debug, Default)]
pub struct Frontier {
    /// Node storage; `None` once a node has left the frontier.
    arena: Vec<Option<Subproblem>>,

    /// Selection order.
    heap: BinaryHeap<Entry>,
}

impl Frontier {
    /// Create an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next node identifier.
    pub fn next_id(&mut self) -> NodeId {
        self.arena.push(None);
        self.arena.len() - 1
    }

    /// Add a node. Its id must come from [`Frontier::next_id`].
    pub fn push(&mut self, node: Subproblem) {
        let id = node.id;
        if id >= self.arena.len() {
            self.arena.resize_with(id + 1, || None);
        }
        self.heap.push(Entry {
            bound: node.parent_bound,
            id,
        });
        self.arena[id] = Some(node);
    }

    /// Remove and return the node with the largest bound (earliest on ties).
    pub fn pop(&mut self) -> Option<Subproblem> {
        while let Some(entry) = self.heap.pop() {
            if let Some(node) = self.arena[entry.id].take() {
                return Some(node);
            }
        }
        None
    }

    /// Bound of the node `pop` would return.
    pub fn peek_bound(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.bound)
    }

    /// Drop pending nodes whose bound cannot beat `incumbent_obj`.
    ///
    /// Returns the number of pruned nodes.
    pub fn prune_dominated(&mut self, incumbent_obj: f64) -> usize {
        let before = self.heap.len();
        let arena = &mut self.arena;
        let kept: Vec<Entry> = self
            .heap
            .drain()
            .filter(|e| match arena[e.id].as_ref() {
                Some(node) if node.can_prune(incumbent_obj) => {
                    arena[e.id] = None;
                    false
                }
                Some(_) => true,
                None => false,
            })
            .collect();
        self.heap = kept.into_iter().collect();
        before - self.heap.len()
    }

    /// Check if the frontier is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pending nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Total identifiers handed out.
    pub fn total_created(&self) -> usize {
        self.arena.len()
    }
}
