//! Arena allocation for the flat document tree.
//!
//! All nodes live in one contiguous `Vec`; children are `NodeId` indices.
//! The arena is append-only within a transaction: edits replace node
//! kinds or rewire child IDs, and detached subtrees simply become
//! unreachable from the root. Rollback restores the whole arena from a
//! snapshot, so no per-node free list is needed.

use crate::ast::ChildList;
use crate::{NodeId, NodeKind};

/// Contiguous storage for all nodes in a document.
///
/// Every allocation also receives a monotonically increasing `uid`.
/// Unlike a `NodeId` (a reusable slot index) a uid is never assigned
/// twice within a document's lifetime, so it serves as the stable
/// identity `NodePath` resolution verifies against.
#[derive(Clone, Default)]
pub struct NodeArena {
    nodes: Vec<NodeKind>,
    uids: Vec<u64>,
    next_uid: u64,
}

impl NodeArena {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its ID.
    #[inline]
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(kind);
        self.uids.push(self.next_uid);
        self.next_uid += 1;
        id
    }

    /// Stable identity of a node. Replacing a node's kind in place keeps
    /// its uid; a freshly allocated node never reuses one.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn uid(&self, id: NodeId) -> u64 {
        self.uids[id.index()]
    }

    /// Get a node by ID.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()]
    }

    /// Check if an ID points into this arena.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Number of allocated nodes, including orphans.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deep-clone a subtree into fresh nodes, returning the new root.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.get(id).clone();
        let children = kind.children();
        if children.is_empty() {
            return self.alloc(kind);
        }
        let mut new_children = ChildList::new();
        for child in &children {
            new_children.push(self.deep_clone(*child));
        }
        let rebuilt = kind.with_children(&new_children);
        self.alloc(rebuilt)
    }
}

impl std::fmt::Debug for NodeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeArena")
            .field("node_count", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, UnaryOp};

    #[test]
    fn test_alloc_get() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(NodeKind::Int(42));
        assert_eq!(arena.get(id), &NodeKind::Int(42));
        assert_eq!(arena.node_count(), 1);
        assert!(arena.contains(id));
    }

    #[test]
    fn test_deep_clone_is_detached() {
        let mut arena = NodeArena::new();
        let lhs = arena.alloc(NodeKind::Int(1));
        let rhs = arena.alloc(NodeKind::Int(2));
        let sum = arena.alloc(NodeKind::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
        });

        let copy = arena.deep_clone(sum);
        assert_ne!(copy, sum);

        // Mutating the copy's operand leaves the original intact.
        let copy_lhs = arena.get(copy).child_at(0).unwrap_or(NodeId::INVALID);
        *arena.get_mut(copy_lhs) = NodeKind::Int(99);
        assert_eq!(arena.get(lhs), &NodeKind::Int(1));
    }

    #[test]
    fn test_deep_clone_leaf() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(NodeKind::Bool(true));
        let copy = arena.deep_clone(id);
        assert_ne!(copy, id);
        assert_eq!(arena.get(copy), &NodeKind::Bool(true));
    }

    #[test]
    fn test_deep_clone_nested() {
        let mut arena = NodeArena::new();
        let inner = arena.alloc(NodeKind::Int(5));
        let not = arena.alloc(NodeKind::Unary {
            op: UnaryOp::Not,
            operand: inner,
        });
        let copy = arena.deep_clone(not);

        let NodeKind::Unary { operand, .. } = *arena.get(copy) else {
            panic!("expected unary");
        };
        assert_ne!(operand, inner);
        assert_eq!(arena.get(operand), &NodeKind::Int(5));
    }
}
