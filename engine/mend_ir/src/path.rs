//! Rebind-safe structural paths into a document.
//!
//! A `NodePath` identifies a node by the child indices leading to it from
//! the root, plus the node kind and stable uid the path was created for.
//! Unlike a raw `NodeId`, a path survives snapshots and stays meaningful
//! across edits elsewhere in the tree; resolution fails (returns `None`)
//! rather than ever producing an unrelated node.

use std::fmt;

use crate::NodeTag;

/// Structural handle to a node, stable across unrelated edits.
///
/// Invariant: resolving a path after any edit either yields the node the
/// path was created for, or `None` — never an unrelated node. The
/// recorded `NodeTag` and the target's stable uid are both checked on
/// every resolution, so a path goes stale (rather than rebinding) when a
/// sibling edit shifts a different node into its slot.
#[derive(Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePath {
    steps: Vec<u32>,
    tag: NodeTag,
    uid: u64,
}

impl NodePath {
    /// Create a path from root-relative child indices, the expected
    /// target kind, and the target's stable uid.
    pub fn new(steps: Vec<u32>, tag: NodeTag, uid: u64) -> Self {
        NodePath { steps, tag, uid }
    }

    /// Child indices from the root.
    pub fn steps(&self) -> &[u32] {
        &self.steps
    }

    /// The node kind this path was created for.
    pub const fn tag(&self) -> NodeTag {
        self.tag
    }

    /// Stable identity of the node this path was created for.
    pub const fn uid(&self) -> u64 {
        self.uid
    }

    /// Number of steps from the root.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Whether this path points at the document root.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether `self` is a strict ancestor of `other`.
    ///
    /// Used by the template layer to reject overlapping placeholder
    /// ranges.
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        self.steps.len() < other.steps.len() && other.steps.starts_with(&self.steps)
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({:?} -> {} #{})", self.steps, self.tag, self.uid)
    }
}
