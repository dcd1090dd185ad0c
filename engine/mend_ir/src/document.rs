//! The mutable structural document.
//!
//! `TreeDocument` owns the node arena, the root block, the interner, and
//! a version counter bumped once per committed transaction. It exposes
//! the collaborator surface the quick-fix engine consumes: node lookup by
//! offset, path creation/resolution, structural mutation primitives, and
//! snapshots.
//!
//! # Concurrency
//!
//! The document itself is single-threaded data. `SharedDocument` wraps it
//! in `Arc<RwLock<_>>` (parking_lot): the lock is the exclusive write
//! scope — only one transaction mutates at a time, and read-only analyses
//! may run concurrently on read guards or on snapshots.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::arena::NodeArena;
use crate::{Name, NodeId, NodeKind, NodePath, Printer, Span};

/// Error from a structural mutation primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    /// Node is not reachable from the document root.
    Detached(NodeId),
    /// Statement surgery requested on a node whose parent is not a block.
    NotInBlock(NodeId),
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::Detached(id) => {
                write!(f, "node {id:?} is not reachable from the document root")
            }
            DocError::NotInBlock(id) => {
                write!(f, "node {id:?} is not a direct child of a block")
            }
        }
    }
}

impl std::error::Error for DocError {}

/// A structural document: flat arena, root block, interner, version.
#[derive(Clone)]
pub struct TreeDocument {
    arena: NodeArena,
    root: NodeId,
    interner: crate::StringInterner,
    version: u64,
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeDocument {
    /// Create an empty document (root is an empty block).
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc(NodeKind::Block(Vec::new()));
        TreeDocument {
            arena,
            root,
            interner: crate::StringInterner::new(),
            version: 0,
        }
    }

    /// The root block.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current document version. Bumped once per committed transaction.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mark the document as changed by one committed transaction.
    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Get a node by ID.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn node(&self, id: NodeId) -> &NodeKind {
        self.arena.get(id)
    }

    /// Allocate a detached node.
    #[inline]
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(kind)
    }

    /// Intern an identifier.
    pub fn intern(&mut self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Look up an interned identifier.
    ///
    /// # Panics
    /// Panics if `name` was not interned in this document.
    #[track_caller]
    pub fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    /// Append a statement to the root block.
    pub fn push_stmt(&mut self, stmt: NodeId) {
        if let NodeKind::Block(stmts) = self.arena.get_mut(self.root) {
            stmts.push(stmt);
        }
    }

    // ===== Target references =====

    /// Create a rebind-safe path to a node, or `None` if the node is not
    /// reachable from the root.
    pub fn create_path(&self, target: NodeId) -> Option<NodePath> {
        let mut steps = Vec::new();
        self.collect_path(self.root, target, &mut steps)
            .then(|| NodePath::new(steps, self.node(target).tag(), self.arena.uid(target)))
    }

    fn collect_path(&self, current: NodeId, target: NodeId, steps: &mut Vec<u32>) -> bool {
        if current == target {
            return true;
        }
        for (i, child) in self.node(current).children().iter().enumerate() {
            steps.push(u32::try_from(i).unwrap_or(u32::MAX));
            if self.collect_path(*child, target, steps) {
                return true;
            }
            steps.pop();
        }
        false
    }

    /// Resolve a path against the current tree.
    ///
    /// Returns `None` when any step is out of range, or when the node at
    /// the final step is not the one the path was created for (its tag or
    /// stable uid differs) — never an unrelated node, even one of the
    /// same kind shifted into the slot by a sibling edit. Pure lookup, no
    /// side effects.
    pub fn resolve(&self, path: &NodePath) -> Option<NodeId> {
        let mut current = self.root;
        for &step in path.steps() {
            current = self.node(current).child_at(step as usize)?;
        }
        let same_node =
            self.node(current).tag() == path.tag() && self.arena.uid(current) == path.uid();
        same_node.then_some(current)
    }

    /// Find the parent of a node by walking from the root.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.find_parent(self.root, id)
    }

    fn find_parent(&self, current: NodeId, target: NodeId) -> Option<NodeId> {
        for child in self.node(current).children() {
            if child == target {
                return Some(current);
            }
            if let Some(parent) = self.find_parent(child, target) {
                return Some(parent);
            }
        }
        None
    }

    /// Find the innermost node whose rendered span contains `offset`.
    pub fn find_node_at(&self, offset: u32) -> Option<NodeId> {
        let (_, spans) = self.render_with_spans();
        spans
            .iter()
            .filter(|(_, span)| span.contains(offset))
            .min_by_key(|(id, span)| (span.len(), span.start, id.raw()))
            .map(|(id, _)| *id)
    }

    // ===== Snapshots and rendering =====

    /// Deep copy of the whole document. Edits to the copy never affect
    /// the original.
    pub fn snapshot(&self) -> TreeDocument {
        self.clone()
    }

    /// Render the document to text.
    pub fn render(&self) -> String {
        Printer::render(self)
    }

    /// Render and return the per-node span table.
    pub fn render_with_spans(&self) -> (String, FxHashMap<NodeId, Span>) {
        Printer::render_with_spans(self)
    }

    /// Rendered span of one node, if it is reachable.
    pub fn span_of(&self, id: NodeId) -> Option<Span> {
        self.render_with_spans().1.get(&id).copied()
    }

    // ===== Mutation primitives =====

    /// Replace a node's kind in place. IDs of the node and of unrelated
    /// nodes stay valid.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        *self.arena.get_mut(id) = kind;
    }

    /// Rewire the parent of `id` to point at `replacement` instead.
    pub fn replace_with(&mut self, id: NodeId, replacement: NodeId) -> Result<(), DocError> {
        if id == self.root {
            self.root = replacement;
            return Ok(());
        }
        let parent = self.parent_of(id).ok_or(DocError::Detached(id))?;
        let replaced = self.arena.get_mut(parent).replace_child(id, replacement);
        debug_assert!(replaced, "parent_of returned a non-parent");
        Ok(())
    }

    /// Insert statements immediately before `anchor` in its enclosing
    /// block. Pure insertion: existing statements are never reordered.
    pub fn insert_stmts_before(&mut self, anchor: NodeId, stmts: &[NodeId]) -> Result<(), DocError> {
        let parent = self.parent_of(anchor).ok_or(DocError::Detached(anchor))?;
        let NodeKind::Block(list) = self.arena.get_mut(parent) else {
            return Err(DocError::NotInBlock(anchor));
        };
        let pos = list
            .iter()
            .position(|&s| s == anchor)
            .ok_or(DocError::Detached(anchor))?;
        for (i, &stmt) in stmts.iter().enumerate() {
            list.insert(pos + i, stmt);
        }
        Ok(())
    }

    /// Remove a statement from its enclosing block. The subtree becomes
    /// an orphan; its IDs no longer resolve through any path.
    pub fn remove_stmt(&mut self, stmt: NodeId) -> Result<(), DocError> {
        let parent = self.parent_of(stmt).ok_or(DocError::Detached(stmt))?;
        let NodeKind::Block(list) = self.arena.get_mut(parent) else {
            return Err(DocError::NotInBlock(stmt));
        };
        list.retain(|&s| s != stmt);
        Ok(())
    }

    /// Deep-clone a subtree into fresh detached nodes.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        self.arena.deep_clone(id)
    }
}

impl fmt::Debug for TreeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeDocument")
            .field("version", &self.version)
            .field("node_count", &self.arena.node_count())
            .finish_non_exhaustive()
    }
}

/// The document behind its exclusive write scope.
pub type SharedDocument = Arc<RwLock<TreeDocument>>;

/// Wrap a document in its shared write scope.
pub fn shared(doc: TreeDocument) -> SharedDocument {
    Arc::new(RwLock::new(doc))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::BinaryOp;

    fn call_stmt(doc: &mut TreeDocument, name: &str) -> NodeId {
        let callee = doc.intern(name);
        let call = doc.alloc(NodeKind::Call {
            callee,
            args: Vec::new(),
        });
        let stmt = doc.alloc(NodeKind::ExprStmt(call));
        doc.push_stmt(stmt);
        stmt
    }

    #[test]
    fn test_path_roundtrip() {
        let mut doc = TreeDocument::new();
        let stmt = call_stmt(&mut doc, "f");

        let path = doc.create_path(stmt).unwrap();
        assert_eq!(doc.resolve(&path), Some(stmt));
    }

    #[test]
    fn test_path_survives_insertion_after() {
        let mut doc = TreeDocument::new();
        let first = call_stmt(&mut doc, "f");
        let path = doc.create_path(first).unwrap();

        // Appending after the target does not disturb the path.
        call_stmt(&mut doc, "g");
        assert_eq!(doc.resolve(&path), Some(first));
    }

    #[test]
    fn test_stale_path_resolves_to_none() {
        let mut doc = TreeDocument::new();
        let only = call_stmt(&mut doc, "f");
        let path = doc.create_path(only).unwrap();

        doc.remove_stmt(only).unwrap();
        assert_eq!(doc.resolve(&path), None);
    }

    #[test]
    fn test_path_does_not_rebind_after_sibling_deletion() {
        let mut doc = TreeDocument::new();
        let a = call_stmt(&mut doc, "a");
        let b = call_stmt(&mut doc, "b");
        let c = call_stmt(&mut doc, "c");
        let path = doc.create_path(b).unwrap();

        // Deleting an earlier sibling shifts `c` into `b`'s slot; the
        // path must go stale, not silently bind to `c`.
        doc.remove_stmt(a).unwrap();
        assert_ne!(doc.resolve(&path), Some(c));
        assert_eq!(doc.resolve(&path), None);
    }

    #[test]
    fn test_path_goes_stale_after_sibling_insertion_before() {
        let mut doc = TreeDocument::new();
        let anchor = call_stmt(&mut doc, "anchor");
        let path = doc.create_path(anchor).unwrap();

        let f = doc.intern("f");
        let call = doc.alloc(NodeKind::Call {
            callee: f,
            args: Vec::new(),
        });
        let stmt = doc.alloc(NodeKind::ExprStmt(call));
        doc.insert_stmts_before(anchor, &[stmt]).unwrap();

        // The inserted statement has the same tag in the recorded slot
        // but a different identity.
        assert_ne!(doc.resolve(&path), Some(stmt));
        assert_eq!(doc.resolve(&path), None);
    }

    #[test]
    fn test_path_never_rebinds_to_other_kind() {
        let mut doc = TreeDocument::new();
        let stmt = call_stmt(&mut doc, "f");
        let path = doc.create_path(stmt).unwrap();

        // A different statement kind moves into the same slot.
        let lit = doc.alloc(NodeKind::Int(1));
        let x = doc.intern("x");
        doc.set_kind(stmt, NodeKind::Let { name: x, init: lit });
        assert_eq!(doc.resolve(&path), None);
    }

    #[test]
    fn test_insert_before_preserves_order() {
        let mut doc = TreeDocument::new();
        let anchor = call_stmt(&mut doc, "anchor");

        let a = call_stmt(&mut doc, "late");
        doc.remove_stmt(a).unwrap();

        let f = doc.intern("f");
        let g = doc.intern("g");
        let call_f = doc.alloc(NodeKind::Call {
            callee: f,
            args: Vec::new(),
        });
        let stmt_f = doc.alloc(NodeKind::ExprStmt(call_f));
        let call_g = doc.alloc(NodeKind::Call {
            callee: g,
            args: Vec::new(),
        });
        let stmt_g = doc.alloc(NodeKind::ExprStmt(call_g));

        doc.insert_stmts_before(anchor, &[stmt_f, stmt_g])
            .unwrap();
        assert_eq!(doc.render(), "f();\ng();\nanchor();\n");
    }

    #[test]
    fn test_snapshot_isolation() {
        let mut doc = TreeDocument::new();
        let stmt = call_stmt(&mut doc, "f");
        let before = doc.snapshot();

        doc.remove_stmt(stmt).unwrap();
        assert_eq!(doc.render(), "");
        assert_eq!(before.render(), "f();\n");
    }

    #[test]
    fn test_find_node_at_innermost() {
        let mut doc = TreeDocument::new();
        let x = doc.intern("x");
        let h = doc.intern("h");
        let read = doc.alloc(NodeKind::Ident(x));
        let call = doc.alloc(NodeKind::Call {
            callee: h,
            args: Vec::new(),
        });
        let sum = doc.alloc(NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: read,
            rhs: call,
        });
        let stmt = doc.alloc(NodeKind::ExprStmt(sum));
        doc.push_stmt(stmt);

        // "x + h();\n" - offset 4 is inside "h()"
        assert_eq!(doc.find_node_at(4), Some(call));
        // offset 0 is the identifier
        assert_eq!(doc.find_node_at(0), Some(read));
    }

    #[test]
    fn test_remove_non_block_child_fails() {
        let mut doc = TreeDocument::new();
        let x = doc.intern("x");
        let lit = doc.alloc(NodeKind::Int(1));
        let let_stmt = doc.alloc(NodeKind::Let { name: x, init: lit });
        doc.push_stmt(let_stmt);

        assert_eq!(doc.remove_stmt(lit), Err(DocError::NotInBlock(lit)));
    }
}
