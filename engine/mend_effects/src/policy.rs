//! Pluggable effect predicates.
//!
//! Which constructs count as "calls" or "assignments" is language
//! defined, so the classifier and extractor take the predicate pair as
//! explicit configuration rather than reading ambient state. This keeps
//! both analyses testable in isolation and lets a host swap in its own
//! semantic oracle.

use std::sync::Arc;

use mend_ir::{NodeId, NodeKind, TreeDocument};

/// Language-defined effect predicates.
pub trait EffectPolicy: Send + Sync {
    /// Whether evaluating this node has an observable side effect.
    fn is_effectful(&self, doc: &TreeDocument, id: NodeId) -> bool;

    /// Whether this node can form a standalone expression statement.
    fn can_stand_alone(&self, doc: &TreeDocument, id: NodeId) -> bool;
}

/// Shared, clone-cheap policy handle. Commands capture one of these so a
/// mutation closure can re-run classification at apply time.
pub type PolicyHandle = Arc<dyn EffectPolicy>;

/// Default policy for the built-in node set.
///
/// Effectful: calls, assignments, increment/decrement, and constructions
/// whose arguments are themselves effectful. Pure: literals, reads,
/// arithmetic/boolean combinations of pure operands.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultPolicy;

impl DefaultPolicy {
    /// Wrap in a shared handle.
    pub fn handle() -> PolicyHandle {
        Arc::new(DefaultPolicy)
    }
}

impl EffectPolicy for DefaultPolicy {
    fn is_effectful(&self, doc: &TreeDocument, id: NodeId) -> bool {
        match doc.node(id) {
            NodeKind::Call { .. }
            | NodeKind::MethodCall { .. }
            | NodeKind::Assign { .. }
            | NodeKind::Increment { .. }
            | NodeKind::Decrement { .. } => true,
            NodeKind::New { args, .. } => args.iter().any(|&arg| self.is_effectful(doc, arg)),
            _ => false,
        }
    }

    fn can_stand_alone(&self, doc: &TreeDocument, id: NodeId) -> bool {
        matches!(
            doc.node(id),
            NodeKind::Call { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::Assign { .. }
                | NodeKind::Increment { .. }
                | NodeKind::Decrement { .. }
                | NodeKind::New { .. }
        )
    }
}
