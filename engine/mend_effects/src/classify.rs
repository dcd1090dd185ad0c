//! Side-effect classification.
//!
//! Walks an expression subtree in pre-order (left-to-right evaluation
//! order) and collects the fragments whose evaluation has observable
//! effects.
//!
//! # Design
//!
//! - An effectful node is collected as a single unit: its effectful
//!   descendants are subsumed, because extracting the parent already
//!   replays argument evaluation order as part of one atomic effect.
//! - A pure parent with effectful children yields each child as an
//!   independent, order-preserving effect; pure siblings are discarded.
//! - Short-circuit operands are never flattened past their guard. When
//!   the right operand of `&&`/`||` carries effects, the classifier
//!   emits a `Guarded` subtree (the left operand becomes the guard
//!   condition, negated for `||`) instead of a flat list, so a later
//!   effect cannot run when the original expression would have skipped
//!   it.
//!
//! Classification is a pure, read-only analysis: repeated calls on an
//! unmodified document yield identical forests, and it may run off the
//! document's write scope against a snapshot.

use mend_ir::{BinaryOp, NodeId, NodeKind, NodePath, TreeDocument};

use crate::policy::EffectPolicy;

/// One effectful fragment, in original evaluation order.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Effect {
    /// Rebind-safe reference to the effectful expression.
    pub expr: NodePath,
    /// Position in left-to-right evaluation order, starting at 0.
    pub order: u32,
}

/// Classification result node: a bare effect, or effects that are
/// control-dependent on an earlier operand.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum EffectTree {
    /// An effect guaranteed to execute (relative to its parent context).
    Leaf(Effect),
    /// Effects that only execute when `condition` evaluates truthy
    /// (falsy when `negate` is set, i.e. the `||` case). Evaluating the
    /// condition itself replays any effects the guard operand had.
    Guarded {
        condition: NodePath,
        negate: bool,
        children: Vec<EffectTree>,
    },
}

/// Ordered collection of classified effects.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct EffectForest {
    trees: Vec<EffectTree>,
    count: u32,
}

impl EffectForest {
    /// The classified trees in evaluation order.
    pub fn trees(&self) -> &[EffectTree] {
        &self.trees
    }

    /// Number of extractable leaf effects, including those nested under
    /// guards. Effects inside a guard *condition* are not counted: the
    /// condition is replayed verbatim by the synthesized `if`, so they
    /// never become separate statements.
    pub fn effect_count(&self) -> usize {
        self.count as usize
    }

    /// Whether the expression had no effects at all (safe to delete
    /// outright).
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Whether the result is exactly one unguarded effect covering the
    /// whole classified expression. Callers should skip statement
    /// synthesis in this case and keep the bare expression-statement.
    pub fn single_covering(&self, whole: &NodePath) -> bool {
        match self.trees.as_slice() {
            [EffectTree::Leaf(effect)] => effect.expr == *whole,
            _ => false,
        }
    }

    /// Flatten to the effects in order, ignoring guard structure.
    pub fn effects_in_order(&self) -> Vec<&Effect> {
        fn walk<'a>(trees: &'a [EffectTree], out: &mut Vec<&'a Effect>) {
            for tree in trees {
                match tree {
                    EffectTree::Leaf(effect) => out.push(effect),
                    EffectTree::Guarded { children, .. } => walk(children, out),
                }
            }
        }
        let mut out = Vec::with_capacity(self.effect_count());
        walk(&self.trees, &mut out);
        out
    }
}

/// Classify the effects of an expression subtree.
///
/// Statement wrappers (`ExprStmt`, `Let`, `Return`) are transparently
/// unwrapped to their expression. Block-structured statements are not
/// descended into: their effects are already control-structured and are
/// not this analysis' job.
pub fn classify(doc: &TreeDocument, expr: NodeId, policy: &dyn EffectPolicy) -> EffectForest {
    let mut forest = EffectForest::default();
    let target = match *doc.node(expr) {
        NodeKind::ExprStmt(inner) | NodeKind::Let { init: inner, .. } => inner,
        NodeKind::Return(inner) => match inner {
            Some(inner) => inner,
            None => return forest,
        },
        NodeKind::If { .. } | NodeKind::Block(_) => return forest,
        _ => expr,
    };
    walk(doc, target, policy, &mut forest.count, &mut forest.trees);
    forest
}

fn walk(
    doc: &TreeDocument,
    id: NodeId,
    policy: &dyn EffectPolicy,
    count: &mut u32,
    out: &mut Vec<EffectTree>,
) {
    if policy.is_effectful(doc, id) {
        if let Some(path) = doc.create_path(id) {
            let order = *count;
            *count += 1;
            out.push(EffectTree::Leaf(Effect { expr: path, order }));
        }
        return;
    }

    match doc.node(id) {
        NodeKind::Binary { op, lhs, rhs } if op.is_short_circuit() => {
            let mut rhs_trees = Vec::new();
            let mut rhs_count = *count;
            walk(doc, *rhs, policy, &mut rhs_count, &mut rhs_trees);
            if rhs_trees.is_empty() {
                // No control-dependent effects; only the guard operand's
                // own effects remain.
                walk(doc, *lhs, policy, count, out);
            } else if let Some(condition) = doc.create_path(*lhs) {
                *count = rhs_count;
                out.push(EffectTree::Guarded {
                    condition,
                    negate: matches!(op, BinaryOp::Or),
                    children: rhs_trees,
                });
            }
        }
        kind => {
            for child in kind.children() {
                walk(doc, child, policy, count, out);
            }
        }
    }
}
