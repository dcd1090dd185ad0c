//! Statement synthesis from classified effects.
//!
//! Turns an `EffectForest` into minimal standalone statements whose
//! execution replays the original side-effect sequence. Guarded subtrees
//! become `if` statements so short-circuit semantics survive extraction.
//!
//! # Design
//!
//! Synthesis is two-phase: a validation pass proves every effect still
//! resolves and can form a statement, then a build pass allocates the new
//! nodes. A failed validation allocates nothing, so the caller can fall
//! back to "keep everything" with the document untouched.

use mend_ir::{NodeId, NodeKind, NodePath, TreeDocument, UnaryOp};
use thiserror::Error;

use crate::classify::{EffectForest, EffectTree};
use crate::policy::EffectPolicy;

/// Extraction failure. The document is guaranteed unchanged.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// An effect's target reference no longer resolves.
    #[error("effect expression no longer resolves: {0:?}")]
    StaleEffect(NodePath),
    /// An effect cannot form a standalone statement in this context.
    #[error("effect expression cannot stand alone as a statement: {0:?}")]
    CannotStandAlone(NodePath),
}

/// Synthesize standalone statements for every effect in the forest.
///
/// Returned statements are detached nodes in original effect order; the
/// caller inserts them immediately before the anchor being deleted or
/// replaced. On error nothing has been allocated.
pub fn extract_statements(
    doc: &mut TreeDocument,
    forest: &EffectForest,
    policy: &dyn EffectPolicy,
) -> Result<Vec<NodeId>, ExtractError> {
    validate(doc, forest.trees(), policy)?;
    let mut stmts = Vec::with_capacity(forest.trees().len());
    for tree in forest.trees() {
        stmts.push(build(doc, tree));
    }
    Ok(stmts)
}

fn validate(
    doc: &TreeDocument,
    trees: &[EffectTree],
    policy: &dyn EffectPolicy,
) -> Result<(), ExtractError> {
    for tree in trees {
        match tree {
            EffectTree::Leaf(effect) => {
                let id = doc
                    .resolve(&effect.expr)
                    .ok_or_else(|| ExtractError::StaleEffect(effect.expr.clone()))?;
                if !policy.can_stand_alone(doc, id) {
                    return Err(ExtractError::CannotStandAlone(effect.expr.clone()));
                }
            }
            EffectTree::Guarded {
                condition,
                children,
                ..
            } => {
                doc.resolve(condition)
                    .ok_or_else(|| ExtractError::StaleEffect(condition.clone()))?;
                validate(doc, children, policy)?;
            }
        }
    }
    Ok(())
}

/// Build one synthesized statement. Only called after validation, so
/// resolution cannot fail here; a stale path at this point would mean the
/// document changed mid-extraction, which the write scope rules out.
fn build(doc: &mut TreeDocument, tree: &EffectTree) -> NodeId {
    match tree {
        EffectTree::Leaf(effect) => {
            let id = doc.resolve(&effect.expr).unwrap_or(NodeId::INVALID);
            let cloned = doc.deep_clone(id);
            doc.alloc(NodeKind::ExprStmt(cloned))
        }
        EffectTree::Guarded {
            condition,
            negate,
            children,
        } => {
            let cond_id = doc.resolve(condition).unwrap_or(NodeId::INVALID);
            let mut cond = doc.deep_clone(cond_id);
            if *negate {
                cond = doc.alloc(NodeKind::Unary {
                    op: UnaryOp::Not,
                    operand: cond,
                });
            }
            let mut body = Vec::with_capacity(children.len());
            for child in children {
                body.push(build(doc, child));
            }
            let block = doc.alloc(NodeKind::Block(body));
            doc.alloc(NodeKind::If {
                cond,
                then_block: block,
                else_block: None,
            })
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use mend_ir::BinaryOp;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::classify::classify;
    use crate::policy::DefaultPolicy;

    fn call(doc: &mut TreeDocument, name: &str) -> NodeId {
        let callee = doc.intern(name);
        doc.alloc(NodeKind::Call {
            callee,
            args: Vec::new(),
        })
    }

    fn attach(doc: &mut TreeDocument, expr: NodeId) -> NodeId {
        let stmt = doc.alloc(NodeKind::ExprStmt(expr));
        doc.push_stmt(stmt);
        stmt
    }

    #[test]
    fn test_extract_two_calls_in_order() {
        let mut doc = TreeDocument::new();
        let f = call(&mut doc, "f");
        let g = call(&mut doc, "g");
        let sum = doc.alloc(NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: f,
            rhs: g,
        });
        let anchor = attach(&mut doc, sum);

        let forest = classify(&doc, sum, &DefaultPolicy);
        let stmts = extract_statements(&mut doc, &forest, &DefaultPolicy).unwrap();
        doc.insert_stmts_before(anchor, &stmts).unwrap();
        doc.remove_stmt(anchor).unwrap();

        assert_eq!(doc.render(), "f();\ng();\n");
    }

    #[test]
    fn test_extract_discards_pure_operand() {
        let mut doc = TreeDocument::new();
        let x = doc.intern("x");
        let read = doc.alloc(NodeKind::Ident(x));
        let h = call(&mut doc, "h");
        let sum = doc.alloc(NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: read,
            rhs: h,
        });
        let anchor = attach(&mut doc, sum);

        let forest = classify(&doc, sum, &DefaultPolicy);
        let stmts = extract_statements(&mut doc, &forest, &DefaultPolicy).unwrap();
        doc.insert_stmts_before(anchor, &stmts).unwrap();
        doc.remove_stmt(anchor).unwrap();

        assert_eq!(doc.render(), "h();\n");
    }

    #[test]
    fn test_extract_short_circuit_emits_if() {
        let mut doc = TreeDocument::new();
        let a = doc.intern("a");
        let cond = doc.alloc(NodeKind::Ident(a));
        let side = call(&mut doc, "sideEffect");
        let and = doc.alloc(NodeKind::Binary {
            op: BinaryOp::And,
            lhs: cond,
            rhs: side,
        });
        let anchor = attach(&mut doc, and);

        let forest = classify(&doc, and, &DefaultPolicy);
        let stmts = extract_statements(&mut doc, &forest, &DefaultPolicy).unwrap();
        doc.insert_stmts_before(anchor, &stmts).unwrap();
        doc.remove_stmt(anchor).unwrap();

        assert_eq!(doc.render(), "if (a) {\n    sideEffect();\n}\n");
    }

    #[test]
    fn test_extract_or_negates_guard() {
        let mut doc = TreeDocument::new();
        let a = doc.intern("a");
        let cond = doc.alloc(NodeKind::Ident(a));
        let side = call(&mut doc, "fallback");
        let or = doc.alloc(NodeKind::Binary {
            op: BinaryOp::Or,
            lhs: cond,
            rhs: side,
        });
        let anchor = attach(&mut doc, or);

        let forest = classify(&doc, or, &DefaultPolicy);
        let stmts = extract_statements(&mut doc, &forest, &DefaultPolicy).unwrap();
        doc.insert_stmts_before(anchor, &stmts).unwrap();
        doc.remove_stmt(anchor).unwrap();

        assert_eq!(doc.render(), "if (!a) {\n    fallback();\n}\n");
    }

    #[test]
    fn test_failed_extraction_allocates_nothing() {
        struct NothingStandsAlone;
        impl EffectPolicy for NothingStandsAlone {
            fn is_effectful(&self, doc: &TreeDocument, id: NodeId) -> bool {
                DefaultPolicy.is_effectful(doc, id)
            }
            fn can_stand_alone(&self, _doc: &TreeDocument, _id: NodeId) -> bool {
                false
            }
        }

        let mut doc = TreeDocument::new();
        let f = call(&mut doc, "f");
        let anchor = attach(&mut doc, f);
        let _ = anchor;

        let forest = classify(&doc, f, &DefaultPolicy);
        let before = doc.render();
        let result = extract_statements(&mut doc, &forest, &NothingStandsAlone);
        assert!(matches!(result, Err(ExtractError::CannotStandAlone(_))));
        assert_eq!(doc.render(), before);
    }

    #[test]
    fn test_stale_effect_aborts() {
        let mut doc = TreeDocument::new();
        let f = call(&mut doc, "f");
        let anchor = attach(&mut doc, f);

        let forest = classify(&doc, f, &DefaultPolicy);
        doc.remove_stmt(anchor).unwrap();

        let result = extract_statements(&mut doc, &forest, &DefaultPolicy);
        assert!(matches!(result, Err(ExtractError::StaleEffect(_))));
    }
}
