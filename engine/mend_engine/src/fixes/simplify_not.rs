//! Collapse `!!expr` to `expr`.

use mend_ir::{NodeId, NodeKind, TreeDocument, UnaryOp};

use crate::command::{Command, EditError};
use crate::fixes::{FixContext, QuickFix};
use crate::presentation::Presentation;

pub struct SimplifyDoubleNegationFix;

fn double_negation_operand(doc: &TreeDocument, id: NodeId) -> Option<NodeId> {
    let &NodeKind::Unary {
        op: UnaryOp::Not,
        operand,
    } = doc.node(id)
    else {
        return None;
    };
    let &NodeKind::Unary {
        op: UnaryOp::Not,
        operand: inner,
    } = doc.node(operand)
    else {
        return None;
    };
    Some(inner)
}

impl QuickFix for SimplifyDoubleNegationFix {
    fn presentation(&self, ctx: &FixContext<'_>) -> Option<Presentation> {
        let id = ctx.doc.resolve(&ctx.target)?;
        double_negation_operand(ctx.doc, id)?;
        let mut presentation = Presentation::new("Remove double negation");
        if let Some(span) = ctx.doc.span_of(id) {
            presentation = presentation.with_highlight(span);
        }
        Some(presentation)
    }

    fn perform(&self, ctx: &FixContext<'_>) -> Command {
        Command::edit(ctx.target.clone(), |doc, id| {
            let Some(inner) = double_negation_operand(doc, id) else {
                return Err(EditError::InvalidTarget("expected a double negation"));
            };
            Ok(doc.replace_with(id, inner)?)
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use mend_effects::DefaultPolicy;
    use mend_ir::shared;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::apply::{ApplySession, Outcome, Status};

    fn double_not_doc() -> (TreeDocument, mend_ir::NodePath) {
        let mut doc = TreeDocument::new();
        let a = doc.intern("a");
        let read = doc.alloc(NodeKind::Ident(a));
        let inner = doc.alloc(NodeKind::Unary {
            op: UnaryOp::Not,
            operand: read,
        });
        let outer = doc.alloc(NodeKind::Unary {
            op: UnaryOp::Not,
            operand: inner,
        });
        let x = doc.intern("x");
        let stmt = doc.alloc(NodeKind::Let {
            name: x,
            init: outer,
        });
        doc.push_stmt(stmt);
        let path = doc.create_path(outer).unwrap();
        (doc, path)
    }

    #[test]
    fn test_collapses_double_negation() {
        let (doc, target) = double_not_doc();
        let ctx = FixContext::new(&doc, target, DefaultPolicy::handle());
        assert!(SimplifyDoubleNegationFix.presentation(&ctx).is_some());
        let cmd = SimplifyDoubleNegationFix.perform(&ctx);

        let doc = shared(doc);
        let mut session = ApplySession::new(doc.clone(), cmd);
        assert!(matches!(session.step(), Status::Finished(Outcome::Applied(_))));
        assert_eq!(doc.read().render(), "let x = a;\n");
    }

    #[test]
    fn test_single_negation_is_not_applicable() {
        let mut doc = TreeDocument::new();
        let a = doc.intern("a");
        let read = doc.alloc(NodeKind::Ident(a));
        let not = doc.alloc(NodeKind::Unary {
            op: UnaryOp::Not,
            operand: read,
        });
        let x = doc.intern("x");
        let stmt = doc.alloc(NodeKind::Let { name: x, init: not });
        doc.push_stmt(stmt);
        let target = doc.create_path(not).unwrap();

        let ctx = FixContext::new(&doc, target, DefaultPolicy::handle());
        assert!(SimplifyDoubleNegationFix.presentation(&ctx).is_none());
    }
}
