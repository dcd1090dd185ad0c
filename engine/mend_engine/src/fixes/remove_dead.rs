//! Remove a statement, preserving its side effects on request.

use mend_effects::{classify, extract_statements};
use mend_ir::{NodeId, NodeKind, TreeDocument};

use crate::command::{ChoiceOption, Command, EditError};
use crate::fixes::{FixContext, QuickFix};
use crate::presentation::{FixPriority, Presentation};

/// Delete an expression or `let` statement. When the statement's
/// expression carries side effects the fix suspends on a chooser:
/// delete outright, or extract the effects into standalone statements
/// first and delete only the dead remainder.
pub struct RemoveDeadStatementFix;

fn inner_expr(doc: &TreeDocument, id: NodeId) -> Option<NodeId> {
    match *doc.node(id) {
        NodeKind::ExprStmt(expr) => Some(expr),
        NodeKind::Let { init, .. } => Some(init),
        _ => None,
    }
}

impl QuickFix for RemoveDeadStatementFix {
    fn presentation(&self, ctx: &FixContext<'_>) -> Option<Presentation> {
        let id = ctx.doc.resolve(&ctx.target)?;
        inner_expr(ctx.doc, id)?;
        let mut presentation = Presentation::new("Remove statement");
        if let Some(span) = ctx.doc.span_of(id) {
            presentation = presentation.with_highlight(span);
        }
        Some(presentation)
    }

    fn perform(&self, ctx: &FixContext<'_>) -> Command {
        let Some(anchor) = ctx.doc.resolve(&ctx.target) else {
            return Command::nop();
        };
        let Some(expr) = inner_expr(ctx.doc, anchor) else {
            return Command::nop();
        };

        let delete = Command::edit(ctx.target.clone(), |doc, id| Ok(doc.remove_stmt(id)?));

        let forest = classify(ctx.doc, expr, ctx.policy.as_ref());
        if forest.is_empty() {
            return delete;
        }

        let policy = ctx.policy.clone();
        let keep_effects = Command::edit(ctx.target.clone(), move |doc, anchor| {
            let Some(expr) = inner_expr(doc, anchor) else {
                return Err(EditError::InvalidTarget("statement has no expression"));
            };
            // Re-classify against the live document; it may have changed
            // since the command was built.
            let forest = classify(doc, expr, policy.as_ref());
            if forest.is_empty() {
                return Ok(doc.remove_stmt(anchor)?);
            }
            // The whole expression is one effect: drop any binding and
            // keep it as a bare expression statement.
            if let Some(whole) = doc.create_path(expr) {
                if forest.single_covering(&whole) {
                    doc.set_kind(anchor, NodeKind::ExprStmt(expr));
                    return Ok(());
                }
            }
            let stmts = extract_statements(doc, &forest, policy.as_ref())?;
            doc.insert_stmts_before(anchor, &stmts)?;
            Ok(doc.remove_stmt(anchor)?)
        });

        Command::choose_one(
            "Statement has side effects",
            vec![
                ChoiceOption::new(Presentation::new("Remove completely"), delete),
                ChoiceOption::new(
                    Presentation::new("Extract side effects first")
                        .with_priority(FixPriority::High),
                    keep_effects,
                ),
            ],
        )
    }
}
