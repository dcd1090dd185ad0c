//! Bind an expression statement's result to a local variable.

use mend_ir::{NodeKind, NodePath, NodeTag};

use crate::command::{Command, EditError};
use crate::fixes::{FixContext, QuickFix};
use crate::presentation::Presentation;
use crate::template::{Placeholder, PlaceholderSet};

const DEFAULT_NAME: &str = "value";

/// Turn `expr();` into `let value = expr();`, with a rename placeholder
/// over the new binding.
pub struct IntroduceVariableFix;

impl IntroduceVariableFix {
    /// Placeholder set for renaming the introduced binding. The edit
    /// rewrites the anchor node in place, so its identity and position
    /// survive; only the expected kind changes to `let`.
    pub fn placeholders(target: &NodePath) -> PlaceholderSet {
        let let_path = NodePath::new(target.steps().to_vec(), NodeTag::Let, target.uid());
        PlaceholderSet::new().with(
            Placeholder::new(let_path, DEFAULT_NAME)
                .with_alternatives(vec!["result".into(), "tmp".into()]),
        )
    }
}

impl QuickFix for IntroduceVariableFix {
    fn presentation(&self, ctx: &FixContext<'_>) -> Option<Presentation> {
        let id = ctx.doc.resolve(&ctx.target)?;
        matches!(ctx.doc.node(id), NodeKind::ExprStmt(_)).then(|| {
            let mut presentation = Presentation::new("Introduce local variable");
            if let Some(span) = ctx.doc.span_of(id) {
                presentation = presentation.with_highlight(span);
            }
            presentation
        })
    }

    fn perform(&self, ctx: &FixContext<'_>) -> Command {
        Command::edit(ctx.target.clone(), |doc, id| {
            let &NodeKind::ExprStmt(expr) = doc.node(id) else {
                return Err(EditError::InvalidTarget("expected an expression statement"));
            };
            let name = doc.intern(DEFAULT_NAME);
            doc.set_kind(id, NodeKind::Let { name, init: expr });
            Ok(())
        })
    }
}
