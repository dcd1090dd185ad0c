//! Quick-fix capabilities and their registry.
//!
//! A `QuickFix` decides whether it applies at a target (presentation)
//! and builds the command that performs it. Both run against a read
//! view; the command only mutates when an apply session commits it.

use std::fmt;
use std::sync::Arc;

use mend_effects::PolicyHandle;
use mend_ir::{NodePath, TreeDocument};

use crate::command::Command;
use crate::presentation::Presentation;

mod introduce_var;
mod remove_dead;
mod simplify_not;

pub use introduce_var::IntroduceVariableFix;
pub use remove_dead::RemoveDeadStatementFix;
pub use simplify_not::SimplifyDoubleNegationFix;

/// Everything a fix may consult when deciding applicability and
/// building its command.
pub struct FixContext<'a> {
    pub doc: &'a TreeDocument,
    pub target: NodePath,
    pub policy: PolicyHandle,
}

impl<'a> FixContext<'a> {
    pub fn new(doc: &'a TreeDocument, target: NodePath, policy: PolicyHandle) -> Self {
        FixContext {
            doc,
            target,
            policy,
        }
    }
}

/// A registered quick-fix capability.
pub trait QuickFix: Send + Sync {
    /// How this fix presents at the target, or `None` when it does not
    /// apply there. Never mutates.
    fn presentation(&self, ctx: &FixContext<'_>) -> Option<Presentation>;

    /// Build the command performing this fix at the target.
    fn perform(&self, ctx: &FixContext<'_>) -> Command;
}

/// Registry of available fixes, queried per target.
#[derive(Default)]
pub struct FixRegistry {
    fixes: Vec<Arc<dyn QuickFix>>,
}

impl FixRegistry {
    pub fn new() -> Self {
        FixRegistry::default()
    }

    /// Registry preloaded with the built-in fixes.
    pub fn with_builtin_fixes() -> Self {
        let mut registry = FixRegistry::new();
        registry.register(RemoveDeadStatementFix);
        registry.register(IntroduceVariableFix);
        registry.register(SimplifyDoubleNegationFix);
        registry
    }

    pub fn register<F: QuickFix + 'static>(&mut self, fix: F) {
        self.fixes.push(Arc::new(fix));
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn QuickFix> {
        self.fixes.get(index).map(|fix| &**fix)
    }

    /// All fixes applicable at the context's target, as registry index
    /// plus presentation.
    pub fn applicable(&self, ctx: &FixContext<'_>) -> Vec<(usize, Presentation)> {
        self.fixes
            .iter()
            .enumerate()
            .filter_map(|(index, fix)| fix.presentation(ctx).map(|p| (index, p)))
            .collect()
    }
}

impl fmt::Debug for FixRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixRegistry")
            .field("fixes", &self.fixes.len())
            .finish()
    }
}
