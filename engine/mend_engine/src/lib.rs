//! The mend transformation command engine.
//!
//! Quick fixes are built as immutable [`Command`] values over rebind-safe
//! targets ([`mend_ir::NodePath`]) and applied transactionally by an
//! [`ApplySession`]: choosers suspend the session without holding the
//! document's write lock, and a commit either applies completely or
//! leaves the document byte-for-byte unchanged.
//!
//! The [`fixes`] module hosts the capability interface ([`fixes::QuickFix`]),
//! the registry, and the built-in fixes.

mod apply;
mod command;
pub mod fixes;
mod presentation;
mod template;

pub use apply::{
    preview_diff, AppliedResult, ApplySession, ChoicePrompt, Outcome, PreviewDiff, PreviewError,
    PromptKind, Selection, SessionError, Status,
};
pub use command::{Candidate, ChoiceOption, Command, EditError, MutateFn, ResolveFn};
pub use presentation::{FixPriority, Presentation};
pub use template::{
    ActiveTemplate, Placeholder, PlaceholderSet, TemplateError, TemplateMode, TemplateStop,
};
