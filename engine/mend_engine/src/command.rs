//! The transformation command algebra.
//!
//! A `Command` is an immutable description of an edit: leaf mutations
//! against rebind-safe targets, interactive choosers, and sequential
//! composition. Building a command never mutates the document; all
//! mutation happens when a resolved command is committed by an apply
//! session.

use std::fmt;
use std::sync::Arc;

use mend_effects::ExtractError;
use mend_ir::{DocError, NodeId, NodePath, TreeDocument};
use thiserror::Error;

use crate::presentation::Presentation;

/// Failure inside a committed transaction. The session rolls the
/// document back to its pre-transaction state on any of these.
#[derive(Debug, Error)]
pub enum EditError {
    /// An edit target no longer resolves against the live document.
    #[error("edit target no longer resolves")]
    StaleTarget,
    /// The target resolved but does not have the shape the edit needs.
    #[error("edit target has unexpected shape: {0}")]
    InvalidTarget(&'static str),
    /// A chooser survived into the commit phase unresolved.
    #[error("command still contains an unresolved chooser")]
    UnresolvedChoice,
    /// A mutation closure panicked; the panic was contained.
    #[error("mutation function panicked")]
    MutatorPanicked,
    /// Effect extraction failed inside a mutation.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// A structural mutation primitive failed.
    #[error(transparent)]
    Doc(#[from] DocError),
}

/// Mutation closure for a leaf edit. Receives the document and the
/// resolved target node.
pub type MutateFn = Arc<dyn Fn(&mut TreeDocument, NodeId) -> Result<(), EditError> + Send + Sync>;

/// Continuation of a multi-select chooser: maps the selected candidate
/// indices to the command that performs the corresponding edits.
pub type ResolveFn = Arc<dyn Fn(&[usize]) -> Command + Send + Sync>;

/// One alternative of a single-select chooser.
#[derive(Clone)]
pub struct ChoiceOption {
    pub presentation: Presentation,
    pub command: Command,
}

impl ChoiceOption {
    pub fn new(presentation: Presentation, command: Command) -> Self {
        ChoiceOption {
            presentation,
            command,
        }
    }
}

impl fmt::Debug for ChoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceOption")
            .field("label", &self.presentation.label)
            .field("command", &self.command)
            .finish()
    }
}

/// One candidate of a multi-select chooser.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    pub label: String,
    pub preselected: bool,
}

impl Candidate {
    pub fn new(label: impl Into<String>) -> Self {
        Candidate {
            label: label.into(),
            preselected: false,
        }
    }

    pub fn preselected(label: impl Into<String>) -> Self {
        Candidate {
            label: label.into(),
            preselected: true,
        }
    }
}

/// An immutable transformation command.
#[derive(Clone)]
pub enum Command {
    /// Do nothing. Identity of sequencing.
    Nop,
    /// Mutate the node the target resolves to.
    Edit { target: NodePath, mutate: MutateFn },
    /// Suspend for a single selection; the chosen option's command runs
    /// in this slot.
    ChooseOne {
        prompt: String,
        options: Vec<ChoiceOption>,
    },
    /// Suspend for a subset selection; `resolve` maps the selected
    /// indices to the command that runs in this slot.
    ChooseMultiple {
        prompt: String,
        candidates: Vec<Candidate>,
        resolve: ResolveFn,
    },
    /// Run sub-commands left to right.
    Sequence(Vec<Command>),
}

impl Command {
    pub fn nop() -> Self {
        Command::Nop
    }

    pub fn edit(
        target: NodePath,
        mutate: impl Fn(&mut TreeDocument, NodeId) -> Result<(), EditError> + Send + Sync + 'static,
    ) -> Self {
        Command::Edit {
            target,
            mutate: Arc::new(mutate),
        }
    }

    pub fn choose_one(prompt: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Command::ChooseOne {
            prompt: prompt.into(),
            options,
        }
    }

    pub fn choose_multiple(
        prompt: impl Into<String>,
        candidates: Vec<Candidate>,
        resolve: impl Fn(&[usize]) -> Command + Send + Sync + 'static,
    ) -> Self {
        Command::ChooseMultiple {
            prompt: prompt.into(),
            candidates,
            resolve: Arc::new(resolve),
        }
    }

    pub fn sequence(commands: Vec<Command>) -> Self {
        Command::Sequence(commands)
    }

    pub fn is_nop(&self) -> bool {
        matches!(self, Command::Nop)
    }

    /// Whether any chooser remains anywhere in the command.
    pub fn has_choosers(&self) -> bool {
        match self {
            Command::Nop | Command::Edit { .. } => false,
            Command::ChooseOne { .. } | Command::ChooseMultiple { .. } => true,
            Command::Sequence(commands) => commands.iter().any(Command::has_choosers),
        }
    }

    /// Canonical form under the sequencing laws: `Nop` is dropped from
    /// sequences, nested sequences are flattened, empty sequences become
    /// `Nop`, singleton sequences become their element, and a
    /// single-option chooser becomes that option's command.
    #[must_use]
    pub fn normalize(self) -> Self {
        match self {
            Command::Sequence(commands) => {
                let mut flat = Vec::with_capacity(commands.len());
                for command in commands {
                    match command.normalize() {
                        Command::Nop => {}
                        Command::Sequence(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                match flat.len() {
                    0 => Command::Nop,
                    1 => flat.pop().unwrap_or(Command::Nop),
                    _ => Command::Sequence(flat),
                }
            }
            Command::ChooseOne { mut options, .. } if options.len() == 1 => {
                options.remove(0).command.normalize()
            }
            other => other,
        }
    }

    /// Resolve every chooser to its default: the first option of a
    /// single-select, the preselected candidates of a multi-select.
    /// Returns `None` if a single-select chooser has no options.
    #[must_use]
    pub fn resolve_defaults(self) -> Option<Command> {
        match self {
            done @ (Command::Nop | Command::Edit { .. }) => Some(done),
            Command::Sequence(commands) => commands
                .into_iter()
                .map(Command::resolve_defaults)
                .collect::<Option<Vec<_>>>()
                .map(Command::Sequence),
            Command::ChooseOne { mut options, .. } => {
                if options.is_empty() {
                    None
                } else {
                    options.remove(0).command.resolve_defaults()
                }
            }
            Command::ChooseMultiple {
                candidates,
                resolve,
                ..
            } => {
                let selected: Vec<usize> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, candidate)| candidate.preselected)
                    .map(|(index, _)| index)
                    .collect();
                resolve(&selected).resolve_defaults()
            }
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Nop => f.write_str("Nop"),
            Command::Edit { target, .. } => f
                .debug_struct("Edit")
                .field("target", target)
                .finish_non_exhaustive(),
            Command::ChooseOne { prompt, options } => f
                .debug_struct("ChooseOne")
                .field("prompt", prompt)
                .field("options", options)
                .finish(),
            Command::ChooseMultiple {
                prompt, candidates, ..
            } => f
                .debug_struct("ChooseMultiple")
                .field("prompt", prompt)
                .field("candidates", candidates)
                .finish_non_exhaustive(),
            Command::Sequence(commands) => f.debug_tuple("Sequence").field(commands).finish(),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use mend_ir::{NodeKind, NodePath, NodeTag};

    use super::*;

    fn dummy_edit() -> Command {
        Command::edit(
            NodePath::new(vec![0], NodeTag::ExprStmt, 0),
            |_doc, _id| Ok(()),
        )
    }

    #[test]
    fn test_normalize_drops_nops_and_flattens() {
        let cmd = Command::sequence(vec![
            Command::nop(),
            Command::sequence(vec![dummy_edit(), Command::nop()]),
            Command::sequence(vec![]),
        ]);
        let normalized = cmd.normalize();
        assert!(matches!(normalized, Command::Edit { .. }));
    }

    #[test]
    fn test_normalize_empty_sequence_is_nop() {
        let cmd = Command::sequence(vec![Command::nop(), Command::sequence(vec![])]);
        assert!(cmd.normalize().is_nop());
    }

    #[test]
    fn test_normalize_unwraps_single_option_chooser() {
        let cmd = Command::choose_one(
            "only one way",
            vec![ChoiceOption::new(Presentation::new("do it"), dummy_edit())],
        );
        let normalized = cmd.normalize();
        assert!(matches!(normalized, Command::Edit { .. }));
        assert!(!normalized.has_choosers());
    }

    #[test]
    fn test_normalize_keeps_multi_option_chooser() {
        let cmd = Command::choose_one(
            "pick",
            vec![
                ChoiceOption::new(Presentation::new("a"), dummy_edit()),
                ChoiceOption::new(Presentation::new("b"), Command::nop()),
            ],
        );
        assert!(cmd.normalize().has_choosers());
    }

    #[test]
    fn test_resolve_defaults_picks_first_option() {
        let cmd = Command::choose_one(
            "pick",
            vec![
                ChoiceOption::new(Presentation::new("a"), dummy_edit()),
                ChoiceOption::new(Presentation::new("b"), Command::nop()),
            ],
        );
        let resolved = cmd.resolve_defaults().unwrap();
        assert!(matches!(resolved, Command::Edit { .. }));
    }

    #[test]
    fn test_resolve_defaults_empty_chooser_is_none() {
        let cmd = Command::choose_one("pick", vec![]);
        assert!(cmd.resolve_defaults().is_none());
    }

    #[test]
    fn test_resolve_defaults_uses_preselection() {
        let cmd = Command::choose_multiple(
            "which",
            vec![
                Candidate::new("a"),
                Candidate::preselected("b"),
                Candidate::preselected("c"),
            ],
            |selected| {
                assert_eq!(selected, &[1, 2]);
                Command::nop()
            },
        );
        assert!(cmd.resolve_defaults().unwrap().is_nop());
    }

    #[test]
    fn test_edit_closure_runs_against_document() {
        let mut doc = TreeDocument::new();
        let f = doc.intern("f");
        let call = doc.alloc(NodeKind::Call {
            callee: f,
            args: Vec::new(),
        });
        let stmt = doc.alloc(NodeKind::ExprStmt(call));
        doc.push_stmt(stmt);
        let path = doc.create_path(stmt).unwrap();

        let cmd = Command::edit(path.clone(), |doc, id| Ok(doc.remove_stmt(id)?));
        let Command::Edit { target, mutate } = cmd else {
            panic!("expected an edit");
        };
        let id = doc.resolve(&target).unwrap();
        mutate(&mut doc, id).unwrap();
        assert_eq!(doc.render(), "");
    }
}
