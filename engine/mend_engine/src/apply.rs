//! Transactional application of commands.
//!
//! An `ApplySession` drives one command to completion against a shared
//! document. Chooser resolution happens without holding the write lock;
//! once the command is fully resolved the session commits in a single
//! write-locked transaction. A transaction either applies completely
//! (version bumped exactly once) or leaves the document byte-for-byte
//! unchanged.

use std::panic::{catch_unwind, AssertUnwindSafe};

use mend_ir::{SharedDocument, TreeDocument};
use thiserror::Error;

use crate::command::{Candidate, Command, EditError};
use crate::presentation::Presentation;
use crate::template::{ActiveTemplate, PlaceholderSet, TemplateMode};

/// Result of a committed transaction.
#[derive(Clone, Debug)]
pub struct AppliedResult {
    /// Document version after the commit.
    pub new_version: u64,
    /// Activated placeholder template, if the command registered one and
    /// the session runs interactively.
    pub template: Option<ActiveTemplate>,
}

/// Terminal state of an apply session.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The transaction committed.
    Applied(AppliedResult),
    /// The transaction failed and the document was rolled back.
    Aborted,
    /// The user cancelled at a suspension point. Nothing was mutated.
    Cancelled,
}

/// What a suspended chooser asks of the user.
#[derive(Clone, Debug)]
pub enum PromptKind {
    /// Pick exactly one option.
    One(Vec<Presentation>),
    /// Pick any subset of candidates.
    Many(Vec<Candidate>),
}

/// A pending question for the host UI.
#[derive(Clone, Debug)]
pub struct ChoicePrompt {
    pub prompt: String,
    pub kind: PromptKind,
}

/// Session state after a `step`.
#[derive(Clone, Debug)]
pub enum Status {
    /// A chooser is suspended; answer with `resolve_choice`.
    NeedsChoice(ChoicePrompt),
    /// The session reached a terminal outcome.
    Finished(Outcome),
}

/// The user's answer to a pending chooser.
#[derive(Clone, Debug)]
pub enum Selection {
    One(usize),
    Many(Vec<usize>),
}

/// Misuse of the session protocol.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session already reached a terminal outcome.
    #[error("session already finished")]
    Finished,
    /// No chooser is currently suspended.
    #[error("no chooser is awaiting a selection")]
    NotSuspended,
    /// The selection variant does not match the pending chooser.
    #[error("selection does not match the pending chooser")]
    SelectionMismatch,
    /// A selected index is out of range for the pending chooser.
    #[error("selected option {0} is out of range")]
    OptionOutOfRange(usize),
}

/// Drives one command to a terminal outcome.
pub struct ApplySession {
    doc: SharedDocument,
    command: Command,
    placeholders: Option<PlaceholderSet>,
    mode: TemplateMode,
    finished: Option<Outcome>,
}

impl ApplySession {
    /// Start a session for a command. The command is normalized, so a
    /// single-option chooser never suspends.
    pub fn new(doc: SharedDocument, command: Command) -> Self {
        ApplySession {
            doc,
            command: command.normalize(),
            placeholders: None,
            mode: TemplateMode::Interactive,
            finished: None,
        }
    }

    /// Register placeholders to activate after a successful commit.
    #[must_use]
    pub fn with_placeholders(mut self, placeholders: PlaceholderSet) -> Self {
        self.placeholders = Some(placeholders);
        self
    }

    /// Set the template activation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: TemplateMode) -> Self {
        self.mode = mode;
        self
    }

    /// The terminal outcome, once reached.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.finished.as_ref()
    }

    /// Advance the session: either surface the leftmost pending chooser
    /// or, when the command is fully resolved, commit it.
    ///
    /// The write lock is only taken for the commit itself; a session
    /// suspended on a chooser holds no lock.
    pub fn step(&mut self) -> Status {
        if let Some(outcome) = &self.finished {
            return Status::Finished(outcome.clone());
        }
        if let Some(prompt) = first_prompt(&self.command) {
            tracing::debug!(prompt = %prompt.prompt, "session suspended on chooser");
            return Status::NeedsChoice(prompt);
        }
        let outcome = self.commit();
        self.finished = Some(outcome.clone());
        Status::Finished(outcome)
    }

    /// Answer the currently suspended chooser. The chosen command takes
    /// the chooser's place; call `step` again to continue.
    pub fn resolve_choice(&mut self, selection: Selection) -> Result<(), SessionError> {
        if self.finished.is_some() {
            return Err(SessionError::Finished);
        }
        let Some(slot) = first_chooser_mut(&mut self.command) else {
            return Err(SessionError::NotSuspended);
        };
        let replacement = match (&*slot, selection) {
            (Command::ChooseOne { options, .. }, Selection::One(index)) => {
                let option = options
                    .get(index)
                    .ok_or(SessionError::OptionOutOfRange(index))?;
                option.command.clone()
            }
            (Command::ChooseMultiple { candidates, resolve, .. }, Selection::Many(indices)) => {
                if let Some(&bad) = indices.iter().find(|&&i| i >= candidates.len()) {
                    return Err(SessionError::OptionOutOfRange(bad));
                }
                resolve(&indices)
            }
            _ => return Err(SessionError::SelectionMismatch),
        };
        *slot = replacement.normalize();
        Ok(())
    }

    /// Give up at a suspension point. The document is untouched.
    pub fn cancel(&mut self) -> Outcome {
        if let Some(outcome) = &self.finished {
            return outcome.clone();
        }
        tracing::debug!("apply session cancelled");
        self.finished = Some(Outcome::Cancelled);
        Outcome::Cancelled
    }

    /// Run the fully resolved command as one transaction.
    #[tracing::instrument(level = "debug", skip_all)]
    fn commit(&mut self) -> Outcome {
        let mut doc = self.doc.write();
        let before = doc.snapshot();
        if let Err(error) = apply_resolved(&mut doc, &self.command) {
            tracing::debug!(%error, "transaction failed; document restored");
            *doc = before;
            return Outcome::Aborted;
        }
        let template = match &self.placeholders {
            Some(set) => match set.activate(&doc, self.mode) {
                Ok(template) => template,
                Err(error) => {
                    tracing::debug!(%error, "placeholder activation failed; document restored");
                    *doc = before;
                    return Outcome::Aborted;
                }
            },
            None => None,
        };
        doc.bump_version();
        tracing::debug!(version = doc.version(), "transaction committed");
        Outcome::Applied(AppliedResult {
            new_version: doc.version(),
            template,
        })
    }
}

/// Find the leftmost pending chooser. Recursion stays within sequences;
/// a chooser's own sub-commands only become pending once it is resolved.
fn first_prompt(command: &Command) -> Option<ChoicePrompt> {
    match command {
        Command::Nop | Command::Edit { .. } => None,
        Command::ChooseOne { prompt, options } => Some(ChoicePrompt {
            prompt: prompt.clone(),
            kind: PromptKind::One(
                options
                    .iter()
                    .map(|option| option.presentation.clone())
                    .collect(),
            ),
        }),
        Command::ChooseMultiple {
            prompt, candidates, ..
        } => Some(ChoicePrompt {
            prompt: prompt.clone(),
            kind: PromptKind::Many(candidates.clone()),
        }),
        Command::Sequence(commands) => commands.iter().find_map(first_prompt),
    }
}

fn first_chooser_mut(command: &mut Command) -> Option<&mut Command> {
    if matches!(
        command,
        Command::ChooseOne { .. } | Command::ChooseMultiple { .. }
    ) {
        return Some(command);
    }
    if let Command::Sequence(commands) = command {
        return commands.iter_mut().find_map(first_chooser_mut);
    }
    None
}

/// Run a resolved command against the document. Any error leaves the
/// caller responsible for rollback; panics in mutation closures are
/// contained and surfaced as errors.
pub(crate) fn apply_resolved(doc: &mut TreeDocument, command: &Command) -> Result<(), EditError> {
    match command {
        Command::Nop => Ok(()),
        Command::Edit { target, mutate } => {
            let id = doc.resolve(target).ok_or(EditError::StaleTarget)?;
            match catch_unwind(AssertUnwindSafe(|| mutate(doc, id))) {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(?target, "mutation closure panicked");
                    Err(EditError::MutatorPanicked)
                }
            }
        }
        Command::Sequence(commands) => {
            for command in commands {
                apply_resolved(doc, command)?;
            }
            Ok(())
        }
        Command::ChooseOne { .. } | Command::ChooseMultiple { .. } => {
            Err(EditError::UnresolvedChoice)
        }
    }
}

/// Rendered before/after texts of a previewed command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreviewDiff {
    pub before: String,
    pub after: String,
}

/// Preview failure. The live document is untouched either way.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// A chooser has no default resolution.
    #[error("command has a chooser with no default resolution")]
    NoDefault,
    /// The resolved command failed against the scratch copy.
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Render the effect of a command without mutating the live document.
///
/// Choosers resolve headlessly to their defaults; the resolved command
/// runs against a snapshot. Previewing is repeatable: the same command
/// against the same document always yields the same diff.
pub fn preview_diff(doc: &SharedDocument, command: &Command) -> Result<PreviewDiff, PreviewError> {
    let mut scratch = doc.read().snapshot();
    let before = scratch.render();
    let resolved = command
        .clone()
        .normalize()
        .resolve_defaults()
        .ok_or(PreviewError::NoDefault)?;
    apply_resolved(&mut scratch, &resolved)?;
    let after = scratch.render();
    Ok(PreviewDiff { before, after })
}
