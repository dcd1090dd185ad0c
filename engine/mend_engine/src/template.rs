//! Post-apply placeholder templates.
//!
//! A fix that introduces new syntax (a binding name, an inserted
//! argument) can register placeholders over the nodes it created. After
//! a successful commit the session activates them: in interactive mode
//! the host gets a list of editable stops with rendered ranges, in
//! headless mode the defaults simply stand.

use mend_ir::{NodePath, Span, TreeDocument};
use thiserror::Error;

/// How placeholder activation behaves after a commit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum TemplateMode {
    /// Produce editable stops for the host to drive.
    #[default]
    Interactive,
    /// Defaults stand as-is; no stops are produced.
    Headless,
}

/// One placeholder: a target range plus the text alternatives offered
/// for it. The default value is already present in the document when
/// the placeholder activates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Placeholder {
    pub range: NodePath,
    pub default_value: String,
    pub alternatives: Vec<String>,
}

impl Placeholder {
    pub fn new(range: NodePath, default_value: impl Into<String>) -> Self {
        Placeholder {
            range,
            default_value: default_value.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }
}

/// Placeholder activation failure. The session treats this as a
/// transaction failure and rolls back.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    /// A placeholder range no longer resolves after the edit ran.
    #[error("placeholder range no longer resolves: {0:?}")]
    StaleRange(NodePath),
    /// Two placeholder ranges overlap structurally.
    #[error("placeholder ranges overlap")]
    Overlap,
}

/// The placeholders a command registers for activation after commit.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PlaceholderSet {
    entries: Vec<Placeholder>,
}

impl PlaceholderSet {
    pub fn new() -> Self {
        PlaceholderSet::default()
    }

    pub fn push(&mut self, placeholder: Placeholder) {
        self.entries.push(placeholder);
    }

    #[must_use]
    pub fn with(mut self, placeholder: Placeholder) -> Self {
        self.push(placeholder);
        self
    }

    pub fn entries(&self) -> &[Placeholder] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate and activate against the post-edit document.
    ///
    /// Every range must resolve and no two ranges may overlap (equal or
    /// ancestor/descendant paths). Headless mode still validates but
    /// produces no stops.
    pub fn activate(
        &self,
        doc: &TreeDocument,
        mode: TemplateMode,
    ) -> Result<Option<ActiveTemplate>, TemplateError> {
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                let overlapping = a.range == b.range
                    || a.range.is_ancestor_of(&b.range)
                    || b.range.is_ancestor_of(&a.range);
                if overlapping {
                    return Err(TemplateError::Overlap);
                }
            }
        }

        let mut stops = Vec::with_capacity(self.entries.len());
        for placeholder in &self.entries {
            let id = doc
                .resolve(&placeholder.range)
                .ok_or_else(|| TemplateError::StaleRange(placeholder.range.clone()))?;
            let range = doc
                .span_of(id)
                .ok_or_else(|| TemplateError::StaleRange(placeholder.range.clone()))?;
            stops.push(TemplateStop {
                range,
                default_value: placeholder.default_value.clone(),
                alternatives: placeholder.alternatives.clone(),
            });
        }

        match mode {
            TemplateMode::Headless => Ok(None),
            TemplateMode::Interactive => Ok(Some(ActiveTemplate { stops })),
        }
    }
}

/// One editable stop in the post-commit rendering.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateStop {
    /// Rendered range of the placeholder's node.
    pub range: Span,
    pub default_value: String,
    pub alternatives: Vec<String>,
}

/// Activated template handed to the host after a successful commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveTemplate {
    stops: Vec<TemplateStop>,
}

impl ActiveTemplate {
    pub fn stops(&self) -> &[TemplateStop] {
        &self.stops
    }
}
