//! How a pending fix or choice is shown to the user.

use mend_ir::Span;

/// Ranking hint for presenting multiple applicable fixes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum FixPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// User-visible description of a pending fix or chooser option.
///
/// Derived from the current (possibly stale) target resolution; absence
/// of a presentation means "not applicable here" and is never an error.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Presentation {
    pub label: String,
    pub priority: FixPriority,
    pub highlight_ranges: Vec<Span>,
}

impl Presentation {
    /// Create a presentation with normal priority and no highlights.
    pub fn new(label: impl Into<String>) -> Self {
        Presentation {
            label: label.into(),
            priority: FixPriority::Normal,
            highlight_ranges: Vec::new(),
        }
    }

    /// Set the ranking priority.
    pub fn with_priority(mut self, priority: FixPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Add a highlight range in the current rendering.
    pub fn with_highlight(mut self, range: Span) -> Self {
        self.highlight_ranges.push(range);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(FixPriority::High > FixPriority::Normal);
        assert!(FixPriority::Normal > FixPriority::Low);
    }

    #[test]
    fn test_builder() {
        let p = Presentation::new("Remove statement")
            .with_priority(FixPriority::High)
            .with_highlight(Span::new(0, 4));
        assert_eq!(p.label, "Remove statement");
        assert_eq!(p.priority, FixPriority::High);
        assert_eq!(p.highlight_ranges, vec![Span::new(0, 4)]);
    }
}
