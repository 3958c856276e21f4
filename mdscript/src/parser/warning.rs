use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Document content that was recognised but not added to the command tree.
#[derive(Debug, Clone)]
pub struct ParseWarning {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseWarning {
    pub fn warning(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseWarning {
            message: message.into(),
            span,
            file_id,
            severity: Severity::Warning,
            notes: Vec::new(),
        }
    }

    /// Content left out on purpose, e.g. a block in a language without an
    /// interpreter.
    pub fn note(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseWarning {
            message: message.into(),
            span,
            file_id,
            severity: Severity::Note,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_keeps_severity_and_notes() {
        let diagnostic = ParseWarning::note("skipped", 3..9, 0)
            .with_note("try again")
            .to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Note);
        assert_eq!(diagnostic.message, "skipped");
        assert_eq!(diagnostic.notes, vec!["try again"]);
        assert_eq!(diagnostic.labels[0].range, 3..9);

        let diagnostic = ParseWarning::warning("ignored", 0..1, 0).to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Warning);
    }
}
