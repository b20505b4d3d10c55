use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

/// A lint finding with source location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub message: String,
    pub span: Range<usize>,
    pub notes: Vec<String>,
}

impl LintWarning {
    pub fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        LintWarning {
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// 1-based line of the start of the span.
    pub fn line(&self, source: &str) -> usize {
        source[..self.span.start.min(source.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
            + 1
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::warning()
            .with_message(&self.message)
            .with_labels(vec![Label::primary(file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
