use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Which fatal failure family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line began a grammar clause it could not finish.
    Grammar,
    /// The classified lines cannot form a valid section tree.
    Structure,
}

/// Compile errors with source location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn grammar(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind: ErrorKind::Grammar,
            message: message.into(),
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn structure(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind: ErrorKind::Structure,
            message: message.into(),
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Grammar => write!(f, "grammar error: {}", self.message),
            ErrorKind::Structure => write!(f, "structural error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
