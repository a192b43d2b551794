//! Core diagnostic types.
//!
//! The code generator works on a resolved program graph, so there are no
//! source spans to point at. Labels instead name the program entity (class,
//! method, generated file) a message is about.

use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A message attached to a named program entity.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    /// Human-readable entity name, e.g. `Dog::speak` or `o_42/Dog@@speak.h`.
    pub subject: String,
    /// The label text explaining this entity's role.
    pub message: String,
    /// Whether this is the entity the diagnostic is primarily about.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label.
    pub fn primary(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Label {
            subject: subject.into(),
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Label {
            subject: subject.into(),
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic with everything needed to render it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be emitted into a sink, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Entities involved.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Text suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, subject: impl Into<String>, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(subject, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(
        mut self,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(subject, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The subject of the first primary label, if any.
    pub fn primary_subject(&self) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.is_primary)
            .map(|l| l.subject.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}
