use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Something could not be loaded at all.
    Error,
    /// Loaded, but with a problem the author should look at.
    Warning,
}

/// A problem found while loading or resolving declarations.
///
/// None of these abort a load; they are collected so that callers (the CLI,
/// tests, an editor's console) can show them after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Declaration file the problem was found in, when known.
    pub file: Option<String>,
    /// Byte range within `file`, when known.
    pub span: Option<Range<usize>>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            span: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
            span: None,
        }
    }

    /// Attach the file the problem was found in.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach a byte range within the file.
    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    /// Returns `true` for error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.file {
            Some(file) => write!(f, "{prefix}: {file}: {}", self.message),
            None => write!(f, "{prefix}: {}", self.message),
        }
    }
}
