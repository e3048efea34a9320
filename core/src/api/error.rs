//! Public error types for the Ridge API.
//!
//! Every phase has its own error struct (`ParseError`, `DirectiveError`,
//! `TypeError`, `CostError`, `ExecutionError`). They are wrapped here so that
//! library users deal with a single [`Error`] type, and each can be turned
//! into a [`Diagnostic`] for rendering.

use core::fmt;

use crate::analyzer::TypeError;
use crate::cost::CostError;
use crate::directives::DirectiveError;
use crate::evaluator::ExecutionError;
use crate::parser::{ParseError, Span};

/// Public error type for all Ridge operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid API usage (unknown callable, wrong script kind, bad arguments).
    #[error("API error: {0}")]
    Api(String),

    /// The script was rejected before running.
    #[error(transparent)]
    Compilation(#[from] CompileError),

    /// The script terminated abnormally. Nothing it produced is kept.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl Error {
    /// The diagnostic for compilation and execution errors.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Error::Api(_) => None,
            Error::Compilation(e) => Some(e.diagnostic()),
            Error::Execution(e) => Some(e.to_diagnostic()),
        }
    }

    /// Source text the diagnostic spans refer to.
    pub fn source_text(&self) -> Option<&str> {
        match self {
            Error::Api(_) => None,
            Error::Compilation(e) => Some(e.source_text()),
            Error::Execution(e) => Some(&e.source),
        }
    }
}

/// A static rejection. No part of the script has run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Cost(#[from] CostError),
}

impl CompileError {
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Parse(e) => e.to_diagnostic(),
            CompileError::Directive(e) => e.to_diagnostic(),
            CompileError::Type(e) => e.to_diagnostic(),
            CompileError::Cost(e) => e.to_diagnostic(),
        }
    }

    pub fn source_text(&self) -> &str {
        match self {
            CompileError::Parse(e) => &e.source,
            CompileError::Directive(e) => &e.source,
            CompileError::Type(e) => &e.source,
            CompileError::Cost(e) => &e.source,
        }
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "E001") for documentation lookup.
    pub code: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        if let Some(help) = &self.help {
            write!(f, "\nhelp: {}", help)?;
        }
        Ok(())
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Compilation or execution cannot succeed.
    Error,
    /// Suspicious code that might be wrong.
    Warning,
    /// Informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "defined here").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            message: "Type mismatch".to_string(),
            span: Span::new(0, 1),
            related: Vec::new(),
            help: Some("Use an Int".to_string()),
            code: Some("E001".to_string()),
        };
        assert_eq!(diagnostic.to_string(), "error[E001]: Type mismatch\nhelp: Use an Int");

        let plain = Diagnostic {
            help: None,
            code: None,
            ..diagnostic
        };
        assert_eq!(plain.to_string(), "error: Type mismatch");
    }
}
