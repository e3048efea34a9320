use crate::api::{Diagnostic, Severity};
use crate::parser::Span;

/// Rejection by the cost estimator.
#[derive(Debug, Clone)]
pub struct CostError {
    pub kind: CostErrorKind,
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostErrorKind {
    /// `FOLD` without a usable constant bound.
    UnboundedIteration { reason: String },
    /// A list literal shorter than the `FOLD` bound.
    FoldBoundsViolation { bound: i64, len: usize },
    /// An entry point costs more than its limit allows.
    ComplexityLimitExceeded {
        what: String,
        cost: u64,
        limit: u64,
    },
}

impl CostError {
    pub fn new(kind: CostErrorKind, source: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source: source.into(),
            span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            CostErrorKind::UnboundedIteration { reason } => (
                format!("Unbounded iteration: {}", reason),
                "C001",
                Some("Write the bound as a literal, e.g. FOLD<10>(list, init, f)".to_string()),
            ),
            CostErrorKind::FoldBoundsViolation { bound, len } => (
                format!(
                    "FOLD<{}> over a list of {} element(s) can never succeed",
                    bound, len
                ),
                "C002",
                None,
            ),
            CostErrorKind::ComplexityLimitExceeded { what, cost, limit } => (
                format!(
                    "Complexity of {} is {}, above the limit of {}",
                    what, cost, limit
                ),
                "C003",
                None,
            ),
        };
        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            related: Vec::new(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for CostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for CostError {}
