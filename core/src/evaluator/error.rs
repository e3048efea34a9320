//! Runtime termination errors.
//!
//! Type mismatches, unbound names and arity errors are ruled out by the
//! analyzer and never reach the evaluator. What remains are terminations the
//! script itself asks for (`throw`), arithmetic and bounds failures, action
//! limits and resource limits.
//!
//! # Error Categories
//!
//! - **Runtime errors**: raised by the script or the data it works on. Nothing
//!   can catch them; the whole execution is discarded.
//!
//! - **Resource exceeded errors**: the evaluator refused to go deeper. These
//!   protect the host and say nothing about the script's logic.

use core::fmt;

use crate::api::{Diagnostic, Severity};
use crate::parser::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub source: String,
    /// Location of the failing expression, when known.
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    Runtime(RuntimeError),
    ResourceExceeded(ResourceExceededError),
}

/// Errors raised by the running script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// `throw(message)`, or a failed `extract`/`value`.
    #[error("Thrown: {message}")]
    Thrown { message: String },

    /// `FOLD<N>` over a list with fewer than `N` elements.
    #[error("FOLD<{bound}> applied to a list of {len} element(s)")]
    FoldBoundsViolation { bound: i64, len: usize },

    /// A callable produced more actions than allowed.
    #[error("Too many {what}: {count} exceeds the limit of {limit}")]
    ActionLimitExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow in '{op}'")]
    ArithmeticOverflow { op: String },

    #[error("Index {index} out of bounds (length: {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    /// The context lacks something the script reads (`tx` in a callable
    /// context, an invocation for a callable, ...).
    #[error("'{name}' is not available in this execution context")]
    MissingContext { name: String },

    /// A builtin received a value it cannot handle (e.g. bad base58 text).
    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },
}

/// Resource limits that stop evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceExceededError {
    /// Evaluation depth exceeded.
    #[error("Evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },
}

impl ExecutionError {
    pub fn runtime(&self) -> Option<&RuntimeError> {
        match &self.kind {
            ExecutionErrorKind::Runtime(e) => Some(e),
            ExecutionErrorKind::ResourceExceeded(_) => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code) = match &self.kind {
            ExecutionErrorKind::Runtime(e) => (e.to_string(), runtime_code(e)),
            ExecutionErrorKind::ResourceExceeded(e) => (e.to_string(), "R100"),
        };
        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone().unwrap_or_default(),
            related: Vec::new(),
            help: None,
            code: Some(code.to_string()),
        }
    }
}

fn runtime_code(e: &RuntimeError) -> &'static str {
    match e {
        RuntimeError::Thrown { .. } => "R001",
        RuntimeError::FoldBoundsViolation { .. } => "R002",
        RuntimeError::ActionLimitExceeded { .. } => "R003",
        RuntimeError::DivisionByZero => "R004",
        RuntimeError::ArithmeticOverflow { .. } => "R005",
        RuntimeError::IndexOutOfBounds { .. } => "R006",
        RuntimeError::MissingContext { .. } => "R007",
        RuntimeError::InvalidArgument { .. } => "R008",
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExecutionErrorKind::Runtime(e) => write!(f, "{}", e),
            ExecutionErrorKind::ResourceExceeded(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExecutionError {}

impl From<RuntimeError> for ExecutionErrorKind {
    fn from(e: RuntimeError) -> Self {
        ExecutionErrorKind::Runtime(e)
    }
}

impl From<ResourceExceededError> for ExecutionErrorKind {
    fn from(e: ResourceExceededError) -> Self {
        ExecutionErrorKind::ResourceExceeded(e)
    }
}
