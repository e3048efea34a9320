use crate::api::{Diagnostic, Severity};
use crate::diagnostics::Context;
use crate::parser::Span;

/// Type error with context
#[derive(Debug, Clone)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub source: String,
    pub span: Span,
    pub context: Vec<Context>,
}

impl core::fmt::Display for TypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for TypeError {}

/// Specific kinds of type errors
#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorKind {
    /// Type mismatch between expected and found types
    TypeMismatch { expected: String, found: String },
    /// Reference to a name that is not in scope (or not yet declared)
    UnboundVariable { name: String },
    /// A name bound again while an outer binding is visible
    DuplicateBinding { name: String },
    /// Wrong number of arguments in a call
    ArgumentCountMismatch {
        name: String,
        expected: String,
        found: usize,
    },
    /// Match cases leave some members of the scrutinee type uncovered
    NonExhaustiveMatch { missing: Vec<String> },
    /// Annotation not allowed here or malformed annotated function
    InvalidAnnotation { message: String },
    /// More than one `@Verifier`
    DuplicateVerifier,
    /// A plain declaration after an annotated function
    AnnotationOrderViolation,
    /// Result type not allowed for this kind of script or entry point
    ResultTypeViolation { expected: String, found: String },
    /// Type name that does not exist
    UnknownType { name: String },
    /// Expression script without a result expression
    MissingResultExpression,
    /// Result expression in a script that cannot have one
    UnexpectedExpression,
}

impl TypeError {
    /// Create a new TypeError with no context
    pub fn new(kind: TypeErrorKind, source: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source: source.into(),
            span,
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context.push(context);
        self
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            TypeErrorKind::TypeMismatch { expected, found } => (
                format!("Type mismatch: expected {}, found {}", expected, found),
                "E001",
                None,
            ),
            TypeErrorKind::UnboundVariable { name } => (
                format!("Undefined variable '{}'", name),
                "E002",
                Some("Names must be declared before they are used".to_string()),
            ),
            TypeErrorKind::DuplicateBinding { name } => (
                format!("'{}' is already defined", name),
                "E003",
                Some("Shadowing is not allowed; pick a different name".to_string()),
            ),
            TypeErrorKind::ArgumentCountMismatch {
                name,
                expected,
                found,
            } => (
                format!(
                    "'{}' takes {} argument(s) but {} were supplied",
                    name, expected, found
                ),
                "E004",
                None,
            ),
            TypeErrorKind::NonExhaustiveMatch { missing } => (
                format!("Non-exhaustive match: {} not covered", missing.join("|")),
                "E005",
                Some("Add the missing cases or a `case _ =>` catch-all".to_string()),
            ),
            TypeErrorKind::InvalidAnnotation { message } => (message.clone(), "E006", None),
            TypeErrorKind::DuplicateVerifier => (
                "A script can have at most one @Verifier".to_string(),
                "E007",
                None,
            ),
            TypeErrorKind::AnnotationOrderViolation => (
                "Declarations must come before annotated functions".to_string(),
                "E008",
                Some("Move this declaration above the first @Callable or @Verifier".to_string()),
            ),
            TypeErrorKind::ResultTypeViolation { expected, found } => (
                format!("Result must be {}, found {}", expected, found),
                "E009",
                None,
            ),
            TypeErrorKind::UnknownType { name } => {
                (format!("Unknown type '{}'", name), "E010", None)
            }
            TypeErrorKind::MissingResultExpression => (
                "Expression script has no result expression".to_string(),
                "E011",
                None,
            ),
            TypeErrorKind::UnexpectedExpression => (
                "A DApp script cannot end with an expression".to_string(),
                "E012",
                Some("Wrap the logic in a @Callable or @Verifier function".to_string()),
            ),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            related: self
                .context
                .iter()
                .map(|ctx| ctx.to_related_info())
                .collect(),
            help,
            code: Some(code.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_to_diagnostic() {
        let error = TypeError::new(
            TypeErrorKind::UnboundVariable {
                name: "x".to_string(),
            },
            "test source",
            Span(10..20),
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.message.contains("Undefined variable 'x'"));
        assert_eq!(diagnostic.code, Some("E002".to_string()));
        assert_eq!(diagnostic.span, Span(10..20));
    }

    #[test]
    fn test_type_mismatch_diagnostic() {
        let error = TypeError::new(
            TypeErrorKind::TypeMismatch {
                expected: "Int".to_string(),
                found: "String".to_string(),
            },
            "test source",
            Span(5..10),
        )
        .with_context(Context::InFunctionCall {
            name: "f".to_string(),
            span: Span(0..12),
        });

        let diagnostic = error.to_diagnostic();
        assert_eq!(
            diagnostic.message,
            "Type mismatch: expected Int, found String"
        );
        assert_eq!(diagnostic.related.len(), 1);
        assert_eq!(diagnostic.related[0].message, "in call to 'f'");
    }
}
