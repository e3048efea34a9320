use crate::api::RelatedInfo;
use crate::parser::Span;

/// Secondary information attached to an error.
///
/// Each entry points at a location that explains the primary error, such as
/// the earlier declaration of a name that is being rebound.
#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    /// Inside a call to a builtin or user function.
    InFunctionCall { name: String, span: Span },
    /// Where a name was first bound.
    DefinedHere { what: String, span: Span },
    /// Where the expected type comes from.
    ExpectedBecause { reason: String, span: Span },
    /// Inside an expression of the given kind (`match`, `FOLD`, ...).
    InExpression { kind: String, span: Span },
    /// While parsing a construct.
    WhileParsing { what: String, span: Span },
}

impl Context {
    pub fn span(&self) -> &Span {
        match self {
            Context::InFunctionCall { span, .. }
            | Context::DefinedHere { span, .. }
            | Context::ExpectedBecause { span, .. }
            | Context::InExpression { span, .. }
            | Context::WhileParsing { span, .. } => span,
        }
    }

    pub fn to_related_info(&self) -> RelatedInfo {
        let message = match self {
            Context::InFunctionCall { name, .. } => format!("in call to '{}'", name),
            Context::DefinedHere { what, .. } => format!("{} defined here", what),
            Context::ExpectedBecause { reason, .. } => format!("expected because {}", reason),
            Context::InExpression { kind, .. } => format!("in {}", kind),
            Context::WhileParsing { what, .. } => format!("while parsing {}", what),
        };
        RelatedInfo {
            span: self.span().clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_info_messages() {
        let ctx = Context::DefinedHere {
            what: "'a'".to_string(),
            span: Span::new(4, 5),
        };
        let info = ctx.to_related_info();
        assert_eq!(info.message, "'a' defined here");
        assert_eq!(info.span, Span::new(4, 5));

        let ctx = Context::InFunctionCall {
            name: "size".to_string(),
            span: Span::new(0, 8),
        };
        assert_eq!(ctx.to_related_info().message, "in call to 'size'");
    }
}
