pub mod error;
mod parsed_expr;
#[allow(clippy::module_inception)]
pub mod parser;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::Rule;
pub use parser::ScriptParser;
pub use parser::{
    DEFAULT_MAX_DEPTH, parse, parse_expression, parse_expression_with_max_depth, parse_header,
    parse_with_max_depth,
};

pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::{
    Annotation, Combiner, Decl, Expr, FoldBound, FuncDef, Literal, MatchCase, Param, ParsedExpr,
    ParsedScript, RawDirective, TypeExpr,
};
pub use syntax::AnnotatedSource;
pub use syntax::{BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};
