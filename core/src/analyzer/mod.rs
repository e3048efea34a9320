pub mod analyzer;
pub mod error;
pub mod typed_expr;


pub use analyzer::{analyze, analyze_expression};
pub use error::{TypeError, TypeErrorKind};
pub use typed_expr::{
    Callee, Case, EntryPoint, Expr, ExprInner, FoldBound, FoldCombiner, FunctionDef, TypedDecl,
    TypedScript,
};
