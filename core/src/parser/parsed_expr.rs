use crate::parser::{AnnotatedSource, BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};

/// A parsed script: directives, top-level declarations and the optional
/// trailing expression.
#[derive(Debug)]
pub struct ParsedScript<'a> {
    pub source: &'a str,
    pub directives: Vec<RawDirective<'a>>,
    pub decls: &'a [Decl<'a>],
    pub body: Option<&'a Expr<'a>>,
    pub ann: AnnotatedSource<'a>,
}

/// A bare expression parsed without directives or declarations.
#[derive(Debug)]
pub struct ParsedExpr<'a> {
    pub expr: &'a Expr<'a>,
    pub ann: AnnotatedSource<'a>,
}

/// `{-# NAME VALUE #-}` before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirective<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl<'a> {
    Let {
        name: &'a str,
        value: &'a Expr<'a>,
        span: Span,
    },
    Func(&'a FuncDef<'a>),
    Annotated {
        annotation: Annotation<'a>,
        func: &'a FuncDef<'a>,
    },
}

impl Decl<'_> {
    pub fn span(&self) -> Span {
        match self {
            Decl::Let { span, .. } => span.clone(),
            Decl::Func(func) => func.span.clone(),
            Decl::Annotated { annotation, func } => Span::combine(&annotation.span, &func.span),
        }
    }
}

/// `@Callable(i)` or `@Verifier(tx)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<'a> {
    pub name: &'a str,
    pub binding: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef<'a> {
    pub name: &'a str,
    pub params: &'a [Param<'a>],
    pub body: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param<'a> {
    pub name: &'a str,
    pub ty: TypeExpr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Boolean {
        op: BoolOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Comparison {
        op: ComparisonOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Unary {
        op: UnaryOp,
        expr: &'a Expr<'a>,
    },
    Call {
        name: &'a str,
        args: &'a [&'a Expr<'a>],
    },
    Index {
        value: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    Field {
        value: &'a Expr<'a>,
        field: &'a str,
    },
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: &'a Expr<'a>,
    },
    Match {
        scrutinee: &'a Expr<'a>,
        cases: &'a [MatchCase<'a>],
    },
    /// `let name = value` scoped over `body` (from a block).
    Let {
        name: &'a str,
        value: &'a Expr<'a>,
        body: &'a Expr<'a>,
    },
    /// `func ...` scoped over `body` (from a block).
    Function {
        def: &'a FuncDef<'a>,
        body: &'a Expr<'a>,
    },
    Fold {
        bound: FoldBound<'a>,
        collection: &'a Expr<'a>,
        init: &'a Expr<'a>,
        combiner: Combiner<'a>,
    },
    List(&'a [&'a Expr<'a>]),
    Literal(Literal<'a>),
    Ident(&'a str),
}

impl<'a> Expr<'a> {
    pub fn as_ptr(&self) -> *const Self {
        self as *const _
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase<'a> {
    /// `None` for `_`.
    pub binding: Option<&'a str>,
    /// Empty for a catch-all case.
    pub types: &'a [TypeExpr<'a>],
    pub body: &'a Expr<'a>,
    pub span: Span,
}

impl MatchCase<'_> {
    pub fn is_catch_all(&self) -> bool {
        self.types.is_empty()
    }
}

/// The `<N>` of `FOLD<N>`, kept as written so that the cost estimator can
/// reject anything that is not a literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FoldBound<'a> {
    Literal(i64),
    Named(&'a str),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Combiner<'a> {
    Named(&'a str),
    Lambda {
        acc: &'a str,
        elem: &'a str,
        body: &'a Expr<'a>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Int(i64),
    Bool(bool),
    Str(&'a str),
    Bytes(&'a [u8]),
    Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr<'a> {
    Named(&'a str),
    List(&'a TypeExpr<'a>),
    Union(&'a [TypeExpr<'a>]),
}
