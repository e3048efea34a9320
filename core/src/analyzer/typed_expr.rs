use crate::directives::DirectiveSet;
use crate::parser::{AnnotatedSource, BinaryOp, BoolOp, ComparisonOp, UnaryOp};
use crate::stdlib::Builtin;
use crate::types::Type;
use crate::values::Value;

/// A type-checked script.
///
/// Spans of typed nodes are recorded in `ann`, next to the spans of the
/// parsed nodes they came from.
#[derive(Debug)]
pub struct TypedScript<'a> {
    pub directives: DirectiveSet,
    /// Top-level declarations, in source order.
    pub decls: &'a [TypedDecl<'a>],
    /// The result expression of an expression script.
    pub body: Option<&'a Expr<'a>>,
    pub callables: &'a [EntryPoint<'a>],
    pub verifier: Option<EntryPoint<'a>>,
    pub ann: AnnotatedSource<'a>,
}

impl<'a> TypedScript<'a> {
    pub fn callable(&self, name: &str) -> Option<&EntryPoint<'a>> {
        self.callables.iter().find(|c| c.def.name == name)
    }
}

impl PartialEq for TypedScript<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.directives == other.directives
            && self.decls == other.decls
            && self.body == other.body
            && self.callables == other.callables
            && self.verifier == other.verifier
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedDecl<'a> {
    Let { name: &'a str, value: &'a Expr<'a> },
    Function(&'a FunctionDef<'a>),
}

/// An annotated function: `@Callable(binding)` or `@Verifier(binding)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPoint<'a> {
    /// Name bound to the invocation (callables) or the transaction (verifier).
    pub binding: &'a str,
    pub def: &'a FunctionDef<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef<'a> {
    pub name: &'a str,
    pub params: &'a [(&'a str, &'a Type<'a>)],
    pub body: &'a Expr<'a>,
    pub ret: &'a Type<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'a>(pub &'a Type<'a>, pub ExprInner<'a>);

impl<'a> Expr<'a> {
    pub fn as_ptr(&self) -> *const Self {
        self as *const _
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprInner<'a> {
    Constant(Value<'a>),
    Ident(&'a str),
    Let {
        name: &'a str,
        value: &'a Expr<'a>,
        body: &'a Expr<'a>,
    },
    Function {
        def: &'a FunctionDef<'a>,
        body: &'a Expr<'a>,
    },
    Call {
        callee: Callee<'a>,
        args: &'a [&'a Expr<'a>],
    },
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
    Field {
        value: &'a Expr<'a>,
        field: &'a str,
    },
    Index {
        value: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    List(&'a [&'a Expr<'a>]),
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: &'a Expr<'a>,
    },
    Match {
        scrutinee: &'a Expr<'a>,
        cases: &'a [Case<'a>],
    },
    Fold {
        bound: FoldBound,
        collection: &'a Expr<'a>,
        init: &'a Expr<'a>,
        combiner: FoldCombiner<'a>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Callee<'a> {
    Builtin(&'static Builtin),
    User(&'a FunctionDef<'a>),
}

impl Callee<'_> {
    pub fn name(&self) -> &str {
        match self {
            Callee::Builtin(b) => b.name,
            Callee::User(def) => def.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case<'a> {
    /// Empty for a catch-all case.
    pub types: &'a [&'a Type<'a>],
    pub binding: Option<&'a str>,
    pub body: &'a Expr<'a>,
}

impl Case<'_> {
    /// Whether a runtime value selects this case.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        self.types.is_empty() || self.types.iter().any(|ty| value.conforms(ty))
    }
}

/// The `N` of `FOLD<N>`. Anything but an integer literal is left for the
/// cost estimator to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldBound {
    Constant(i64),
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FoldCombiner<'a> {
    /// A function declared earlier, called through its closure.
    Named(&'a FunctionDef<'a>),
    /// `(acc, e) => body`, closing over the fold's environment.
    Lambda(&'a FunctionDef<'a>),
}

impl<'a> FoldCombiner<'a> {
    pub fn def(&self) -> &'a FunctionDef<'a> {
        match self {
            FoldCombiner::Named(def) | FoldCombiner::Lambda(def) => def,
        }
    }
}
