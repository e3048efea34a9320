// These are common syntax structures used in the parsed and typed trees.

use core::{cell::RefCell, ops::Range};

use hashbrown::HashMap;

/// Source text plus a side table from tree nodes to their spans.
///
/// Nodes are keyed by address, so the same table can annotate parsed and typed
/// nodes without the trees carrying spans themselves.
#[derive(Debug)]
pub struct AnnotatedSource<'a> {
    pub source: &'a str,
    spans: RefCell<HashMap<*const (), Span>>,
}

impl<'a> AnnotatedSource<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            spans: RefCell::new(HashMap::new()),
        }
    }
    pub fn add_span<T>(&self, node: &T, span: Span) {
        let p = node as *const T as *const ();
        self.spans.borrow_mut().insert(p, span);
    }
    pub fn span_of<T>(&self, node: &T) -> Option<Span> {
        let p = node as *const T as *const ();
        self.spans.borrow().get(&p).cloned()
    }
    pub fn snippet(&self, span: Span) -> &str {
        &self.source[span.0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

/// Arithmetic and concatenation operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `++`
    Concat,
    /// `:+`
    Append,
}

/// Short-circuiting boolean operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl core::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Concat => "++",
            BinaryOp::Append => ":+",
        })
    }
}

impl core::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        })
    }
}
