//! Scope stack for name bindings.
//!
//! The analyzer keeps one entry per visible name: globals and builtins in a
//! complete scope at the bottom, then one open scope per construct being
//! checked (function parameters, block declarations, match bindings).
//!
//! Rebinding is forbidden: a name can be declared only if no scope on the
//! stack already binds it.
//! ```ridge
//! let a = 1
//! func f(a: Int) = a   # DuplicateBinding: `a` is already bound
//! ```

use bumpalo::Bump;
use core::fmt;

/// A scope that can be pushed onto the [`ScopeStack`].
pub trait Scope<'a, T> {
    /// Look up a name in this scope.
    fn lookup(&self, name: &str) -> Option<&T>;

    /// Bind a name in this scope.
    ///
    /// Complete scopes return `BindError::ScopeIsImmutable`.
    fn bind(&mut self, name: &'a str, value: T) -> Result<(), BindError>;
}

/// A complete, immutable scope.
///
/// Bindings are pre-populated and sorted for binary search.
pub struct CompleteScope<'a, T>(&'a [(&'a str, T)]);

impl<'a, T> CompleteScope<'a, T> {
    /// Create a complete scope from bindings sorted by name.
    pub fn from_sorted(bindings: &'a [(&'a str, T)]) -> CompleteScope<'a, T> {
        debug_assert!(is_sorted(bindings), "Bindings must be sorted by name");
        CompleteScope(bindings)
    }

    /// Sort `bindings` by name and allocate them in `arena`.
    ///
    /// Returns the first duplicated name if there is one.
    pub fn from_unsorted(
        arena: &'a Bump,
        mut bindings: Vec<(&'a str, T)>,
    ) -> Result<CompleteScope<'a, T>, DuplicateError> {
        bindings.sort_by_key(|(name, _)| *name);
        if let Some(window) = bindings.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(DuplicateError(window[0].0.to_string()));
        }
        Ok(Self::from_sorted(arena.alloc_slice_fill_iter(bindings)))
    }
}

impl<'a, T> Scope<'a, T> for CompleteScope<'a, T> {
    fn lookup(&self, name: &str) -> Option<&T> {
        self.0
            .binary_search_by_key(&name, |(n, _)| *n)
            .ok()
            .map(|idx| &self.0[idx].1)
    }

    fn bind(&mut self, _name: &'a str, _value: T) -> Result<(), BindError> {
        Err(BindError::ScopeIsImmutable)
    }
}

/// An append-only scope, filled in declaration order.
///
/// Lookups only see names bound so far, which is what makes forward
/// references fail.
pub struct OpenScope<'a, T>(Vec<(&'a str, T)>);

impl<'a, T> OpenScope<'a, T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }
}

impl<'a, T> Default for OpenScope<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> Scope<'a, T> for OpenScope<'a, T> {
    fn lookup(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, value)| value)
    }

    fn bind(&mut self, name: &'a str, value: T) -> Result<(), BindError> {
        if self.lookup(name).is_some() {
            return Err(BindError::AlreadyBound(name.to_string()));
        }
        self.0.push((name, value));
        Ok(())
    }
}

/// A stack of scopes, searched from innermost to outermost.
pub struct ScopeStack<'a, T> {
    scopes: Vec<Box<dyn Scope<'a, T> + 'a>>,
}

impl<'a, T: 'a> Default for ScopeStack<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: 'a> ScopeStack<'a, T> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Push a scope onto the stack.
    pub fn push<S: Scope<'a, T> + 'a>(&mut self, scope: S) {
        self.scopes.push(Box::new(scope));
    }

    /// Push an empty [`OpenScope`].
    pub fn push_open(&mut self) {
        self.push(OpenScope::new());
    }

    /// Pop the topmost scope from the stack.
    pub fn pop(&mut self) -> Result<(), PopError> {
        self.scopes.pop().ok_or(PopError::EmptyStack)?;
        Ok(())
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look up a name, searching scopes from innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Bind a value in the topmost scope without checking outer scopes.
    pub fn bind_in_current(&mut self, name: &'a str, value: T) -> Result<(), BindError> {
        self.scopes
            .last_mut()
            .ok_or(BindError::NoScope)?
            .bind(name, value)
    }

    /// Bind a value in the topmost scope.
    ///
    /// Fails with `BindError::AlreadyBound` if any scope on the stack already
    /// binds `name`.
    pub fn declare(&mut self, name: &'a str, value: T) -> Result<(), BindError> {
        if self.lookup(name).is_some() {
            return Err(BindError::AlreadyBound(name.to_string()));
        }
        self.bind_in_current(name, value)
    }
}

/// Check if a slice is sorted by name (for debug assertions).
fn is_sorted<T>(slice: &[(&str, T)]) -> bool {
    slice.windows(2).all(|w| w[0].0 <= w[1].0)
}

/// Error when trying to bind a value in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No scope exists to bind in.
    NoScope,
    /// The scope is immutable (complete scope).
    ScopeIsImmutable,
    /// The name is already bound in a visible scope.
    AlreadyBound(String),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::NoScope => write!(f, "No scope to bind in"),
            BindError::ScopeIsImmutable => write!(f, "Cannot bind in immutable scope"),
            BindError::AlreadyBound(name) => write!(f, "Name '{}' is already bound", name),
        }
    }
}

/// Error when trying to pop a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopError {
    /// The stack is empty.
    EmptyStack,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::EmptyStack => write!(f, "Cannot pop from empty scope stack"),
        }
    }
}

/// Error when duplicate names are found in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateError(pub String);

impl fmt::Display for DuplicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate name '{}' in scope", self.0)
    }
}
