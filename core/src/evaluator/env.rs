//! Runtime environments.
//!
//! An environment is a chain of single-binding frames allocated in the value
//! arena. Closures and thunks keep the chain they were created in, so a
//! function body sees exactly the names that were visible where it was
//! declared.

use core::cell::Cell;

use bumpalo::Bump;

use crate::analyzer::{Expr, FunctionDef};
use crate::values::Value;

pub(super) type Env<'a, 'v> = Option<&'v Frame<'a, 'v>>;

pub(super) struct Frame<'a, 'v> {
    name: &'a str,
    slot: Slot<'a, 'v>,
    parent: Env<'a, 'v>,
}

#[derive(Clone, Copy)]
pub(super) enum Slot<'a, 'v> {
    Value(Value<'v>),
    /// A `let` initializer, forced at first reference.
    Lazy(&'v Thunk<'a, 'v>),
    Function(Closure<'a, 'v>),
    /// A global the execution context does not provide.
    Missing,
}

pub(super) struct Thunk<'a, 'v> {
    pub expr: &'a Expr<'a>,
    pub env: Env<'a, 'v>,
    memo: Cell<Option<Value<'v>>>,
}

impl<'a, 'v> Thunk<'a, 'v> {
    pub fn new(expr: &'a Expr<'a>, env: Env<'a, 'v>) -> Self {
        Self {
            expr,
            env,
            memo: Cell::new(None),
        }
    }

    pub fn memo(&self) -> Option<Value<'v>> {
        self.memo.get()
    }

    pub fn set_memo(&self, value: Value<'v>) {
        self.memo.set(Some(value));
    }
}

#[derive(Clone, Copy)]
pub(super) struct Closure<'a, 'v> {
    pub def: &'a FunctionDef<'a>,
    pub env: Env<'a, 'v>,
}

/// Extend `parent` with one binding.
pub(super) fn bind<'a, 'v>(
    arena: &'v Bump,
    parent: Env<'a, 'v>,
    name: &'a str,
    slot: Slot<'a, 'v>,
) -> Env<'a, 'v> {
    Some(arena.alloc(Frame { name, slot, parent }))
}

/// The innermost binding of `name`.
pub(super) fn lookup<'a, 'v>(env: Env<'a, 'v>, name: &str) -> Option<Slot<'a, 'v>> {
    let mut current = env;
    while let Some(frame) = current {
        if frame.name == name {
            return Some(frame.slot);
        }
        current = frame.parent;
    }
    None
}
