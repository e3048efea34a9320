//! Ridge Standard Library
//!
//! Builtin functions available to every script, grouped by concern:
//! - State: reads from account data storage
//! - Optional: helpers for `T|Unit` values and `throw`
//! - Bytes: strings, byte vectors, hashing and encodings
//! - Lists: list queries
//! - Actions: constructors for the struct types a callable returns
//!
//! Each builtin carries a typing rule used by the analyzer, a fixed cost used
//! by the estimator and a native implementation used by the evaluator. A
//! builtin is only visible from its `since` library version onward.

use core::fmt;

use bumpalo::Bump;

use crate::context::ExecutionContext;
use crate::evaluator::RuntimeError;
use crate::types::{Type, TypeManager, is_assignable};
use crate::values::Value;

mod actions;
mod bytes;
mod lists;
mod optional;
mod state;
pub mod structs;


/// Computes the result type of a call from its argument types.
pub type Typer =
    for<'a> fn(&TypeManager<'a>, &[&'a Type<'a>]) -> Result<&'a Type<'a>, SignatureError>;

/// Native implementation of a builtin. Arguments are already evaluated and
/// known to match the typing rule.
pub type NativeFn =
    for<'v, 'c> fn(&Runtime<'v, 'c>, &[Value<'v>]) -> Result<Value<'v>, RuntimeError>;

/// What a native function may touch while running.
pub struct Runtime<'v, 'c> {
    pub arena: &'v Bump,
    pub ctx: &'c ExecutionContext<'c>,
}

pub struct Builtin {
    pub name: &'static str,
    /// First `STDLIB_VERSION` that provides this builtin.
    pub since: u8,
    pub cost: u64,
    pub typer: Typer,
    pub eval: NativeFn,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

const GROUPS: &[&[Builtin]] = &[
    state::BUILTINS,
    optional::BUILTINS,
    bytes::BUILTINS,
    lists::BUILTINS,
    actions::BUILTINS,
];

/// Every builtin, whatever its version.
pub fn all() -> impl Iterator<Item = &'static Builtin> {
    GROUPS.iter().flat_map(|group| group.iter())
}

/// Builtins visible to a script of the given library version.
pub fn available(version: u8) -> impl Iterator<Item = &'static Builtin> {
    all().filter(move |b| b.since <= version)
}

/// Look up a builtin visible at `version`.
pub fn lookup(name: &str, version: u8) -> Option<&'static Builtin> {
    available(version).find(|b| b.name == name)
}

/// Why a call does not match a builtin's typing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    ArgCount { expected: String, found: usize },
    Arg {
        index: usize,
        expected: String,
        found: String,
    },
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureError::ArgCount { expected, found } => {
                write!(f, "expected {} argument(s), found {}", expected, found)
            }
            SignatureError::Arg {
                index,
                expected,
                found,
            } => write!(
                f,
                "argument {} should be {}, found {}",
                index + 1,
                expected,
                found
            ),
        }
    }
}

// ============================================================================
// Typing helpers
// ============================================================================

pub(crate) fn arity(args: &[&Type<'_>], expected: usize) -> Result<(), SignatureError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(SignatureError::ArgCount {
            expected: expected.to_string(),
            found: args.len(),
        })
    }
}

pub(crate) fn mismatch(index: usize, expected: impl fmt::Display, found: &Type<'_>) -> SignatureError {
    SignatureError::Arg {
        index,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Check that argument `index` is assignable to `expected`.
pub(crate) fn expect_arg<'a>(
    args: &[&'a Type<'a>],
    index: usize,
    expected: &Type<'a>,
) -> Result<(), SignatureError> {
    if is_assignable(args[index], expected) {
        Ok(())
    } else {
        Err(mismatch(index, expected, args[index]))
    }
}

/// Check arity and every argument against a fixed parameter list.
pub(crate) fn expect_args<'a>(
    args: &[&'a Type<'a>],
    params: &[&'a Type<'a>],
) -> Result<(), SignatureError> {
    arity(args, params.len())?;
    (0..params.len()).try_for_each(|i| expect_arg(args, i, params[i]))
}

// ============================================================================
// Value helpers
// ============================================================================
//
// Arguments reaching a native function have been type-checked, so a value of
// the wrong shape is an analyzer bug, not a script error.

pub(crate) fn int_arg(args: &[Value<'_>], index: usize) -> i64 {
    match args[index] {
        Value::Int(i) => i,
        other => unreachable!("argument {} type-checked as Int, got {}", index, other),
    }
}

pub(crate) fn str_arg<'v>(args: &[Value<'v>], index: usize) -> &'v str {
    match args[index] {
        Value::Str(s) => s,
        other => unreachable!("argument {} type-checked as String, got {}", index, other),
    }
}

pub(crate) fn bytes_arg<'v>(args: &[Value<'v>], index: usize) -> &'v [u8] {
    match args[index] {
        Value::Bytes(b) => b,
        other => unreachable!("argument {} type-checked as ByteVector, got {}", index, other),
    }
}

pub(crate) fn list_arg<'v>(args: &[Value<'v>], index: usize) -> &'v [Value<'v>] {
    match args[index] {
        Value::List(items) => items,
        other => unreachable!("argument {} type-checked as List, got {}", index, other),
    }
}

/// The `bytes` field of an `Address` argument.
pub(crate) fn address_arg<'v>(args: &[Value<'v>], index: usize) -> &'v [u8] {
    match args[index].as_struct().and_then(|s| s.field("bytes")) {
        Some(Value::Bytes(b)) => b,
        _ => unreachable!("argument {} type-checked as Address", index),
    }
}
