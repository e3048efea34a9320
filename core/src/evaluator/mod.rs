//! Tree-walking evaluator for type-checked Ridge scripts.
//!
//! The evaluator runs a [`TypedScript`] against an [`ExecutionContext`] and
//! produces runtime values.
//!
//! ## Design Principles
//!
//! - **Lazy bindings**: a `let` initializer runs at its first reference, at
//!   most once; unreferenced initializers never run.
//! - **All or nothing**: any runtime error discards the whole execution.
//! - **Stack-safe**: depth tracking stops deeply nested evaluation with a
//!   `StackOverflow` instead of exhausting the host stack.
//! - **Type-safe**: only accepted scripts reach the evaluator, so shape errors
//!   are invariant violations, not script errors.
//!
//! ## Example
//!
//! ```ignore
//! let arena = Bump::new();
//! let ctx = ExecutionContext::new(&state, This::Account(address)).with_height(10);
//! let result = evaluator::eval_expression(&arena, &typed, &ctx, &ExecutionOptions::default())?;
//! assert_eq!(result, Value::Bool(true));
//! ```

mod env;
mod error;
mod eval;
mod operators;

#[cfg(test)]
mod eval_test;

pub use error::{ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError};

use bumpalo::Bump;
use tracing::debug;

use crate::analyzer::{EntryPoint, TypedScript};
use crate::api::ExecutionOptions;
use crate::context::{ExecutionContext, convert};
use crate::values::Value;

/// Evaluate the result expression of an expression script.
///
/// Panics if `script` has no result expression; the analyzer only accepts
/// expression scripts with one.
pub fn eval_expression<'a: 'v, 'v>(
    arena: &'v Bump,
    script: &TypedScript<'a>,
    ctx: &ExecutionContext<'_>,
    options: &ExecutionOptions,
) -> Result<Value<'v>, ExecutionError> {
    let Some(body) = script.body else {
        unreachable!("expression script without a result expression")
    };
    debug!(height = ctx.height, "Evaluating expression");
    let mut evaluator = eval::Evaluator::new(arena, script, ctx, options.max_depth);
    let env = evaluator.globals();
    evaluator.eval_expr(env, body)
}

/// Run the verifier of a DApp. The annotation binding is bound to the
/// context transaction.
pub fn eval_verifier<'a: 'v, 'v>(
    arena: &'v Bump,
    script: &TypedScript<'a>,
    verifier: &EntryPoint<'a>,
    ctx: &ExecutionContext<'_>,
    options: &ExecutionOptions,
) -> Result<Value<'v>, ExecutionError> {
    let tx = ctx
        .tx
        .as_ref()
        .ok_or_else(|| missing_context(script, "tx"))?;
    debug!(verifier = verifier.def.name, "Evaluating verifier");
    let mut evaluator = eval::Evaluator::new(arena, script, ctx, options.max_depth);
    let env = evaluator.globals();
    let tx = convert::transaction(arena, tx);
    evaluator.call_entry_point(env, verifier.def, verifier.binding, tx, &[])
}

/// Run a callable with already validated arguments. The annotation binding is
/// bound to the context invocation.
pub fn eval_callable<'a: 'v, 'v>(
    arena: &'v Bump,
    script: &TypedScript<'a>,
    callable: &EntryPoint<'a>,
    args: &[Value<'v>],
    ctx: &ExecutionContext<'_>,
    options: &ExecutionOptions,
) -> Result<Value<'v>, ExecutionError> {
    let invocation = ctx
        .invocation
        .as_ref()
        .ok_or_else(|| missing_context(script, "invocation"))?;
    debug!(callable = callable.def.name, args = args.len(), "Invoking callable");
    let mut evaluator = eval::Evaluator::new(arena, script, ctx, options.max_depth);
    let env = evaluator.globals();
    let invocation = convert::invocation(arena, invocation);
    evaluator.call_entry_point(env, callable.def, callable.binding, invocation, args)
}

fn missing_context(script: &TypedScript<'_>, name: &str) -> ExecutionError {
    ExecutionError {
        kind: RuntimeError::MissingContext {
            name: name.to_string(),
        }
        .into(),
        source: script.ann.source.to_string(),
        span: None,
    }
}
