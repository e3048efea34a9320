//! Compiled Ridge scripts.

use bumpalo::Bump;
use tracing::{debug, info};

use super::{Error, ExecutionOptions};
use crate::actions::ScriptResult;
use crate::analyzer::{EntryPoint, TypedScript};
use crate::context::ExecutionContext;
use crate::cost::Complexity;
use crate::directives::{ContentType, DirectiveSet};
use crate::evaluator::{self, ExecutionError};
use crate::types::Type;
use crate::values::Value;

/// A script that passed every static check and is ready to run.
///
/// Only [`Engine::compile`](super::Engine::compile) and
/// [`Engine::compile_expression`](super::Engine::compile_expression) create
/// one, so a script that failed parsing, type checking or cost estimation can
/// never be executed.
///
/// A compiled script borrows the compilation arena and can be run any number
/// of times against different contexts. Runs share nothing: each one
/// allocates its values in a fresh arena unless the caller provides one.
///
/// # Example
///
/// ```ignore
/// let script = engine.compile(&arena, "height > 10")?;
/// let ctx = ExecutionContext::new(&state, This::Account(address)).with_height(11);
/// assert!(script.evaluate(&ctx)?);
/// ```
#[derive(Debug)]
pub struct CompiledScript<'a> {
    typed: TypedScript<'a>,
    complexity: Complexity,
    options: ExecutionOptions,
}

impl<'a> CompiledScript<'a> {
    pub(crate) fn new(
        typed: TypedScript<'a>,
        complexity: Complexity,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            typed,
            complexity,
            options,
        }
    }

    pub fn directives(&self) -> DirectiveSet {
        self.typed.directives
    }

    /// Estimated complexity per entry point.
    pub fn complexity(&self) -> &Complexity {
        &self.complexity
    }

    /// The type-checked tree.
    pub fn typed(&self) -> &TypedScript<'a> {
        &self.typed
    }

    /// Type of the result expression, if the script has one.
    pub fn result_type(&self) -> Option<&'a Type<'a>> {
        self.typed.body.map(|body| body.0)
    }

    /// Names of the `@Callable` functions, in declaration order.
    pub fn callables(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.typed.callables.iter().map(|c| c.def.name)
    }

    /// Parameters of a callable.
    pub fn callable_params(&self, name: &str) -> Option<&'a [(&'a str, &'a Type<'a>)]> {
        self.typed.callable(name).map(|c| c.def.params)
    }

    /// Evaluate the result expression, allocating the value in `arena`.
    pub fn evaluate_value<'v>(
        &self,
        arena: &'v Bump,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Value<'v>, Error>
    where
        'a: 'v,
    {
        if self.typed.body.is_none() {
            return Err(Error::Api(
                "A DApp has no result expression; use verify or invoke".to_string(),
            ));
        }
        Ok(evaluator::eval_expression(
            arena,
            &self.typed,
            ctx,
            &self.options,
        )?)
    }

    /// Run an expression script. The result is whether the transaction is
    /// allowed.
    pub fn evaluate(&self, ctx: &ExecutionContext<'_>) -> Result<bool, Error> {
        let arena = Bump::new();
        let value = self.evaluate_value(&arena, ctx)?;
        let allowed = expect_bool(value)?;
        info!(allowed, "Expression evaluated");
        Ok(allowed)
    }

    /// Validate the context transaction.
    ///
    /// Expression scripts are their own verifier; DApps run their
    /// `@Verifier` function.
    pub fn verify(&self, ctx: &ExecutionContext<'_>) -> Result<bool, Error> {
        if self.typed.directives.content_type == ContentType::Expression {
            return self.evaluate(ctx);
        }
        let verifier = self
            .typed
            .verifier
            .as_ref()
            .ok_or_else(|| Error::Api("The DApp has no @Verifier function".to_string()))?;
        let arena = Bump::new();
        let value = evaluator::eval_verifier(&arena, &self.typed, verifier, ctx, &self.options)?;
        let allowed = expect_bool(value)?;
        info!(allowed, verifier = verifier.def.name, "Verifier evaluated");
        Ok(allowed)
    }

    /// Invoke a `@Callable` function.
    ///
    /// Arguments are checked against the declared parameter types. On
    /// success the actions are returned; on any error nothing is.
    pub fn invoke(
        &self,
        name: &str,
        args: &[Value<'_>],
        ctx: &ExecutionContext<'_>,
    ) -> Result<ScriptResult, Error> {
        let callable = self
            .typed
            .callable(name)
            .ok_or_else(|| Error::Api(format!("Unknown callable '{}'", name)))?;
        check_args(callable, args)?;

        let arena = Bump::new();
        let value =
            evaluator::eval_callable(&arena, &self.typed, callable, args, ctx, &self.options)?;
        let result = ScriptResult::from_value(value).map_err(|e| ExecutionError {
            kind: e.into(),
            source: self.typed.ann.source.to_string(),
            span: self.typed.ann.span_of(callable.def.body),
        })?;
        debug!(
            callable = name,
            data = result.data.len(),
            transfers = result.transfers.len(),
            "Callable returned"
        );
        Ok(result)
    }
}

fn check_args(callable: &EntryPoint<'_>, args: &[Value<'_>]) -> Result<(), Error> {
    let params = callable.def.params;
    if args.len() != params.len() {
        return Err(Error::Api(format!(
            "Callable '{}' expects {} argument(s), got {}",
            callable.def.name,
            params.len(),
            args.len()
        )));
    }
    for ((name, ty), arg) in params.iter().zip(args) {
        if !arg.conforms(ty) {
            return Err(Error::Api(format!(
                "Argument '{}' of '{}' should be {}, got {}",
                name, callable.def.name, ty, arg
            )));
        }
    }
    Ok(())
}

fn expect_bool(value: Value<'_>) -> Result<bool, Error> {
    match value {
        Value::Bool(b) => Ok(b),
        // Bare expressions may have any type.
        other => Err(Error::Api(format!(
            "Expected a Boolean result, got {}",
            other
        ))),
    }
}
