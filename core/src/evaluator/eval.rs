//! Core evaluation logic.

use bumpalo::Bump;
use tracing::trace;

use crate::{
    analyzer::{Callee, Expr, ExprInner, FoldBound, FoldCombiner, FunctionDef, TypedDecl, TypedScript},
    context::{ExecutionContext, convert},
    directives::ContentType,
    evaluator::{
        ExecutionError, ExecutionErrorKind,
        ResourceExceededError::*,
        RuntimeError::{self, *},
        env::{self, Closure, Env, Slot, Thunk},
        operators,
    },
    parser::{BinaryOp, BoolOp, ComparisonOp, UnaryOp},
    stdlib::Runtime,
    values::Value,
};

/// Evaluator for type-checked scripts.
///
/// Values are allocated in `arena`, which may be shorter-lived than the
/// typed tree.
pub(super) struct Evaluator<'e, 'a, 'v> {
    arena: &'v Bump,
    script: &'e TypedScript<'a>,
    ctx: &'e ExecutionContext<'e>,
    max_depth: usize,
    depth: usize,
}

impl<'e, 'a: 'v, 'v> Evaluator<'e, 'a, 'v> {
    pub fn new(
        arena: &'v Bump,
        script: &'e TypedScript<'a>,
        ctx: &'e ExecutionContext<'e>,
        max_depth: usize,
    ) -> Self {
        Self {
            arena,
            script,
            ctx,
            max_depth,
            depth: 0,
        }
    }

    fn error(&self, expr: &'a Expr<'a>, kind: impl Into<ExecutionErrorKind>) -> ExecutionError {
        ExecutionError {
            kind: kind.into(),
            source: self.script.ann.source.to_string(),
            span: self.script.ann.span_of(expr),
        }
    }

    /// The environment every entry point starts from: context globals, then
    /// top-level declarations in source order.
    pub fn globals(&self) -> Env<'a, 'v> {
        let arena = self.arena;
        let mut env = env::bind(arena, None, "height", Slot::Value(Value::Int(self.ctx.height)));
        env = env::bind(arena, env, "this", Slot::Value(convert::this(arena, &self.ctx.this)));
        if self.script.directives.content_type == ContentType::Expression {
            let tx = match &self.ctx.tx {
                Some(tx) => Slot::Value(convert::transaction(arena, tx)),
                None => Slot::Missing,
            };
            env = env::bind(arena, env, "tx", tx);
        }

        for decl in self.script.decls {
            env = match decl {
                TypedDecl::Let { name, value } => {
                    let thunk = arena.alloc(Thunk::new(value, env));
                    env::bind(arena, env, name, Slot::Lazy(thunk))
                }
                TypedDecl::Function(def) => {
                    env::bind(arena, env, def.name, Slot::Function(Closure { def: *def, env }))
                }
            };
        }
        env
    }

    /// Bind the annotation binding and the parameters, then run the body.
    pub fn call_entry_point(
        &mut self,
        env: Env<'a, 'v>,
        def: &'a FunctionDef<'a>,
        binding: &'a str,
        implicit: Value<'v>,
        args: &[Value<'v>],
    ) -> Result<Value<'v>, ExecutionError> {
        let env = env::bind(self.arena, env, binding, Slot::Value(implicit));
        self.call(Closure { def, env }, args)
    }

    /// Evaluate an expression node.
    pub fn eval_expr(
        &mut self,
        env: Env<'a, 'v>,
        expr: &'a Expr<'a>,
    ) -> Result<Value<'v>, ExecutionError> {
        if self.depth >= self.max_depth {
            return Err(self.error(
                expr,
                StackOverflow {
                    depth: self.depth,
                    max_depth: self.max_depth,
                },
            ));
        }

        self.depth += 1;
        let result = self.eval_expr_inner(env, expr);
        self.depth -= 1;

        result
    }

    fn eval_expr_inner(
        &mut self,
        env: Env<'a, 'v>,
        expr: &'a Expr<'a>,
    ) -> Result<Value<'v>, ExecutionError> {
        match &expr.1 {
            ExprInner::Constant(value) => Ok(*value),

            ExprInner::Ident(name) => self.lookup_value(env, name, expr),

            ExprInner::Let { name, value, body } => {
                let thunk = self.arena.alloc(Thunk::new(value, env));
                let env = env::bind(self.arena, env, name, Slot::Lazy(thunk));
                self.eval_expr(env, body)
            }

            ExprInner::Function { def, body } => {
                let closure = Closure { def: *def, env };
                let env = env::bind(self.arena, env, def.name, Slot::Function(closure));
                self.eval_expr(env, body)
            }

            ExprInner::Call { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args.iter() {
                    values.push(self.eval_expr(env, arg)?);
                }
                match callee {
                    Callee::Builtin(builtin) => {
                        let runtime = Runtime {
                            arena: self.arena,
                            ctx: self.ctx,
                        };
                        (builtin.eval)(&runtime, &values).map_err(|e| self.error(expr, e))
                    }
                    Callee::User(def) => {
                        let closure = self.closure(env, def);
                        self.call(closure, &values)
                    }
                }
            }

            ExprInner::Binary { op, left, right } => {
                let left = self.eval_expr(env, left)?;
                let right = self.eval_expr(env, right)?;
                self.eval_binary(*op, left, right)
                    .map_err(|e| self.error(expr, e))
            }

            ExprInner::Boolean { op, left, right } => {
                let left = self.eval_bool(env, left)?;
                // Short-circuit: the right operand only runs when it decides the result.
                let result = match op {
                    BoolOp::And => left && self.eval_bool(env, right)?,
                    BoolOp::Or => left || self.eval_bool(env, right)?,
                };
                Ok(Value::Bool(result))
            }

            ExprInner::Comparison { op, left, right } => {
                let left = self.eval_expr(env, left)?;
                let right = self.eval_expr(env, right)?;
                let result = match (op, left, right) {
                    (ComparisonOp::Eq, l, r) => l == r,
                    (ComparisonOp::Neq, l, r) => l != r,
                    (op, Value::Int(l), Value::Int(r)) => operators::eval_comparison_int(*op, l, r),
                    (op, l, r) => unreachable!("'{}' on {} and {} in type-checked expression", op, l, r),
                };
                Ok(Value::Bool(result))
            }

            ExprInner::Unary { op, expr: operand } => {
                let value = self.eval_expr(env, operand)?;
                match (op, value) {
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Neg, Value::Int(i)) => operators::eval_unary_int(*op, i)
                        .map(Value::Int)
                        .map_err(|e| self.error(expr, e)),
                    (op, value) => unreachable!("'{:?}' on {} in type-checked expression", op, value),
                }
            }

            ExprInner::Field { value, field } => {
                let value = self.eval_expr(env, value)?;
                match value.as_struct().and_then(|s| s.field(field)) {
                    Some(field) => Ok(field),
                    None => unreachable!("no field '{}' on {} in type-checked expression", field, value),
                }
            }

            ExprInner::Index { value, index } => {
                let items = self.eval_list(env, value)?;
                let index = match self.eval_expr(env, index)? {
                    Value::Int(i) => i,
                    other => unreachable!("index type-checked as Int, got {}", other),
                };
                usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i).copied())
                    .ok_or_else(|| {
                        self.error(
                            expr,
                            IndexOutOfBounds {
                                index,
                                len: items.len(),
                            },
                        )
                    })
            }

            ExprInner::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items.iter() {
                    values.push(self.eval_expr(env, item)?);
                }
                Ok(Value::list(self.arena, &values))
            }

            ExprInner::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(env, cond)? {
                    self.eval_expr(env, then_branch)
                } else {
                    self.eval_expr(env, else_branch)
                }
            }

            ExprInner::Match { scrutinee, cases } => {
                let value = self.eval_expr(env, scrutinee)?;
                let Some(case) = cases.iter().find(|case| case.matches(&value)) else {
                    unreachable!("no case matches {} in exhaustive match", value)
                };
                let env = match case.binding {
                    Some(name) => env::bind(self.arena, env, name, Slot::Value(value)),
                    None => env,
                };
                self.eval_expr(env, case.body)
            }

            ExprInner::Fold {
                bound,
                collection,
                init,
                combiner,
            } => {
                let FoldBound::Constant(bound) = *bound else {
                    unreachable!("FOLD without a constant bound passed cost estimation")
                };
                let items = self.eval_list(env, collection)?;
                let mut acc = self.eval_expr(env, init)?;
                let closure = match combiner {
                    FoldCombiner::Named(def) => self.closure(env, def),
                    FoldCombiner::Lambda(def) => Closure { def: *def, env },
                };
                let n = usize::try_from(bound).unwrap_or(0);
                if items.len() < n {
                    return Err(self.error(
                        expr,
                        FoldBoundsViolation {
                            bound,
                            len: items.len(),
                        },
                    ));
                }
                for item in &items[..n] {
                    acc = self.call(closure, &[acc, *item])?;
                }
                Ok(acc)
            }
        }
    }

    fn lookup_value(
        &mut self,
        env: Env<'a, 'v>,
        name: &str,
        expr: &'a Expr<'a>,
    ) -> Result<Value<'v>, ExecutionError> {
        match env::lookup(env, name) {
            Some(Slot::Value(value)) => Ok(value),
            Some(Slot::Lazy(thunk)) => {
                if let Some(value) = thunk.memo() {
                    return Ok(value);
                }
                trace!(name, "Forcing let binding");
                let value = self.eval_expr(thunk.env, thunk.expr)?;
                thunk.set_memo(value);
                Ok(value)
            }
            Some(Slot::Missing) => Err(self.error(
                expr,
                MissingContext {
                    name: name.to_string(),
                },
            )),
            Some(Slot::Function(_)) | None => {
                unreachable!("'{}' is not a value in type-checked expression", name)
            }
        }
    }

    /// The closure a user function was declared as.
    fn closure(&self, env: Env<'a, 'v>, def: &'a FunctionDef<'a>) -> Closure<'a, 'v> {
        match env::lookup(env, def.name) {
            Some(Slot::Function(closure)) if core::ptr::eq(closure.def, def) => closure,
            _ => unreachable!("function '{}' is not in scope", def.name),
        }
    }

    /// Call a closure with evaluated arguments.
    fn call(
        &mut self,
        closure: Closure<'a, 'v>,
        args: &[Value<'v>],
    ) -> Result<Value<'v>, ExecutionError> {
        debug_assert_eq!(closure.def.params.len(), args.len());
        let mut env = closure.env;
        for ((name, _), value) in closure.def.params.iter().zip(args) {
            env = env::bind(self.arena, env, name, Slot::Value(*value));
        }
        self.eval_expr(env, closure.def.body)
    }

    fn eval_bool(&mut self, env: Env<'a, 'v>, expr: &'a Expr<'a>) -> Result<bool, ExecutionError> {
        match self.eval_expr(env, expr)? {
            Value::Bool(b) => Ok(b),
            other => unreachable!("type-checked as Boolean, got {}", other),
        }
    }

    fn eval_list(
        &mut self,
        env: Env<'a, 'v>,
        expr: &'a Expr<'a>,
    ) -> Result<&'v [Value<'v>], ExecutionError> {
        match self.eval_expr(env, expr)? {
            Value::List(items) => Ok(items),
            other => unreachable!("type-checked as List, got {}", other),
        }
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: Value<'v>,
        right: Value<'v>,
    ) -> Result<Value<'v>, RuntimeError> {
        let arena = self.arena;
        let value = match (op, left, right) {
            (_, Value::Int(l), Value::Int(r)) => Value::Int(operators::eval_binary_int(op, l, r)?),
            (BinaryOp::Add | BinaryOp::Concat, Value::Str(l), Value::Str(r)) => {
                Value::str(arena, &[l, r].concat())
            }
            (BinaryOp::Concat, Value::Bytes(l), Value::Bytes(r)) => {
                Value::bytes(arena, &[l, r].concat())
            }
            (BinaryOp::Concat, Value::List(l), Value::List(r)) => {
                Value::list(arena, &[l, r].concat())
            }
            (BinaryOp::Append, Value::List(l), elem) => {
                let mut items = l.to_vec();
                items.push(elem);
                Value::list(arena, &items)
            }
            (op, l, r) => unreachable!("'{}' on {} and {} in type-checked expression", op, l, r),
        };
        Ok(value)
    }
}
