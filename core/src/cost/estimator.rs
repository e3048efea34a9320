use hashbrown::HashMap;
use tracing::debug;

use crate::analyzer::{
    Callee, Expr, ExprInner, FoldBound, FoldCombiner, FunctionDef, TypedDecl, TypedScript,
};
use crate::api::CompilationOptions;
use crate::cost::error::{CostError, CostErrorKind};
use crate::parser::Span;

const CONSTANT: u64 = 1;
const REFERENCE: u64 = 2;
const LET: u64 = 5;
const CALL: u64 = 5;
const OPERATOR: u64 = 1;
const BRANCH: u64 = 1;
const FIELD: u64 = 1;
const INDEX: u64 = 2;
const LIST: u64 = 1;
const FOLD_STEP: u64 = 5;
const FOLD: u64 = 10;

/// Estimated complexity of an accepted script.
///
/// Entry point costs include `globals`, the cost of the top-level `let`s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Complexity {
    pub globals: u64,
    /// The result expression of an expression script.
    pub expression: Option<u64>,
    pub verifier: Option<u64>,
    /// Per callable, in declaration order.
    pub callables: Vec<(String, u64)>,
}

impl Complexity {
    /// The most expensive entry point.
    pub fn max(&self) -> u64 {
        self.expression
            .into_iter()
            .chain(self.verifier)
            .chain(self.callables.iter().map(|(_, cost)| *cost))
            .max()
            .unwrap_or(self.globals)
    }
}

/// Estimate every entry point of `script` and check it against the limits.
pub fn estimate(
    script: &TypedScript<'_>,
    options: &CompilationOptions,
) -> Result<Complexity, CostError> {
    let mut estimator = Estimator {
        script,
        options,
        functions: HashMap::new(),
    };

    let mut globals: u64 = 0;
    for decl in script.decls {
        match decl {
            TypedDecl::Let { value, .. } => {
                globals = globals.saturating_add(LET.saturating_add(estimator.cost(value)?));
            }
            // Declaring a function is free; calls are charged its body.
            TypedDecl::Function(def) => {
                estimator.function_cost(def)?;
            }
        }
    }

    let mut complexity = Complexity {
        globals,
        ..Complexity::default()
    };

    if let Some(body) = script.body {
        let cost = globals.saturating_add(estimator.cost(body)?);
        estimator.check_limit("the script", cost, options.expression_complexity_limit, body)?;
        complexity.expression = Some(cost);
    }
    if let Some(verifier) = &script.verifier {
        let cost = globals.saturating_add(estimator.function_cost(verifier.def)?);
        estimator.check_limit(
            &format!("verifier '{}'", verifier.def.name),
            cost,
            options.expression_complexity_limit,
            verifier.def.body,
        )?;
        complexity.verifier = Some(cost);
    }
    for callable in script.callables {
        let cost = globals.saturating_add(estimator.function_cost(callable.def)?);
        estimator.check_limit(
            &format!("callable '{}'", callable.def.name),
            cost,
            options.callable_complexity_limit,
            callable.def.body,
        )?;
        complexity.callables.push((callable.def.name.to_string(), cost));
    }

    debug!(
        globals = complexity.globals,
        max = complexity.max(),
        "Complexity estimated"
    );
    Ok(complexity)
}

struct Estimator<'s, 'a> {
    script: &'s TypedScript<'a>,
    options: &'s CompilationOptions,
    /// Body cost of each user function, keyed by definition.
    functions: HashMap<*const FunctionDef<'a>, u64>,
}

impl<'s, 'a> Estimator<'s, 'a> {
    fn span_of(&self, expr: &Expr<'a>) -> Span {
        self.script.ann.span_of(expr).unwrap_or_default()
    }

    fn error(&self, kind: CostErrorKind, expr: &Expr<'a>) -> CostError {
        CostError::new(kind, self.script.ann.source, self.span_of(expr))
    }

    fn check_limit(
        &self,
        what: &str,
        cost: u64,
        limit: u64,
        expr: &Expr<'a>,
    ) -> Result<(), CostError> {
        if cost > limit {
            return Err(self.error(
                CostErrorKind::ComplexityLimitExceeded {
                    what: what.to_string(),
                    cost,
                    limit,
                },
                expr,
            ));
        }
        Ok(())
    }

    fn function_cost(&mut self, def: &'a FunctionDef<'a>) -> Result<u64, CostError> {
        let key = def as *const FunctionDef<'a>;
        if let Some(cost) = self.functions.get(&key) {
            return Ok(*cost);
        }
        let cost = self.cost(def.body)?;
        self.functions.insert(key, cost);
        Ok(cost)
    }

    fn sum(&mut self, exprs: &[&'a Expr<'a>]) -> Result<u64, CostError> {
        exprs
            .iter()
            .try_fold(0u64, |total, expr| Ok(total.saturating_add(self.cost(expr)?)))
    }

    fn cost(&mut self, expr: &'a Expr<'a>) -> Result<u64, CostError> {
        let cost = match &expr.1 {
            ExprInner::Constant(_) => CONSTANT,
            ExprInner::Ident(_) => REFERENCE,
            ExprInner::Let { value, body, .. } => {
                LET.saturating_add(self.sum(&[*value, *body])?)
            }
            ExprInner::Function { def, body } => {
                self.function_cost(def)?;
                self.cost(body)?
            }
            ExprInner::Call { callee, args } => {
                let args = self.sum(args)?;
                let callee = match callee {
                    Callee::Builtin(builtin) => builtin.cost,
                    Callee::User(def) => CALL.saturating_add(self.function_cost(def)?),
                };
                callee.saturating_add(args)
            }
            ExprInner::Binary { left, right, .. }
            | ExprInner::Boolean { left, right, .. }
            | ExprInner::Comparison { left, right, .. } => {
                OPERATOR.saturating_add(self.sum(&[*left, *right])?)
            }
            ExprInner::Unary { expr, .. } => OPERATOR.saturating_add(self.cost(expr)?),
            ExprInner::Field { value, .. } => FIELD.saturating_add(self.cost(value)?),
            ExprInner::Index { value, index } => INDEX.saturating_add(self.sum(&[*value, *index])?),
            ExprInner::List(items) => LIST.saturating_add(self.sum(items)?),
            ExprInner::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let branches = self.cost(then_branch)?.max(self.cost(else_branch)?);
                BRANCH
                    .saturating_add(self.cost(cond)?)
                    .saturating_add(branches)
            }
            ExprInner::Match { scrutinee, cases } => {
                let mut branches = 0;
                for case in *cases {
                    branches = branches.max(self.cost(case.body)?);
                }
                BRANCH
                    .saturating_add(self.cost(scrutinee)?)
                    .saturating_add(branches)
            }
            ExprInner::Fold {
                bound,
                collection,
                init,
                combiner,
            } => self.fold_cost(expr, *bound, collection, init, *combiner)?,
        };
        Ok(cost)
    }

    /// `collection + init + N * (combiner + 5) + 10`
    fn fold_cost(
        &mut self,
        expr: &'a Expr<'a>,
        bound: FoldBound,
        collection: &'a Expr<'a>,
        init: &'a Expr<'a>,
        combiner: FoldCombiner<'a>,
    ) -> Result<u64, CostError> {
        let max = self.options.max_fold_bound;
        let unbounded = |reason: String| {
            self.error(CostErrorKind::UnboundedIteration { reason }, expr)
        };
        let n = match bound {
            FoldBound::Unresolved => {
                return Err(unbounded(
                    "the FOLD bound must be an integer literal".to_string(),
                ));
            }
            FoldBound::Constant(n) if n <= 0 => {
                return Err(unbounded(format!("FOLD<{}> is not a positive bound", n)));
            }
            FoldBound::Constant(n) if n > max => {
                return Err(unbounded(format!(
                    "FOLD<{}> is above the maximum bound of {}",
                    n, max
                )));
            }
            FoldBound::Constant(n) => n,
        };
        if let ExprInner::List(items) = &collection.1 {
            if (items.len() as u64) < n as u64 {
                return Err(self.error(
                    CostErrorKind::FoldBoundsViolation {
                        bound: n,
                        len: items.len(),
                    },
                    collection,
                ));
            }
        }

        let step = match combiner {
            FoldCombiner::Named(def) => CALL.saturating_add(self.function_cost(def)?),
            FoldCombiner::Lambda(def) => self.cost(def.body)?,
        };
        Ok(self
            .sum(&[collection, init])?
            .saturating_add((n as u64).saturating_mul(step.saturating_add(FOLD_STEP)))
            .saturating_add(FOLD))
    }
}
