//! Configuration options for the Ridge engine.

/// Limits enforced while compiling a script.
///
/// # Example
///
/// ```
/// use ridge_core::api::CompilationOptions;
///
/// let options = CompilationOptions {
///     max_fold_bound: 100,
///     ..CompilationOptions::default()
/// };
/// assert_eq!(options.expression_complexity_limit, 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Maximum nesting depth of brackets, `if` expressions and prefix
    /// operators. Deeper sources are rejected before they are parsed.
    ///
    /// Default: 32
    pub max_depth: usize,

    /// Largest `N` accepted in `FOLD<N>`.
    ///
    /// Default: 1000
    pub max_fold_bound: i64,

    /// Complexity limit for expression scripts and verifiers.
    ///
    /// Default: 2000
    pub expression_complexity_limit: u64,

    /// Complexity limit for each `@Callable` function.
    ///
    /// Default: 4000
    pub callable_complexity_limit: u64,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_fold_bound: 1000,
            expression_complexity_limit: 2000,
            callable_complexity_limit: 4000,
        }
    }
}

/// Configuration options for script execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum evaluation depth (nested calls, forced thunks and folds).
    ///
    /// Default: 1000
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

/// Configuration options for the Ridge engine.
///
/// # Example
///
/// ```
/// use ridge_core::api::{EngineOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     execution: ExecutionOptions { max_depth: 500 },
///     ..EngineOptions::default()
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub compilation: CompilationOptions,
    pub execution: ExecutionOptions,
}
