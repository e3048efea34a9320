//! Core implementation of the Ridge smart-contract language.
//!
//! Pipeline: [`parser`] -> [`directives`] -> [`analyzer`] -> [`cost`] -> [`evaluator`].
//! The [`api`] module ties the phases together behind [`api::Engine`].

pub mod actions;
pub mod analyzer;
pub mod api;
pub mod context;
pub mod cost;
pub mod diagnostics;
pub mod directives;
pub mod evaluator;
pub mod parser;
pub mod scope_stack;
pub mod stdlib;
pub mod syntax;
pub mod types;
pub mod values;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_fold_cost() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
