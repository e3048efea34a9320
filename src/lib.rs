//! Ridge - a statically typed, non-Turing-complete smart-contract language
//!
//! # Overview
//!
//! Ridge scripts decide whether a blockchain transaction is allowed
//! (expression scripts and DApp verifiers) or compute the state changes and
//! transfers of a DApp call (`@Callable` functions). Every script is bounded:
//! there is no recursion, the only loop is `FOLD<N>` with a literal `N`, and
//! a cost estimator rejects scripts above the complexity limits before they
//! can run.
//!
//! # Quick Start
//!
//! ```ignore
//! use ridge::{Engine, EngineOptions};
//! use ridge::context::{Address, ExecutionContext, InMemoryState, This};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let engine = Engine::new(EngineOptions::default());
//! let script = engine.compile(&arena, "height >= 100 && isDefined(getInteger(this, \"owner\"))")?;
//!
//! let state = InMemoryState::new();
//! let ctx = ExecutionContext::new(&state, This::Account(Address(vec![1]))).with_height(150);
//! let allowed = script.evaluate(&ctx)?;
//! ```
//!
//! # Errors
//!
//! Compilation errors and runtime errors both carry a [`Diagnostic`] that
//! [`render_error`] prints with the offending source underlined.

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from ridge_core
pub use ridge_core::api::{
    CompilationOptions, CompileError, CompiledScript, Diagnostic, Engine, EngineOptions, Error,
    ExecutionOptions, RelatedInfo, Severity,
};

pub use ridge_core::actions::{ScriptResult, ScriptTransfer};
pub use ridge_core::context;
pub use ridge_core::cost::Complexity;
pub use ridge_core::directives::{ContentType, DirectiveSet, ScriptType};
pub use ridge_core::types::{self, Type, TypeManager};
pub use ridge_core::values::{self, Value};

// Re-export errors
pub use ridge_core::evaluator::{ExecutionError, RuntimeError};
