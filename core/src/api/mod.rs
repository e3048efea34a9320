//! Public API for the Ridge smart-contract language.
//!
//! This module provides the stable public API for compiling and executing
//! Ridge scripts. Compilation and execution are separate steps:
//!
//! 1. **Compile**: [`Engine::compile`] validates directives, parses, type
//!    checks and estimates the script. Any failure is a [`CompileError`] and
//!    nothing runs.
//! 2. **Execute**: a [`CompiledScript`] is evaluated, verified or invoked
//!    against an [`ExecutionContext`](crate::context::ExecutionContext).
//!    Runtime failures discard everything the run produced.
//!
//! # Example
//!
//! ```ignore
//! use ridge_core::api::{Engine, EngineOptions};
//! use ridge_core::context::{Address, ExecutionContext, InMemoryState, This};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let engine = Engine::new(EngineOptions::default());
//! let script = engine.compile(&arena, "height >= 100")?;
//!
//! let state = InMemoryState::new();
//! let ctx = ExecutionContext::new(&state, This::Account(Address(vec![1]))).with_height(120);
//! assert!(script.evaluate(&ctx)?);
//! ```

pub mod engine;
pub mod error;
pub mod options;
pub mod script;

#[cfg(test)]
mod api_test;

pub use engine::Engine;
pub use error::{CompileError, Diagnostic, Error, RelatedInfo, Severity};
pub use options::{CompilationOptions, EngineOptions, ExecutionOptions};
pub use script::CompiledScript;
