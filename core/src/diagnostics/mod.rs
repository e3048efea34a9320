//! Shared diagnostic helpers.

pub mod context;

pub use context::Context;
