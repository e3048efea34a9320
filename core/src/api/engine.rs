//! The Ridge compilation engine.

use bumpalo::Bump;
use tracing::{debug, info};

use super::{CompileError, CompiledScript, EngineOptions, Error};
use crate::directives::{self, DirectiveSet};
use crate::types::TypeManager;
use crate::{analyzer, cost, parser};

/// The Ridge compilation engine.
///
/// The engine runs the static pipeline (directives, parsing, type checking
/// and cost estimation) and hands out [`CompiledScript`]s. It holds no state
/// besides its options, so one engine can compile any number of scripts.
///
/// # Lifetimes
///
/// - `'a`: Lifetime of the arena holding the types and trees of a compiled
///   script. The compiled script borrows from it.
///
/// # Example
///
/// ```ignore
/// use ridge_core::api::{Engine, EngineOptions};
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let engine = Engine::new(EngineOptions::default());
///
/// let script = engine.compile(&arena, "height > 100")?;
/// assert_eq!(script.complexity().expression, Some(4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compile a script: directives, then the body.
    ///
    /// A script without directives is an expression script for the latest
    /// library version attached to an account.
    pub fn compile<'a>(
        &self,
        arena: &'a Bump,
        source: &'a str,
    ) -> Result<CompiledScript<'a>, Error> {
        Ok(self.compile_script(arena, source)?)
    }

    /// Compile a bare expression of any type.
    ///
    /// The expression sees the globals of an expression script at the latest
    /// library version, but its result does not have to be `Boolean`.
    pub fn compile_expression<'a>(
        &self,
        arena: &'a Bump,
        source: &'a str,
    ) -> Result<CompiledScript<'a>, Error> {
        Ok(self.compile_bare(arena, source)?)
    }

    fn compile_script<'a>(
        &self,
        arena: &'a Bump,
        source: &'a str,
    ) -> Result<CompiledScript<'a>, CompileError> {
        let header = parser::parse_header(source)?;
        let directives = directives::validate(&header, source)?;
        debug!(
            version = directives.stdlib_version,
            content = %directives.content_type,
            script = %directives.script_type,
            "Directives validated"
        );

        let parsed =
            parser::parse_with_max_depth(arena, source, self.options.compilation.max_depth)?;
        let typed = analyzer::analyze(TypeManager::new(arena), parsed, directives)?;
        let complexity = cost::estimate(&typed, &self.options.compilation)?;
        info!(complexity = complexity.max(), "Script compiled");

        Ok(CompiledScript::new(
            typed,
            complexity,
            self.options.execution.clone(),
        ))
    }

    fn compile_bare<'a>(
        &self,
        arena: &'a Bump,
        source: &'a str,
    ) -> Result<CompiledScript<'a>, CompileError> {
        let parsed = parser::parse_expression_with_max_depth(
            arena,
            source,
            self.options.compilation.max_depth,
        )?;
        let typed =
            analyzer::analyze_expression(TypeManager::new(arena), parsed, DirectiveSet::default())?;
        let complexity = cost::estimate(&typed, &self.options.compilation)?;
        info!(complexity = complexity.max(), "Expression compiled");

        Ok(CompiledScript::new(
            typed,
            complexity,
            self.options.execution.clone(),
        ))
    }
}
