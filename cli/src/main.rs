mod input;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bumpalo::Bump;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr, miette};
use ridge::{CompiledScript, Engine, EngineOptions, render_error};
use tracing::debug;

use input::ContextFile;

/// Ridge - a statically typed, non-Turing-complete smart-contract language
#[derive(Parser, Debug)]
#[command(name = "ridge")]
#[command(about = "Check and run Ridge scripts", long_about = None)]
struct Args {
    /// Largest N accepted in FOLD<N>
    #[arg(long, global = true)]
    max_fold_bound: Option<i64>,

    /// Maximum evaluation depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Maximum nesting depth of the source text
    #[arg(long, global = true)]
    max_nesting: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a script and print its directives and complexity
    Check {
        /// Script file ("-" reads from stdin)
        file: PathBuf,
    },

    /// Evaluate an expression of any type and print its value
    Eval {
        /// Expression to evaluate (if not provided, reads from stdin)
        expression: Option<String>,

        /// JSON file describing height, this, tx, invocation and state
        #[arg(long)]
        context: Option<PathBuf>,

        /// Print the type of the expression along with its value
        #[arg(long)]
        show_type: bool,
    },

    /// Verify the context transaction, or invoke a callable of a DApp
    Run {
        /// Script file ("-" reads from stdin)
        file: PathBuf,

        /// JSON file describing height, this, tx, invocation and state
        #[arg(long)]
        context: Option<PathBuf>,

        /// Name of the @Callable function to invoke
        #[arg(long)]
        call: Option<String>,

        /// Callable arguments as a JSON array
        #[arg(long, default_value = "[]", requires = "call")]
        args: String,
    },
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .into_diagnostic()
            .wrap_err("cannot read the script from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", path.display()))
}

fn load_context(path: Option<&Path>) -> Result<ContextFile> {
    let Some(path) = path else {
        return Ok(ContextFile::default());
    };
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", path.display()))?;
    Ok(ContextFile::parse(&text)?)
}

fn engine_options(args: &Args) -> EngineOptions {
    let mut options = EngineOptions::default();
    if let Some(bound) = args.max_fold_bound {
        options.compilation.max_fold_bound = bound;
    }
    if let Some(depth) = args.max_depth {
        options.execution.max_depth = depth;
    }
    if let Some(depth) = args.max_nesting {
        options.compilation.max_depth = depth;
    }
    options
}

fn print_complexity(script: &CompiledScript<'_>) {
    let directives = script.directives();
    println!(
        "STDLIB_VERSION {}, CONTENT_TYPE {}, SCRIPT_TYPE {}",
        directives.stdlib_version, directives.content_type, directives.script_type
    );
    let complexity = script.complexity();
    println!("globals: {}", complexity.globals);
    if let Some(cost) = complexity.expression {
        println!("expression: {}", cost);
    }
    if let Some(cost) = complexity.verifier {
        println!("verifier: {}", cost);
    }
    for (name, cost) in &complexity.callables {
        println!("callable {}: {}", name, cost);
    }
}

fn run(args: &Args, engine: &Engine) -> Result<ExitCode> {
    let arena = Bump::new();
    match &args.command {
        Command::Check { file } => {
            let source = arena.alloc_str(&read_source(file)?);
            match engine.compile(&arena, source) {
                Ok(script) => {
                    print_complexity(&script);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    render_error(&e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Eval {
            expression,
            context,
            show_type,
        } => {
            let text = match expression {
                Some(expression) => expression.clone(),
                None => read_source(Path::new("-"))?,
            };
            let file = load_context(context.as_deref())?;
            let source = arena.alloc_str(text.trim());
            let values = Bump::new();
            let result = engine.compile_expression(&arena, source).and_then(|script| {
                let value = script.evaluate_value(&values, &file.context())?;
                Ok((script.result_type(), value))
            });
            match result {
                Ok((Some(ty), value)) if *show_type => println!("{}: {}", value, ty),
                Ok((_, value)) => println!("{}", value),
                Err(e) => {
                    render_error(&e);
                    return Ok(ExitCode::FAILURE);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Run {
            file,
            context,
            call,
            args: call_args,
        } => {
            let source = arena.alloc_str(&read_source(file)?);
            let file = load_context(context.as_deref())?;
            let ctx = file.context();
            let script = match engine.compile(&arena, source) {
                Ok(script) => script,
                Err(e) => {
                    render_error(&e);
                    return Ok(ExitCode::FAILURE);
                }
            };

            let Some(name) = call else {
                return match script.verify(&ctx) {
                    Ok(true) => {
                        println!("allowed");
                        Ok(ExitCode::SUCCESS)
                    }
                    Ok(false) => {
                        println!("denied");
                        Ok(ExitCode::FAILURE)
                    }
                    Err(e) => {
                        render_error(&e);
                        Ok(ExitCode::FAILURE)
                    }
                };
            };

            let params = script
                .callable_params(name)
                .ok_or_else(|| miette!("the script has no @Callable function '{}'", name))?;
            let values = Bump::new();
            let call_values = input::parse_args(&values, name, params, call_args)?;
            debug!(callable = %name, args = call_values.len(), "Invoking");
            match script.invoke(name, &call_values, &ctx) {
                Ok(result) => {
                    let json = serde_json::to_string_pretty(&result).into_diagnostic()?;
                    println!("{}", json);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    render_error(&e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level; defaults to WARN.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let engine = Engine::new(engine_options(&args));
    run(&args, &engine)
}
