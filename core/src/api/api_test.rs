use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::actions::ScriptTransfer;
use crate::api::{
    CompilationOptions, CompileError, Engine, EngineOptions, Error, ExecutionOptions,
};
use crate::context::{Address, DataValue, ExecutionContext, InMemoryState, Invocation, This};
use crate::cost::CostErrorKind;
use crate::directives::ContentType;
use crate::evaluator::RuntimeError;
use crate::parser::ParseErrorKind;
use crate::values::Value;

fn owner() -> Address {
    Address(vec![1, 2, 3])
}

fn invocation() -> Invocation {
    Invocation {
        caller: Address(vec![4, 5]),
        caller_public_key: Default::default(),
        payment: None,
        transaction_id: Default::default(),
        fee: 5,
        fee_asset_id: None,
    }
}

const WALLET: &str = indoc! {"
    {-# STDLIB_VERSION 5 #-}
    {-# CONTENT_TYPE DAPP #-}
    {-# SCRIPT_TYPE ACCOUNT #-}

    @Callable(i)
    func withdraw(amount: Int) = {
        let balance = valueOrElse(getInteger(this, \"balance\"), 0)
        if amount > balance then throw(\"insufficient balance\")
        else ScriptResult(
            WriteSet([DataEntry(\"balance\", balance - amount)]),
            TransferSet([ScriptTransfer(i.caller, amount, unit)])
        )
    }
"};

#[test]
fn test_compile_and_evaluate() {
    let arena = Bump::new();
    let engine = Engine::new(EngineOptions::default());
    let script = engine.compile(&arena, "height >= 100").unwrap();
    assert_eq!(script.directives().content_type, ContentType::Expression);
    assert_eq!(script.complexity().expression, Some(4));

    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    assert!(!script.evaluate(&ctx.clone().with_height(99)).unwrap());
    assert!(script.evaluate(&ctx.clone().with_height(100)).unwrap());
    // An expression script is its own verifier.
    assert!(script.verify(&ctx.with_height(120)).unwrap());
}

#[test]
fn test_compile_expression_of_any_type() {
    let arena = Bump::new();
    let engine = Engine::default();
    let script = engine.compile_expression(&arena, "[1, 2] :+ 3").unwrap();
    assert_eq!(script.result_type().unwrap().to_string(), "List[Int]");

    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    let values = Bump::new();
    let value = script.evaluate_value(&values, &ctx).unwrap();
    assert_eq!(value.to_string(), "[1, 2, 3]");
    assert!(matches!(script.evaluate(&ctx), Err(Error::Api(_))));
}

#[test]
fn test_each_phase_reports_its_error() {
    let arena = Bump::new();
    let engine = Engine::default();
    let phase = |source: &'static str| match engine.compile(&arena, source) {
        Err(Error::Compilation(e)) => e,
        other => panic!("expected a compile error for {:?}, got {:?}", source, other.map(|_| ())),
    };

    assert!(matches!(phase("1 +"), CompileError::Parse(_)));
    assert!(matches!(
        phase("{-# STDLIB_VERSION 9 #-}\ntrue"),
        CompileError::Directive(_)
    ));
    assert!(matches!(phase("1 + true == 2"), CompileError::Type(_)));
    assert!(matches!(
        phase("FOLD<5000>([1], 0, (a, b) => a + b) == 1"),
        CompileError::Cost(_)
    ));
}

#[test]
fn test_compile_error_has_diagnostic() {
    let arena = Bump::new();
    let err = Engine::default().compile(&arena, "let a = 1\nlet a = 2\na == 1").unwrap_err();
    let diagnostic = err.diagnostic().unwrap();
    assert_eq!(diagnostic.code.as_deref(), Some("E003"));
    assert_eq!(err.source_text(), Some("let a = 1\nlet a = 2\na == 1"));
}

#[test]
fn test_compilation_options_apply() {
    let arena = Bump::new();
    let engine = Engine::new(EngineOptions {
        compilation: CompilationOptions {
            expression_complexity_limit: 3,
            ..CompilationOptions::default()
        },
        ..EngineOptions::default()
    });
    let Err(Error::Compilation(CompileError::Cost(err))) = engine.compile(&arena, "height > 1")
    else {
        panic!("expected a cost error");
    };
    assert!(matches!(
        err.kind,
        CostErrorKind::ComplexityLimitExceeded { cost: 4, limit: 3, .. }
    ));
}

#[test]
fn test_nesting_limit_applies_to_scripts_and_expressions() {
    let arena = Bump::new();
    let engine = Engine::new(EngineOptions {
        compilation: CompilationOptions {
            max_depth: 2,
            ..CompilationOptions::default()
        },
        ..EngineOptions::default()
    });
    assert!(engine.compile(&arena, "height > ((1))").is_ok());

    let Err(Error::Compilation(CompileError::Parse(err))) =
        engine.compile(&arena, "height > (((1)))")
    else {
        panic!("expected a parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded {
            depth: 3,
            max_depth: 2
        }
    );

    let err = engine
        .compile_expression(&arena, "[[[1]]]")
        .map(|_| ())
        .unwrap_err();
    assert_eq!(err.diagnostic().and_then(|d| d.code).as_deref(), Some("P004"));
}

#[test]
fn test_invoke() {
    let arena = Bump::new();
    let script = Engine::default().compile(&arena, WALLET).unwrap();
    assert_eq!(script.callables().collect::<Vec<_>>(), vec!["withdraw"]);

    let state = InMemoryState::new().with(&owner(), "balance", DataValue::Integer(50));
    let ctx = ExecutionContext::new(&state, This::Account(owner())).with_invocation(invocation());

    let result = script.invoke("withdraw", &[Value::Int(20)], &ctx).unwrap();
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].key, "balance");
    assert_eq!(result.data[0].value, DataValue::Integer(30));
    assert_eq!(
        result.transfers,
        vec![ScriptTransfer {
            recipient: Address(vec![4, 5]),
            amount: 20,
            asset: None,
        }]
    );

    let err = script.invoke("withdraw", &[Value::Int(80)], &ctx).unwrap_err();
    let Error::Execution(err) = err else {
        panic!("expected an execution error");
    };
    assert_eq!(
        err.runtime(),
        Some(&RuntimeError::Thrown {
            message: "insufficient balance".to_string()
        })
    );
}

#[test]
fn test_invoke_checks_arguments() {
    let arena = Bump::new();
    let script = Engine::default().compile(&arena, WALLET).unwrap();
    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner())).with_invocation(invocation());

    assert!(matches!(
        script.invoke("deposit", &[Value::Int(1)], &ctx),
        Err(Error::Api(_))
    ));
    assert!(matches!(
        script.invoke("withdraw", &[], &ctx),
        Err(Error::Api(_))
    ));
    assert!(matches!(
        script.invoke("withdraw", &[Value::Bool(true)], &ctx),
        Err(Error::Api(_))
    ));
}

#[test]
fn test_dapp_without_verifier() {
    let arena = Bump::new();
    let script = Engine::default().compile(&arena, WALLET).unwrap();
    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    assert!(matches!(script.verify(&ctx), Err(Error::Api(_))));
    assert!(matches!(script.evaluate(&ctx), Err(Error::Api(_))));
}

#[test]
fn test_execution_options_apply() {
    let arena = Bump::new();
    let engine = Engine::new(EngineOptions {
        execution: ExecutionOptions { max_depth: 2 },
        ..EngineOptions::default()
    });
    let script = engine.compile(&arena, "1 + 2 + 3 == 6").unwrap();
    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    let Err(Error::Execution(err)) = script.evaluate(&ctx) else {
        panic!("expected a stack overflow");
    };
    assert!(err.runtime().is_none());
}
