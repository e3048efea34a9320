use std::cell::Cell;

use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::actions::ScriptResult;
use crate::analyzer::{TypedScript, analyze, analyze_expression};
use crate::api::ExecutionOptions;
use crate::context::{
    Address, Bytes, DataValue, ExecutionContext, InMemoryState, Invocation, LedgerState, This,
    Transaction, TransferTx, TxHeader,
};
use crate::directives::{DirectiveSet, validate};
use crate::evaluator::{
    ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError, eval_callable,
    eval_expression, eval_verifier,
};
use crate::parser::{parse, parse_expression, parse_header};
use crate::types::TypeManager;
use crate::values::Value;

fn owner() -> Address {
    Address(vec![1, 2, 3])
}

fn transfer(fee: i64) -> Transaction {
    Transaction::Transfer(TransferTx {
        header: TxHeader {
            fee,
            sender: Address(vec![9]),
            ..TxHeader::default()
        },
        recipient: owner(),
        amount: 100,
        asset_id: None,
        fee_asset_id: None,
        attachment: Bytes::default(),
    })
}

fn invocation() -> Invocation {
    Invocation {
        caller: Address(vec![7, 7]),
        caller_public_key: Bytes::default(),
        payment: None,
        transaction_id: Bytes::default(),
        fee: 5,
        fee_asset_id: None,
    }
}

/// Evaluate a bare expression and print the result.
fn run_with(
    source: &str,
    ctx: &ExecutionContext<'_>,
    options: &ExecutionOptions,
) -> Result<String, ExecutionError> {
    let arena = Bump::new();
    let parsed = parse_expression(&arena, source).unwrap();
    let typed = analyze_expression(TypeManager::new(&arena), parsed, DirectiveSet::default())
        .unwrap_or_else(|e| panic!("{}: {}", source, e));
    let values = Bump::new();
    eval_expression(&values, &typed, ctx, options).map(|v| v.to_string())
}

fn run_in(source: &str, state: &InMemoryState) -> Result<String, ExecutionError> {
    let ctx = ExecutionContext::new(state, This::Account(owner())).with_height(42);
    run_with(source, &ctx, &ExecutionOptions::default())
}

fn run(source: &str) -> String {
    run_in(source, &InMemoryState::new()).unwrap_or_else(|e| panic!("{}: {}", source, e))
}

fn run_err(source: &str) -> ExecutionErrorKind {
    match run_in(source, &InMemoryState::new()) {
        Ok(value) => panic!("expected {} to fail, got {}", source, value),
        Err(e) => e.kind,
    }
}

fn runtime(e: RuntimeError) -> ExecutionErrorKind {
    ExecutionErrorKind::Runtime(e)
}

fn compile<'a>(arena: &'a Bump, source: &'a str) -> TypedScript<'a> {
    let header = parse_header(source).unwrap();
    let directives = validate(&header, source).unwrap();
    let parsed = parse(arena, source).unwrap();
    analyze(TypeManager::new(arena), parsed, directives).unwrap()
}

const DAPP: &str = indoc! {"
    {-# STDLIB_VERSION 5 #-}
    {-# CONTENT_TYPE DAPP #-}
    {-# SCRIPT_TYPE ACCOUNT #-}
"};

#[test]
fn test_arithmetic() {
    assert_eq!(run("1 + 2 * 3"), "7");
    assert_eq!(run("(1 + 2) * 3"), "9");
    assert_eq!(run("-7 / 2"), "-4");
    assert_eq!(run("7 % -3"), "-2");
    assert_eq!(run("-(2 - 5)"), "3");
}

#[test]
fn test_arithmetic_errors() {
    assert_eq!(run_err("1 / 0"), runtime(RuntimeError::DivisionByZero));
    assert_eq!(run_err("5 % (2 - 2)"), runtime(RuntimeError::DivisionByZero));
    assert_eq!(
        run_err("9223372036854775807 + 1"),
        runtime(RuntimeError::ArithmeticOverflow {
            op: "+".to_string()
        })
    );
}

#[test]
fn test_concatenation() {
    assert_eq!(run("\"ab\" + \"cd\""), "\"abcd\"");
    assert_eq!(run("\"ab\" ++ \"cd\""), "\"abcd\"");
    assert_eq!(run("base16'00' ++ base16'01'"), "base58'12'");
    assert_eq!(run("[1] ++ [2, 3]"), "[1, 2, 3]");
    assert_eq!(run("[1, 2] :+ 3"), "[1, 2, 3]");
    assert_eq!(run("[] :+ \"x\""), "[\"x\"]");
}

#[test]
fn test_comparisons() {
    assert_eq!(run("1 < 2 && 2 <= 2 && 3 > 2 && 3 >= 4"), "false");
    assert_eq!(run("\"a\" == \"a\""), "true");
    assert_eq!(run("[1, 2] == [1, 2]"), "true");
    assert_eq!(run("getInteger(this, \"k\") == unit"), "true");
    assert_eq!(run("base16'01' != base16'01'"), "false");
}

#[test]
fn test_indexing() {
    assert_eq!(run("[10, 20, 30][1]"), "20");
    assert_eq!(
        run_err("[1][1]"),
        runtime(RuntimeError::IndexOutOfBounds { index: 1, len: 1 })
    );
    assert_eq!(
        run_err("[1][-1]"),
        runtime(RuntimeError::IndexOutOfBounds { index: -1, len: 1 })
    );
}

#[test]
fn test_boolean_operators_short_circuit() {
    assert_eq!(run("false && throw(\"boom\")"), "false");
    assert_eq!(run("true || throw(\"boom\")"), "true");
    assert_eq!(
        run_err("true && throw(\"boom\")"),
        runtime(RuntimeError::Thrown {
            message: "boom".to_string()
        })
    );
}

#[test]
fn test_if_evaluates_one_branch() {
    assert_eq!(run("if height > 10 then 1 else throw()"), "1");
    assert_eq!(run("if height > 100 then throw() else 2"), "2");
}

#[test]
fn test_unused_let_is_never_evaluated() {
    assert_eq!(run("{ let a = throw(\"never\"); 1 }"), "1");
    assert_eq!(run("{ let a = 1 / 0; let b = 2; b }"), "2");
    assert_eq!(
        run_err("{ let a = throw(\"forced\"); a + 1 }"),
        runtime(RuntimeError::Thrown {
            message: "forced".to_string()
        })
    );
}

/// Counts every storage read made through it.
struct CountingState {
    inner: InMemoryState,
    reads: Cell<usize>,
}

impl LedgerState for CountingState {
    fn read(&self, address: &[u8], key: &str) -> Option<DataValue> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read(address, key)
    }
}

#[test]
fn test_let_runs_once_per_activation() {
    let state = CountingState {
        inner: InMemoryState::new().with(&owner(), "k", DataValue::Integer(7)),
        reads: Cell::new(0),
    };
    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    let options = ExecutionOptions::default();

    let once = r#"{ let v = extract(getInteger(this, "k")); v + v + v }"#;
    assert_eq!(run_with(once, &ctx, &options).unwrap(), "21");
    assert_eq!(state.reads.get(), 1);

    state.reads.set(0);
    let per_call = indoc! {r#"
        {
            func f(n: Int) = { let v = extract(getInteger(this, "k")); v + v + n }
            f(1) + f(2)
        }
    "#};
    assert_eq!(run_with(per_call, &ctx, &options).unwrap(), "31");
    assert_eq!(state.reads.get(), 2);
}

#[test]
fn test_functions_close_over_their_scope() {
    assert_eq!(run("{ let a = 2; func f(x: Int) = x * a; f(3) + f(4) }"), "14");
    assert_eq!(
        run("{ func inc(x: Int) = x + 1; func twice(x: Int) = inc(inc(x)); twice(5) }"),
        "7"
    );
}

#[test]
fn test_match_selects_first_matching_case() {
    let source = indoc! {"
        match getInteger(this, \"k\") {
            case i: Int => i
            case _ => 0
        }
    "};
    assert_eq!(run_in(source, &InMemoryState::new()).unwrap(), "0");

    let state = InMemoryState::new().with(&owner(), "k", DataValue::Integer(5));
    assert_eq!(run_in(source, &state).unwrap(), "5");

    // A value of the wrong type reads as absent.
    let state = InMemoryState::new().with(&owner(), "k", DataValue::String("5".into()));
    assert_eq!(run_in(source, &state).unwrap(), "0");

    let catch_all = indoc! {"
        match getString(this, \"s\") {
            case s: String => size(s)
            case other => -1
        }
    "};
    let state = InMemoryState::new().with(&owner(), "s", DataValue::String("abc".into()));
    assert_eq!(run_in(catch_all, &state).unwrap(), "3");
}

#[test]
fn test_extract() {
    assert_eq!(
        run_err("extract(getInteger(this, \"k\"))"),
        runtime(RuntimeError::Thrown {
            message: "extract() called on unit value".to_string()
        })
    );
    let state = InMemoryState::new().with(&owner(), "k", DataValue::Integer(8));
    assert_eq!(
        run_in("extract(getInteger(this, \"k\"))", &state).unwrap(),
        "8"
    );
}

#[test]
fn test_fold_is_a_strict_left_fold() {
    assert_eq!(run("FOLD<5>([1, 2, 3, 4, 5], 0, (acc, x) => acc + x)"), "15");
    assert_eq!(run("FOLD<3>([1, 2, 3], 0, (acc, x) => acc * 10 + x)"), "123");
    assert_eq!(run("FOLD<3>([1, 2, 3], [], (acc, x) => acc :+ x)"), "[1, 2, 3]");
    assert_eq!(
        run("{ func sum(a: Int, b: Int) = a + b; FOLD<2>([1, 2], 0, sum) }"),
        "3"
    );
}

#[test]
fn test_fold_takes_the_first_n_elements() {
    assert_eq!(run("FOLD<2>([1, 2, 3], 0, (acc, x) => acc + x)"), "3");
    assert_eq!(
        run_err("{ let xs = [1, 2]; FOLD<3>(xs, 0, (a, b) => a + b) }"),
        runtime(RuntimeError::FoldBoundsViolation { bound: 3, len: 2 })
    );
}

#[test]
fn test_globals() {
    assert_eq!(run("height"), "42");
    assert_eq!(run("this.bytes"), "base58'Ldp'");
    assert_eq!(
        run_err("tx.fee > 0"),
        runtime(RuntimeError::MissingContext {
            name: "tx".to_string()
        })
    );

    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner())).with_tx(transfer(7));
    assert_eq!(
        run_with("tx.fee", &ctx, &ExecutionOptions::default()).unwrap(),
        "7"
    );
    assert_eq!(
        run_with(
            "match tx { case t: TransferTransaction => t.amount case _ => 0 }",
            &ctx,
            &ExecutionOptions::default()
        )
        .unwrap(),
        "100"
    );
}

#[test]
fn test_stack_overflow() {
    let state = InMemoryState::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    let options = ExecutionOptions { max_depth: 4 };
    let err = run_with("1 + (1 + (1 + (1 + (1 + 1))))", &ctx, &options).unwrap_err();
    assert!(matches!(
        err.kind,
        ExecutionErrorKind::ResourceExceeded(ResourceExceededError::StackOverflow {
            max_depth: 4,
            ..
        })
    ));
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("R100"));
}

#[test]
fn test_error_carries_span() {
    let err = run_in("1 + 10 / 0", &InMemoryState::new()).unwrap_err();
    assert_eq!(err.span.clone().map(|s| s.0), Some(4..10));
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("R004"));
}

#[test]
fn test_top_level_declarations() {
    let arena = Bump::new();
    let source = indoc! {"
        let limit = 10
        let unused = throw(\"unused\")
        func below(x: Int) = x < limit
        below(height)
    "};
    let typed = compile(&arena, source);
    let state = InMemoryState::new();
    let values = Bump::new();
    let ctx = ExecutionContext::new(&state, This::Account(owner())).with_height(3);
    assert_eq!(
        eval_expression(&values, &typed, &ctx, &ExecutionOptions::default()),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_callable() {
    let arena = Bump::new();
    let source = format!(
        "{}{}",
        DAPP,
        indoc! {"
            let prefix = \"deposit_\"

            @Callable(i)
            func deposit(amount: Int) = WriteSet([
                DataEntry(prefix + toBase58String(i.caller.bytes), amount)
            ])
        "}
    );
    let source: &str = arena.alloc_str(&source);
    let typed = compile(&arena, source);
    let callable = typed.callable("deposit").unwrap();

    let state = InMemoryState::new();
    let values = Bump::new();
    let options = ExecutionOptions::default();

    let ctx = ExecutionContext::new(&state, This::Account(owner()));
    assert_eq!(
        eval_callable(&values, &typed, callable, &[Value::Int(7)], &ctx, &options)
            .unwrap_err()
            .kind,
        runtime(RuntimeError::MissingContext {
            name: "invocation".to_string()
        })
    );

    let ctx = ctx.with_invocation(invocation());
    let value =
        eval_callable(&values, &typed, callable, &[Value::Int(7)], &ctx, &options).unwrap();
    let result = ScriptResult::from_value(value).unwrap();
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].key, "deposit_Y2");
    assert_eq!(result.data[0].value, DataValue::Integer(7));
    assert!(result.transfers.is_empty());
}

#[test]
fn test_verifier() {
    let arena = Bump::new();
    let source = format!(
        "{}{}",
        DAPP,
        indoc! {"
            @Verifier(t)
            func verify() = t.fee >= 5
        "}
    );
    let source: &str = arena.alloc_str(&source);
    let typed = compile(&arena, source);
    let verifier = typed.verifier.as_ref().unwrap();

    let state = InMemoryState::new();
    let values = Bump::new();
    let options = ExecutionOptions::default();
    let ctx = ExecutionContext::new(&state, This::Account(owner()));

    assert!(matches!(
        eval_verifier(&values, &typed, verifier, &ctx, &options),
        Err(ExecutionError {
            kind: ExecutionErrorKind::Runtime(RuntimeError::MissingContext { .. }),
            ..
        })
    ));
    let cheap = ctx.clone().with_tx(transfer(1));
    assert_eq!(
        eval_verifier(&values, &typed, verifier, &cheap, &options),
        Ok(Value::Bool(false))
    );
    let paid = ctx.with_tx(transfer(5));
    assert_eq!(
        eval_verifier(&values, &typed, verifier, &paid, &options),
        Ok(Value::Bool(true))
    );
}
