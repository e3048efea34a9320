/*
 * End-to-end scenarios: each script goes through the whole pipeline
 * (directives, parsing, type checking, cost estimation and execution).
 */

#[macro_use]
mod cases;

use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;
use ridge::{CompileError, Error, RuntimeError, Value};
use ridge_core::analyzer::TypeErrorKind;
use ridge_core::cost::CostErrorKind;
use ridge_core::directives::DirectiveErrorKind;

fn compile_error(source: &str) -> CompileError {
    let arena = Bump::new();
    let source = arena.alloc_str(source);
    match cases::ENGINE.compile(&arena, source) {
        Err(Error::Compilation(e)) => e,
        Err(other) => panic!("expected a compile error, got {}", other),
        Ok(_) => panic!("expected a compile error for {:?}", source),
    }
}

#[test]
fn duplicate_binding_is_rejected() {
    let CompileError::Type(err) = compile_error("let a = 1; let a = 2; a") else {
        panic!("expected a type error");
    };
    assert_eq!(
        err.kind,
        TypeErrorKind::DuplicateBinding {
            name: "a".to_string()
        }
    );
}

#[test]
fn dapp_cannot_be_attached_to_an_asset() {
    let CompileError::Directive(err) =
        compile_error("{-#CONTENT_TYPE DAPP#-}{-#SCRIPT_TYPE ASSET#-}")
    else {
        panic!("expected a directive error");
    };
    assert!(matches!(
        err.kind,
        DirectiveErrorKind::IncompatibleDirectives { .. }
    ));
}

test_case! {
    name: fold_sums_a_list,
    input: "FOLD<5>([1,2,3,4,5], 0, (acc,e)=>acc+e)",
    value: "15",
}

test_case! {
    name: match_on_absent_key_falls_through,
    input: r#"match (getInteger(this, "k")) { case a: Int => a; case _ => 0 }"#,
    value: "0",
}

test_case! {
    name: match_on_present_key_narrows,
    input: r#"match (getInteger(this, "count")) { case a: Int => a; case _ => 0 }"#,
    value: "7",
}

const PAYOUT: &str = indoc! {"
    {-# STDLIB_VERSION 5 #-}
    {-# CONTENT_TYPE DAPP #-}
    {-# SCRIPT_TYPE ACCOUNT #-}

    @Callable(i)
    func payout(n: Int) = {
        let t = ScriptTransfer(i.caller, n, unit)
        if n > 10 then TransferSet([t, t, t, t, t, t, t, t, t, t, t])
        else TransferSet([t])
    }
"};

#[test]
fn too_many_transfers_abort_the_invocation() {
    let err = cases::invoke(PAYOUT, "payout", &[Value::Int(11)]).unwrap_err();
    let Error::Execution(err) = err else {
        panic!("expected an execution error");
    };
    assert!(matches!(
        err.runtime(),
        Some(RuntimeError::ActionLimitExceeded {
            count: 11,
            limit: 10,
            ..
        })
    ));

    let result = cases::invoke(PAYOUT, "payout", &[Value::Int(3)]).unwrap();
    assert_eq!(result.transfers.len(), 1);
    assert_eq!(result.transfers[0].amount, 3);
    assert_eq!(result.transfers[0].recipient, cases::caller());
}

test_case! {
    name: unused_binding_never_runs,
    input: r#"{ let boom = throw("never"); 5 }"#,
    value: "5",
}

test_case! {
    name: used_binding_runs,
    input: "{ let boom = 1 / 0; boom + 1 }",
    error: "R004",
}

test_case! {
    name: extract_of_absent_value_throws,
    input: r#"extract(getString(this, "missing"))"#,
    error: "R001",
}

test_case! {
    name: extract_of_present_value,
    input: r#"extract(getString(this, "name"))"#,
    value: r#""ridge""#,
}

#[test]
fn compilation_is_deterministic() {
    let source = indoc! {r#"
        let limit = valueOrElse(getInteger(this, "limit"), 10)
        func within(n: Int) = n <= limit
        match tx {
            case t: TransferTransaction => within(t.amount)
            case _ => false
        }
    "#};
    let first_arena = Bump::new();
    let second_arena = Bump::new();
    let first = cases::ENGINE.compile(&first_arena, source).unwrap();
    let second = cases::ENGINE.compile(&second_arena, source).unwrap();
    assert_eq!(first.complexity(), second.complexity());
    assert_eq!(
        first.result_type().map(|t| t.to_string()),
        second.result_type().map(|t| t.to_string())
    );
    assert_eq!(cases::verify(source).map_err(cases::describe), Ok(true));
}

#[test]
fn unbounded_fold_never_runs() {
    let CompileError::Cost(err) =
        compile_error(r#"let n = 3; FOLD<n>([1, 2, 3], 0, (a, b) => a + b) == 6"#)
    else {
        panic!("expected a cost error");
    };
    assert!(matches!(err.kind, CostErrorKind::UnboundedIteration { .. }));
}

#[test]
fn short_literal_list_is_rejected_before_running() {
    let CompileError::Cost(err) = compile_error("FOLD<5>([1, 2], 0, (a, b) => a + b) == 3") else {
        panic!("expected a cost error");
    };
    assert_eq!(err.kind, CostErrorKind::FoldBoundsViolation { bound: 5, len: 2 });
}
