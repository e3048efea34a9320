/*
 * DApp scripts: callables, verifiers and the rules on their layout.
 */

#[macro_use]
mod cases;

use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;
use ridge::context::DataValue;
use ridge::{ContentType, Error, RuntimeError, ScriptTransfer, Value, render_error_to_string_no_color};

const REGISTRY: &str = indoc! {r#"
    {-# STDLIB_VERSION 5 #-}
    {-# CONTENT_TYPE DAPP #-}
    {-# SCRIPT_TYPE ACCOUNT #-}

    let fee = 1

    func owned(key: String) = "owner_" + key

    @Callable(i)
    func register(name: String) = {
        let key = owned(name)
        if isDefined(getString(this, key)) then throw("already registered")
        else ScriptResult(
            WriteSet([DataEntry(key, toBase58String(i.caller.bytes))]),
            TransferSet([ScriptTransfer(i.caller, fee, unit)])
        )
    }

    @Callable(i)
    func reset(names: List[String]) = WriteSet(
        FOLD<3>(names, [], (acc, n) => acc :+ DataEntry(owned(n), ""))
    )

    @Verifier(t)
    func verify() = t.fee <= 100000 && height > 0
"#};

#[test]
fn dapp_layout() {
    let arena = Bump::new();
    let script = cases::ENGINE.compile(&arena, REGISTRY).unwrap();
    assert_eq!(script.directives().content_type, ContentType::DApp);
    assert_eq!(
        script.callables().collect::<Vec<_>>(),
        vec!["register", "reset"]
    );
    assert!(script.result_type().is_none());
    let complexity = script.complexity();
    assert!(complexity.verifier.is_some());
    assert_eq!(complexity.callables.len(), 2);
    assert!(complexity.callables.iter().all(|(_, cost)| *cost > complexity.globals));
}

#[test]
fn callable_returns_actions() {
    let arena = Bump::new();
    let name = Value::str(&arena, "alice");
    let result = cases::invoke(REGISTRY, "register", &[name]).unwrap();
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].key, "owner_alice");
    assert_eq!(
        result.data[0].value,
        DataValue::String(cases::caller().to_string())
    );
    assert_eq!(
        result.transfers,
        vec![ScriptTransfer {
            recipient: cases::caller(),
            amount: 1,
            asset: None,
        }]
    );
}

#[test]
fn callable_folds_its_argument() {
    let arena = Bump::new();
    let names = Value::list(
        &arena,
        &[
            Value::str(&arena, "a"),
            Value::str(&arena, "b"),
            Value::str(&arena, "c"),
        ],
    );
    let result = cases::invoke(REGISTRY, "reset", &[names]).unwrap();
    let keys: Vec<&str> = result.data.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["owner_a", "owner_b", "owner_c"]);

    let short = Value::list(&arena, &[Value::str(&arena, "a")]);
    let Err(Error::Execution(err)) = cases::invoke(REGISTRY, "reset", &[short]) else {
        panic!("expected a fold bounds violation");
    };
    assert!(matches!(
        err.runtime(),
        Some(RuntimeError::FoldBoundsViolation { bound: 3, len: 1 })
    ));
}

#[test]
fn thrown_message_is_reported() {
    let source = REGISTRY.replace("isDefined(getString(this, key))", "true");
    let arena = Bump::new();
    let name = Value::str(&arena, "bob");
    let err = cases::invoke(&source, "register", &[name]).unwrap_err();
    assert_eq!(cases::code(&err).as_deref(), Some("R001"));
    let rendered = render_error_to_string_no_color(&err);
    assert!(rendered.contains("already registered"));
}

#[test]
fn verifier_checks_the_transaction() {
    assert_eq!(cases::verify(REGISTRY).map_err(cases::describe), Ok(true));
    let strict = REGISTRY.replace("t.fee <= 100000", "t.fee < 100000");
    assert_eq!(cases::verify(&strict).map_err(cases::describe), Ok(false));
}

#[test]
fn unknown_callable_is_an_api_error() {
    let err = cases::invoke(REGISTRY, "transfer", &[]).unwrap_err();
    assert!(matches!(err, Error::Api(_)));
    assert!(err.diagnostic().is_none());
}

#[test]
fn declarations_must_precede_annotated_functions() {
    let source = format!("{}\nlet late = 1\n", REGISTRY);
    let err = cases::verify(&source).unwrap_err();
    assert_eq!(cases::code(&err).as_deref(), Some("E008"));
}

#[test]
fn only_one_verifier() {
    let source = format!("{}\n@Verifier(u)\nfunc again() = true\n", REGISTRY);
    let err = cases::verify(&source).unwrap_err();
    assert_eq!(cases::code(&err).as_deref(), Some("E007"));
}

#[test]
fn dapp_cannot_end_with_an_expression() {
    let source = format!("{}\nheight > 0\n", REGISTRY);
    let err = cases::verify(&source).unwrap_err();
    assert_eq!(cases::code(&err).as_deref(), Some("E012"));
}
