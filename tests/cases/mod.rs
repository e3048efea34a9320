//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use bumpalo::Bump;
use once_cell::sync::Lazy;
use ridge::context::{
    Address, DataValue, ExecutionContext, InMemoryState, Invocation, This, Transaction, TransferTx,
    TxHeader,
};
use ridge::{Engine, Error, ScriptResult, Value, render_error_to_string_no_color};

pub static ENGINE: Lazy<Engine> = Lazy::new(Engine::default);

pub fn owner() -> Address {
    Address(vec![1, 2, 3])
}

pub fn caller() -> Address {
    Address(vec![9, 9])
}

/// The owner account stores `count = 7` and `name = "ridge"`.
pub static STATE: Lazy<InMemoryState> = Lazy::new(|| {
    InMemoryState::new()
        .with(&owner(), "count", DataValue::Integer(7))
        .with(&owner(), "name", DataValue::String("ridge".to_string()))
});

pub fn transfer(amount: i64) -> Transaction {
    Transaction::Transfer(TransferTx {
        header: TxHeader {
            fee: 100_000,
            sender: owner(),
            ..TxHeader::default()
        },
        recipient: caller(),
        amount,
        asset_id: None,
        fee_asset_id: None,
        attachment: Default::default(),
    })
}

/// Height 100, running as the owner account, validating a transfer of 5.
pub fn context() -> ExecutionContext<'static> {
    ExecutionContext::new(&*STATE, This::Account(owner()))
        .with_height(100)
        .with_tx(transfer(5))
        .with_invocation(Invocation {
            caller: caller(),
            caller_public_key: Default::default(),
            payment: None,
            transaction_id: Default::default(),
            fee: 500_000,
            fee_asset_id: None,
        })
}

/// Compile a bare expression and print its value.
pub fn eval(source: &str) -> Result<String, Error> {
    let arena = Bump::new();
    let source = arena.alloc_str(source);
    let script = ENGINE.compile_expression(&arena, source)?;
    let values = Bump::new();
    let value = script.evaluate_value(&values, &context())?;
    Ok(value.to_string())
}

/// Compile a script and run it as a verifier.
pub fn verify(source: &str) -> Result<bool, Error> {
    let arena = Bump::new();
    let source = arena.alloc_str(source);
    ENGINE.compile(&arena, source)?.verify(&context())
}

/// Compile a DApp and invoke one of its callables.
pub fn invoke(source: &str, name: &str, args: &[Value<'_>]) -> Result<ScriptResult, Error> {
    let arena = Bump::new();
    let source = arena.alloc_str(source);
    ENGINE.compile(&arena, source)?.invoke(name, args, &context())
}

/// The diagnostic code of an error, if it has one.
pub fn code(error: &Error) -> Option<String> {
    error.diagnostic().and_then(|d| d.code)
}

pub fn describe(error: Error) -> String {
    render_error_to_string_no_color(&error)
}

macro_rules! test_case {
    (name: $name:ident, input: $input:expr, value: $value:expr $(,)?) => {
        #[test]
        fn $name() {
            pretty_assertions::assert_eq!(
                cases::eval($input).map_err(cases::describe),
                Ok($value.to_string())
            );
        }
    };
    (name: $name:ident, input: $input:expr, allowed: $allowed:expr $(,)?) => {
        #[test]
        fn $name() {
            pretty_assertions::assert_eq!(
                cases::verify($input).map_err(cases::describe),
                Ok($allowed)
            );
        }
    };
    (name: $name:ident, input: $input:expr, error: $code:expr $(,)?) => {
        #[test]
        fn $name() {
            let error = cases::eval($input).expect_err("expected an error");
            pretty_assertions::assert_eq!(cases::code(&error).as_deref(), Some($code));
        }
    };
}
