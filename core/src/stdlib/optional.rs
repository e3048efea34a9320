//! `T|Unit` helpers and `throw`.

use crate::evaluator::RuntimeError;
use crate::stdlib::{Builtin, SignatureError, arity, expect_arg, str_arg};
use crate::types::{Type, TypeManager};
use crate::values::Value;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "extract",
        since: 1,
        cost: 13,
        typer: unwrap_typer,
        eval: |_, args| unwrap_or_throw(args[0], "extract() called on unit value"),
    },
    Builtin {
        name: "value",
        since: 4,
        cost: 13,
        typer: unwrap_typer,
        eval: |_, args| unwrap_or_throw(args[0], "value() called on unit value"),
    },
    Builtin {
        name: "valueOrErrorMessage",
        since: 4,
        cost: 13,
        typer: |tm, args| {
            arity(args, 2)?;
            expect_arg(args, 1, tm.str())?;
            Ok(tm.without(args[0], &[tm.unit()]))
        },
        eval: |_, args| unwrap_or_throw(args[0], str_arg(args, 1)),
    },
    Builtin {
        name: "valueOrElse",
        since: 4,
        cost: 2,
        typer: |tm, args| {
            arity(args, 2)?;
            let present = tm.without(args[0], &[tm.unit()]);
            Ok(tm.join(present, args[1]))
        },
        eval: |_, args| Ok(if args[0].is_unit() { args[1] } else { args[0] }),
    },
    Builtin {
        name: "isDefined",
        since: 1,
        cost: 35,
        typer: |tm, args| {
            arity(args, 1)?;
            Ok(tm.bool())
        },
        eval: |_, args| Ok(Value::Bool(!args[0].is_unit())),
    },
    Builtin {
        name: "throw",
        since: 1,
        cost: 1,
        typer: throw_typer,
        eval: |_, args| {
            let message = match args.first() {
                Some(Value::Str(s)) => s.to_string(),
                _ => "Explicit script termination".to_string(),
            };
            Err(RuntimeError::Thrown { message })
        },
    },
];

/// `T|Unit -> T`
fn unwrap_typer<'a>(
    tm: &TypeManager<'a>,
    args: &[&'a Type<'a>],
) -> Result<&'a Type<'a>, SignatureError> {
    arity(args, 1)?;
    Ok(tm.without(args[0], &[tm.unit()]))
}

/// `throw()` or `throw(String)`, both of type `Nothing`.
fn throw_typer<'a>(
    tm: &TypeManager<'a>,
    args: &[&'a Type<'a>],
) -> Result<&'a Type<'a>, SignatureError> {
    match args.len() {
        0 => {}
        1 => expect_arg(args, 0, tm.str())?,
        found => {
            return Err(SignatureError::ArgCount {
                expected: "0 or 1".to_string(),
                found,
            });
        }
    }
    Ok(tm.nothing())
}

fn unwrap_or_throw<'v>(value: Value<'v>, message: &str) -> Result<Value<'v>, RuntimeError> {
    if value.is_unit() {
        Err(RuntimeError::Thrown {
            message: message.to_string(),
        })
    } else {
        Ok(value)
    }
}
