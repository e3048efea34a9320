//! Reads from account data storage.
//!
//! A missing key, or a key holding a different type, reads as `unit`.

use crate::context::DataValue;
use crate::context::convert::data_value;
use crate::evaluator::RuntimeError;
use crate::stdlib::{Builtin, Runtime, SignatureError, address_arg, expect_args, str_arg};
use crate::types::{Type, TypeManager};
use crate::values::Value;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "getInteger",
        since: 1,
        cost: 100,
        typer: |tm, args| read_typer(tm, args, tm.int()),
        eval: |rt, args| read(rt, args, |v| matches!(v, DataValue::Integer(_))),
    },
    Builtin {
        name: "getString",
        since: 1,
        cost: 100,
        typer: |tm, args| read_typer(tm, args, tm.str()),
        eval: |rt, args| read(rt, args, |v| matches!(v, DataValue::String(_))),
    },
    Builtin {
        name: "getBoolean",
        since: 1,
        cost: 100,
        typer: |tm, args| read_typer(tm, args, tm.bool()),
        eval: |rt, args| read(rt, args, |v| matches!(v, DataValue::Boolean(_))),
    },
    Builtin {
        name: "getBinary",
        since: 1,
        cost: 100,
        typer: |tm, args| read_typer(tm, args, tm.bytes()),
        eval: |rt, args| read(rt, args, |v| matches!(v, DataValue::Binary(_))),
    },
];

/// `(Address, String) -> T|Unit`
fn read_typer<'a>(
    tm: &TypeManager<'a>,
    args: &[&'a Type<'a>],
    result: &'a Type<'a>,
) -> Result<&'a Type<'a>, SignatureError> {
    expect_args(args, &[tm.std().address, tm.str()])?;
    Ok(tm.optional(result))
}

fn read<'v>(
    rt: &Runtime<'v, '_>,
    args: &[Value<'v>],
    wanted: fn(&DataValue) -> bool,
) -> Result<Value<'v>, RuntimeError> {
    let address = address_arg(args, 0);
    let key = str_arg(args, 1);
    let value = rt
        .ctx
        .state
        .read(address, key)
        .filter(|v| wanted(v))
        .map_or(Value::Unit, |v| data_value(rt.arena, &v));
    tracing::trace!(key, found = !value.is_unit(), "State read");
    Ok(value)
}
