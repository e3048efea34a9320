//! Constructors for the struct types callables build their results from.

use crate::stdlib::{Builtin, expect_args};
use crate::values::Value;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "Address",
        since: 1,
        cost: 1,
        typer: |tm, args| {
            expect_args(args, &[tm.bytes()])?;
            Ok(tm.std().address)
        },
        eval: |rt, args| Ok(Value::structure(rt.arena, "Address", &[("bytes", args[0])])),
    },
    Builtin {
        name: "DataEntry",
        since: 1,
        cost: 2,
        typer: |tm, args| {
            expect_args(args, &[tm.str(), tm.std().data_value])?;
            Ok(tm.std().data_entry)
        },
        eval: |rt, args| {
            Ok(Value::structure(
                rt.arena,
                "DataEntry",
                &[("key", args[0]), ("value", args[1])],
            ))
        },
    },
    Builtin {
        name: "ScriptTransfer",
        since: 3,
        cost: 3,
        typer: |tm, args| {
            expect_args(
                args,
                &[tm.std().address, tm.int(), tm.optional(tm.bytes())],
            )?;
            Ok(tm.std().script_transfer)
        },
        eval: |rt, args| {
            Ok(Value::structure(
                rt.arena,
                "ScriptTransfer",
                &[("recipient", args[0]), ("amount", args[1]), ("asset", args[2])],
            ))
        },
    },
    Builtin {
        name: "WriteSet",
        since: 3,
        cost: 1,
        typer: |tm, args| {
            expect_args(args, &[tm.list(tm.std().data_entry)])?;
            Ok(tm.std().write_set)
        },
        eval: |rt, args| Ok(Value::structure(rt.arena, "WriteSet", &[("data", args[0])])),
    },
    Builtin {
        name: "TransferSet",
        since: 3,
        cost: 1,
        typer: |tm, args| {
            expect_args(args, &[tm.list(tm.std().script_transfer)])?;
            Ok(tm.std().transfer_set)
        },
        eval: |rt, args| {
            Ok(Value::structure(
                rt.arena,
                "TransferSet",
                &[("transfers", args[0])],
            ))
        },
    },
    Builtin {
        name: "ScriptResult",
        since: 3,
        cost: 1,
        typer: |tm, args| {
            expect_args(args, &[tm.std().write_set, tm.std().transfer_set])?;
            Ok(tm.std().script_result)
        },
        eval: |rt, args| {
            Ok(Value::structure(
                rt.arena,
                "ScriptResult",
                &[("writeSet", args[0]), ("transferSet", args[1])],
            ))
        },
    },
];
