//! Strings, byte vectors, hashing and encodings.
//!
//! String lengths and offsets count characters, byte vector ones count bytes.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::evaluator::RuntimeError;
use crate::stdlib::{
    Builtin, Runtime, SignatureError, arity, bytes_arg, expect_arg, expect_args, int_arg,
    mismatch, str_arg,
};
use crate::syntax::bytes_literal::{decode_base58, encode_base58};
use crate::types::{Type, TypeManager};
use crate::values::Value;

type Blake2b256 = Blake2b<U32>;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "size",
        since: 1,
        cost: 1,
        typer: |tm, args| {
            arity(args, 1)?;
            match args[0] {
                Type::List(_) | Type::Str | Type::Bytes => Ok(tm.int()),
                other => Err(mismatch(0, "List, String or ByteVector", other)),
            }
        },
        eval: |_, args| {
            let len = match args[0] {
                Value::List(items) => items.len(),
                Value::Str(s) => s.chars().count(),
                Value::Bytes(b) => b.len(),
                other => unreachable!("size() type-checked, got {}", other),
            };
            Ok(Value::Int(len as i64))
        },
    },
    Builtin {
        name: "toString",
        since: 1,
        cost: 1,
        typer: |tm, args| {
            arity(args, 1)?;
            expect_arg(args, 0, tm.union(&[tm.int(), tm.bool()]))?;
            Ok(tm.str())
        },
        eval: |rt, args| Ok(Value::str(rt.arena, &args[0].to_string())),
    },
    Builtin {
        name: "parseInt",
        since: 3,
        cost: 20,
        typer: |tm, args| {
            expect_args(args, &[tm.str()])?;
            Ok(tm.optional(tm.int()))
        },
        eval: |_, args| {
            Ok(str_arg(args, 0)
                .parse::<i64>()
                .map_or(Value::Unit, Value::Int))
        },
    },
    Builtin {
        name: "take",
        since: 1,
        cost: 1,
        typer: slice_typer,
        eval: |rt, args| Ok(slice(rt, args, |len, n| (0, n.min(len)))),
    },
    Builtin {
        name: "drop",
        since: 1,
        cost: 1,
        typer: slice_typer,
        eval: |rt, args| Ok(slice(rt, args, |len, n| (n.min(len), len))),
    },
    Builtin {
        name: "contains",
        since: 3,
        cost: 3,
        typer: |tm, args| {
            expect_args(args, &[tm.str(), tm.str()])?;
            Ok(tm.bool())
        },
        eval: |_, args| Ok(Value::Bool(str_arg(args, 0).contains(str_arg(args, 1)))),
    },
    Builtin {
        name: "toBytes",
        since: 1,
        cost: 1,
        typer: |tm, args| {
            arity(args, 1)?;
            expect_arg(args, 0, tm.union(&[tm.int(), tm.bool(), tm.str()]))?;
            Ok(tm.bytes())
        },
        eval: |rt, args| {
            let bytes = match args[0] {
                Value::Int(i) => Value::bytes(rt.arena, &i.to_be_bytes()),
                Value::Bool(b) => Value::bytes(rt.arena, &[b as u8]),
                Value::Str(s) => Value::bytes(rt.arena, s.as_bytes()),
                other => unreachable!("toBytes() type-checked, got {}", other),
            };
            Ok(bytes)
        },
    },
    Builtin {
        name: "blake2b256",
        since: 1,
        cost: 200,
        typer: |tm, args| {
            expect_args(args, &[tm.bytes()])?;
            Ok(tm.bytes())
        },
        eval: |rt, args| {
            let digest = Blake2b256::digest(bytes_arg(args, 0));
            Ok(Value::bytes(rt.arena, &digest))
        },
    },
    Builtin {
        name: "toBase58String",
        since: 1,
        cost: 10,
        typer: |tm, args| {
            expect_args(args, &[tm.bytes()])?;
            Ok(tm.str())
        },
        eval: |rt, args| Ok(Value::str(rt.arena, &encode_base58(bytes_arg(args, 0)))),
    },
    Builtin {
        name: "fromBase58String",
        since: 1,
        cost: 10,
        typer: |tm, args| {
            expect_args(args, &[tm.str()])?;
            Ok(tm.bytes())
        },
        eval: |rt, args| {
            let bytes = decode_base58(str_arg(args, 0)).map_err(|e| {
                RuntimeError::InvalidArgument {
                    function: "fromBase58String".to_string(),
                    message: e.to_string(),
                }
            })?;
            Ok(Value::bytes(rt.arena, &bytes))
        },
    },
];

/// `(String, Int) -> String` or `(ByteVector, Int) -> ByteVector`
fn slice_typer<'a>(
    tm: &TypeManager<'a>,
    args: &[&'a Type<'a>],
) -> Result<&'a Type<'a>, SignatureError> {
    arity(args, 2)?;
    expect_arg(args, 1, tm.int())?;
    match args[0] {
        Type::Str | Type::Bytes => Ok(args[0]),
        other => Err(mismatch(0, "String or ByteVector", other)),
    }
}

/// Apply `range(len, n)` to the first argument. Negative counts act as zero.
fn slice<'v>(
    rt: &Runtime<'v, '_>,
    args: &[Value<'v>],
    range: fn(usize, usize) -> (usize, usize),
) -> Value<'v> {
    let n = usize::try_from(int_arg(args, 1)).unwrap_or(0);
    match args[0] {
        Value::Str(s) => {
            let (start, end) = range(s.chars().count(), n);
            let taken: String = s.chars().skip(start).take(end - start).collect();
            Value::str(rt.arena, &taken)
        }
        Value::Bytes(b) => {
            let (start, end) = range(b.len(), n);
            Value::Bytes(&b[start..end])
        }
        other => unreachable!("take()/drop() type-checked, got {}", other),
    }
}
