use crate::evaluator::RuntimeError;
use crate::stdlib::{Builtin, SignatureError, arity, expect_args, list_arg, mismatch};
use crate::types::{Type, TypeManager, is_assignable};
use crate::values::Value;

pub(super) const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "containsElement",
        since: 4,
        cost: 5,
        typer: |tm, args| {
            arity(args, 2)?;
            let Type::List(elem) = args[0] else {
                return Err(mismatch(0, "List", args[0]));
            };
            if is_assignable(args[1], elem) || is_assignable(elem, args[1]) {
                Ok(tm.bool())
            } else {
                Err(mismatch(1, elem, args[1]))
            }
        },
        eval: |_, args| Ok(Value::Bool(list_arg(args, 0).contains(&args[1]))),
    },
    Builtin {
        name: "min",
        since: 4,
        cost: 3,
        typer: int_list_typer,
        eval: |_, args| extremum("min", args, false),
    },
    Builtin {
        name: "max",
        since: 4,
        cost: 3,
        typer: int_list_typer,
        eval: |_, args| extremum("max", args, true),
    },
];

/// `List[Int] -> Int`
fn int_list_typer<'a>(
    tm: &TypeManager<'a>,
    args: &[&'a Type<'a>],
) -> Result<&'a Type<'a>, SignatureError> {
    expect_args(args, &[tm.list(tm.int())])?;
    Ok(tm.int())
}

fn extremum<'v>(function: &str, args: &[Value<'v>], max: bool) -> Result<Value<'v>, RuntimeError> {
    let ints = list_arg(args, 0).iter().filter_map(Value::as_int);
    let result = if max { ints.max() } else { ints.min() };
    result.map(Value::Int).ok_or_else(|| RuntimeError::InvalidArgument {
        function: function.to_string(),
        message: "list is empty".to_string(),
    })
}
