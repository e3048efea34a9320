/*
 * Expressions evaluated against the shared context: height 100, running as
 * the owner account, validating a transfer of 5.
 */

#[macro_use]
mod cases;

test_case! {
    name: integer_arithmetic,
    input: "(1 + 2) * 3 - 4",
    value: "5",
}

test_case! {
    name: division_rounds_down,
    input: "[-7 / 2, 7 / -2, -7 % 2]",
    value: "[-4, -4, 1]",
}

test_case! {
    name: division_by_zero,
    input: "1 / (height - 100)",
    error: "R004",
}

test_case! {
    name: overflow_is_an_error,
    input: "9223372036854775807 + 1",
    error: "R005",
}

test_case! {
    name: string_concatenation,
    input: r#""ri" + "dge" ++ "!""#,
    value: r#""ridge!""#,
}

test_case! {
    name: list_concatenation_and_append,
    input: "[1, 2] ++ [3] :+ 4",
    value: "[1, 2, 3, 4]",
}

test_case! {
    name: list_index,
    input: "[10, 20, 30][1]",
    value: "20",
}

test_case! {
    name: list_index_out_of_bounds,
    input: "[10, 20, 30][3]",
    error: "R006",
}

test_case! {
    name: bytes_literals_agree,
    input: "base16'010203' == base58'Ldp' && base64'AQID' == base58'Ldp'",
    value: "true",
}

test_case! {
    name: and_short_circuits,
    input: r#"height < 50 && throw("unreachable")"#,
    value: "false",
}

test_case! {
    name: or_short_circuits,
    input: r#"height > 50 || throw("unreachable")"#,
    value: "true",
}

test_case! {
    name: if_runs_one_branch,
    input: r#"if height == 100 then "now" else throw("later")"#,
    value: r#""now""#,
}

test_case! {
    name: block_scoped_function,
    input: "{ func double(n: Int) = n * 2; double(height) }",
    value: "200",
}

test_case! {
    name: fold_with_named_combiner,
    input: "{ func add(acc: Int, e: Int) = acc + e; FOLD<3>([1, 2, 3, 4], 10, add) }",
    value: "16",
}

test_case! {
    name: fold_over_short_list_at_runtime,
    input: r#"FOLD<2>(if height > 0 then [0] else [1, 2], 0, (a, e) => a + e)"#,
    error: "R002",
}

test_case! {
    name: fold_builds_a_list,
    input: "FOLD<3>([1, 2, 3], [0], (acc, e) => acc :+ (e * e))",
    value: "[0, 1, 4, 9]",
}

test_case! {
    name: value_or_else_on_absent_key,
    input: r#"valueOrElse(getInteger(this, "missing"), 42)"#,
    value: "42",
}

test_case! {
    name: is_defined,
    input: r#"[isDefined(getInteger(this, "count")), isDefined(getBoolean(this, "count"))]"#,
    value: "[true, false]",
}

test_case! {
    name: transaction_fields,
    input: "match tx { case t: TransferTransaction => t.amount + t.fee; case _ => 0 }",
    value: "100005",
}

test_case! {
    name: string_builtins,
    input: r#"[size("ridge"), valueOrElse(parseInt("4x"), -1), size(take("ridge", 3))]"#,
    value: "[5, -1, 3]",
}

test_case! {
    name: type_mismatch,
    input: r#"1 + "one""#,
    error: "E001",
}

test_case! {
    name: undefined_variable,
    input: "x + 1",
    error: "E002",
}

test_case! {
    name: shadowing_a_global,
    input: "{ let height = 1; height }",
    error: "E003",
}

test_case! {
    name: non_exhaustive_match,
    input: r#"match getInteger(this, "count") { case a: Int => a }"#,
    error: "E005",
}

test_case! {
    name: parse_error,
    input: "1 +",
    error: "P001",
}

test_case! {
    name: expression_script_allows,
    input: r#"height >= 100 && isDefined(getInteger(this, "count"))"#,
    allowed: true,
}

test_case! {
    name: expression_script_denies,
    input: r#"getString(this, "name") == "other""#,
    allowed: false,
}

#[test]
fn deep_nesting_is_a_compile_error() {
    let source = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let error = cases::eval(&source).expect_err("expected a nesting error");
    pretty_assertions::assert_eq!(cases::code(&error).as_deref(), Some("P004"));
    pretty_assertions::assert_eq!(
        cases::eval("((((1))))").map_err(cases::describe),
        Ok("1".to_string())
    );
}

test_case! {
    name: smallest_integer_literal,
    input: "-9223372036854775808 + 1",
    value: "-9223372036854775807",
}
