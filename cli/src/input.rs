//! JSON inputs of the command line: the execution context file and callable
//! arguments.

use bumpalo::Bump;
use miette::Diagnostic;
use ridge::{Type, Value};
use ridge_core::context::{Address, ExecutionContext, InMemoryState, Invocation, This, Transaction};
use ridge_core::syntax::bytes_literal::decode_base58;
use serde::Deserialize;
use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("invalid JSON in {what}")]
    #[diagnostic(code(ridge::input::json))]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("callable arguments must be a JSON array")]
    #[diagnostic(code(ridge::input::args), help("for example: --args '[10, \"key\"]'"))]
    NotAnArray,

    #[error("callable '{name}' expects {expected} argument(s), got {got}")]
    #[diagnostic(code(ridge::input::arity))]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("argument '{param}' should be {expected}, got {got}")]
    #[diagnostic(
        code(ridge::input::argument),
        help("ByteVector arguments are base58 strings")
    )]
    Argument {
        param: String,
        expected: String,
        got: String,
    },
}

/// Contents of a `--context` file. Every field is optional.
///
/// ```json
/// {
///   "height": 120,
///   "this": { "account": "3N1" },
///   "tx": { "type": "Transfer", "fee": 100000, "recipient": "3N2", "amount": 5 },
///   "state": { "3N1": { "balance": { "type": "integer", "value": 50 } } }
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextFile {
    #[serde(default)]
    pub height: i64,
    #[serde(default = "default_this")]
    pub this: This,
    #[serde(default)]
    pub tx: Option<Transaction>,
    #[serde(default)]
    pub invocation: Option<Invocation>,
    #[serde(default)]
    pub state: InMemoryState,
}

fn default_this() -> This {
    This::Account(Address::default())
}

impl Default for ContextFile {
    fn default() -> Self {
        Self {
            height: 0,
            this: default_this(),
            tx: None,
            invocation: None,
            state: InMemoryState::new(),
        }
    }
}

impl ContextFile {
    pub fn parse(text: &str) -> Result<Self, InputError> {
        serde_json::from_str(text).map_err(|source| InputError::Json {
            what: "the context file",
            source,
        })
    }

    pub fn context(&self) -> ExecutionContext<'_> {
        let mut ctx = ExecutionContext::new(&self.state, self.this.clone()).with_height(self.height);
        ctx.tx = self.tx.clone();
        ctx.invocation = self.invocation.clone();
        ctx
    }
}

/// Convert a JSON array into arguments for a callable with `params`.
pub fn parse_args<'v>(
    arena: &'v Bump,
    name: &str,
    params: &[(&str, &Type<'_>)],
    text: &str,
) -> Result<Vec<Value<'v>>, InputError> {
    let json: Json = serde_json::from_str(text).map_err(|source| InputError::Json {
        what: "the callable arguments",
        source,
    })?;
    let Json::Array(items) = json else {
        return Err(InputError::NotAnArray);
    };
    if items.len() != params.len() {
        return Err(InputError::Arity {
            name: name.to_string(),
            expected: params.len(),
            got: items.len(),
        });
    }
    params
        .iter()
        .zip(&items)
        .map(|((param, ty), item)| to_value(arena, param, ty, item))
        .collect()
}

fn to_value<'v>(
    arena: &'v Bump,
    param: &str,
    ty: &Type<'_>,
    json: &Json,
) -> Result<Value<'v>, InputError> {
    let value = match (ty, json) {
        (Type::Unit, Json::Null) => Some(Value::Unit),
        (Type::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
        (Type::Int, Json::Number(n)) => n.as_i64().map(Value::Int),
        (Type::Str, Json::String(s)) => Some(Value::str(arena, s)),
        (Type::Bytes, Json::String(s)) => decode_base58(s).ok().map(|b| Value::bytes(arena, &b)),
        (Type::List(item), Json::Array(items)) => {
            let values = items
                .iter()
                .map(|j| to_value(arena, param, item, j))
                .collect::<Result<Vec<_>, _>>()?;
            Some(Value::list(arena, &values))
        }
        (Type::Union(members), json) => members
            .iter()
            .find_map(|member| to_value(arena, param, member, json).ok()),
        _ => None,
    };
    value.ok_or_else(|| InputError::Argument {
        param: param.to_string(),
        expected: ty.to_string(),
        got: json.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ridge::TypeManager;

    #[test]
    fn test_empty_context_file() {
        let file = ContextFile::parse("{}").unwrap();
        let ctx = file.context();
        assert_eq!(ctx.height, 0);
        assert!(ctx.tx.is_none());
        assert!(ctx.invocation.is_none());
    }

    #[test]
    fn test_context_file_fields() {
        let file = ContextFile::parse(
            r#"{
                "height": 120,
                "this": { "account": "Y2" },
                "invocation": { "caller": "Y2", "fee": 5 },
                "state": { "Y2": { "balance": { "type": "integer", "value": 50 } } }
            }"#,
        )
        .unwrap();
        let ctx = file.context();
        assert_eq!(ctx.height, 120);
        assert_eq!(ctx.this, This::Account(Address(vec![7, 7])));
        assert_eq!(ctx.invocation.as_ref().map(|i| i.fee), Some(5));
        assert!(ctx.state.read(&[7, 7], "balance").is_some());
    }

    #[test]
    fn test_unknown_context_field() {
        assert!(matches!(
            ContextFile::parse(r#"{ "hieght": 1 }"#),
            Err(InputError::Json { .. })
        ));
    }

    #[test]
    fn test_parse_args() {
        let types = Bump::new();
        let tm = TypeManager::new(&types);
        let params = [
            ("amount", tm.int()),
            ("key", tm.str()),
            ("ids", tm.list(tm.bytes())),
        ];
        let arena = Bump::new();
        let args = parse_args(&arena, "f", &params, r#"[5, "k", ["Y2"]]"#).unwrap();
        let shown: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        assert_eq!(shown, vec!["5", "\"k\"", "[base58'Y2']"]);
    }

    #[test]
    fn test_parse_args_errors() {
        let types = Bump::new();
        let tm = TypeManager::new(&types);
        let params = [("amount", tm.int())];
        let arena = Bump::new();
        assert!(matches!(
            parse_args(&arena, "f", &params, "5"),
            Err(InputError::NotAnArray)
        ));
        assert!(matches!(
            parse_args(&arena, "f", &params, "[]"),
            Err(InputError::Arity { expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            parse_args(&arena, "f", &params, "[true]"),
            Err(InputError::Argument { .. })
        ));
    }
}
