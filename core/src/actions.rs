//! Actions proposed by a callable.
//!
//! A callable returns a `WriteSet`, a `TransferSet` or a `ScriptResult`
//! value. It is converted here into an owned [`ScriptResult`] that the host
//! applies to the ledger, or rejected as a whole if it exceeds the limits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::{Address, Bytes, DataEntry, DataValue};
use crate::evaluator::RuntimeError;
use crate::values::{StructValue, Value};

/// Most data entries a single invocation may write.
pub const MAX_DATA_ENTRIES: usize = 100;
/// Most transfers a single invocation may make.
pub const MAX_TRANSFERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTransfer {
    pub recipient: Address,
    pub amount: i64,
    /// `None` for the native token.
    pub asset: Option<Bytes>,
}

/// The complete effect of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptResult {
    pub data: Vec<DataEntry>,
    pub transfers: Vec<ScriptTransfer>,
}

impl ScriptResult {
    /// Convert a callable's result value and check the action limits.
    pub fn from_value(value: Value<'_>) -> Result<Self, RuntimeError> {
        let s = expect_struct(value);
        let result = match s.name {
            "WriteSet" => Self {
                data: write_set(s)?,
                transfers: Vec::new(),
            },
            "TransferSet" => Self {
                data: Vec::new(),
                transfers: transfer_set(s)?,
            },
            "ScriptResult" => Self {
                data: write_set(expect_struct(field(s, "writeSet")))?,
                transfers: transfer_set(expect_struct(field(s, "transferSet")))?,
            },
            other => unreachable!("callable result type-checked, got {}", other),
        };
        debug!(
            data = result.data.len(),
            transfers = result.transfers.len(),
            "Script result"
        );
        Ok(result)
    }
}

fn expect_struct<'v>(value: Value<'v>) -> &'v StructValue<'v> {
    value
        .as_struct()
        .unwrap_or_else(|| unreachable!("expected struct value, got {}", value))
}

fn field<'v>(s: &StructValue<'v>, name: &str) -> Value<'v> {
    s.field(name)
        .unwrap_or_else(|| unreachable!("{} has no field '{}'", s.name, name))
}

fn items<'v>(s: &StructValue<'v>, name: &str) -> &'v [Value<'v>] {
    field(s, name)
        .as_list()
        .unwrap_or_else(|| unreachable!("{}.{} is not a list", s.name, name))
}

fn check_limit(what: &'static str, count: usize, limit: usize) -> Result<(), RuntimeError> {
    if count > limit {
        return Err(RuntimeError::ActionLimitExceeded { what, count, limit });
    }
    Ok(())
}

fn write_set(s: &StructValue<'_>) -> Result<Vec<DataEntry>, RuntimeError> {
    let entries = items(s, "data");
    check_limit("data entries", entries.len(), MAX_DATA_ENTRIES)?;
    Ok(entries
        .iter()
        .map(|entry| {
            let entry = expect_struct(*entry);
            DataEntry {
                key: field(entry, "key").as_str().unwrap_or_default().to_string(),
                value: data_value(field(entry, "value")),
            }
        })
        .collect())
}

fn transfer_set(s: &StructValue<'_>) -> Result<Vec<ScriptTransfer>, RuntimeError> {
    let transfers = items(s, "transfers");
    check_limit("transfers", transfers.len(), MAX_TRANSFERS)?;
    transfers
        .iter()
        .map(|transfer| {
            let transfer = expect_struct(*transfer);
            let recipient = expect_struct(field(transfer, "recipient"));
            let amount = field(transfer, "amount").as_int().unwrap_or_default();
            if amount < 0 {
                return Err(RuntimeError::InvalidArgument {
                    function: "ScriptTransfer".to_string(),
                    message: format!("negative amount {}", amount),
                });
            }
            Ok(ScriptTransfer {
                recipient: Address::from(field(recipient, "bytes").as_bytes().unwrap_or_default()),
                amount,
                asset: field(transfer, "asset").as_bytes().map(Bytes::from),
            })
        })
        .collect()
}

fn data_value(value: Value<'_>) -> DataValue {
    match value {
        Value::Int(i) => DataValue::Integer(i),
        Value::Bool(b) => DataValue::Boolean(b),
        Value::Str(s) => DataValue::String(s.to_string()),
        Value::Bytes(b) => DataValue::Binary(Bytes::from(b)),
        other => unreachable!("data entry value type-checked, got {}", other),
    }
}
