//! Execution context: everything a script can observe about the outside world.
//!
//! The context is immutable and passed by reference. Ledger state is reached
//! through the [`LedgerState`] trait so that hosts can plug in their own
//! storage; [`InMemoryState`] is the bundled implementation.

pub mod convert;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::syntax::bytes_literal::{decode_base58, encode_base58};

/// Read-only access to account data storage.
pub trait LedgerState {
    /// The entry stored under `key` in the storage of `address`, if any.
    fn read(&self, address: &[u8], key: &str) -> Option<DataValue>;
}

/// Raw bytes, written as base58 in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bytes(pub Vec<u8>);

/// An account address, written as base58 in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub Vec<u8>);

macro_rules! base58_newtype {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                decode_base58(&value)
                    .map($name)
                    .map_err(|e| e.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                encode_base58(&value.0)
            }
        }

        impl From<&[u8]> for $name {
            fn from(value: &[u8]) -> Self {
                $name(value.to_vec())
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&encode_base58(&self.0))
            }
        }
    };
}

base58_newtype!(Bytes);
base58_newtype!(Address);

/// A value stored in account data storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DataValue {
    Integer(i64),
    Boolean(bool),
    String(String),
    Binary(Bytes),
}

/// A key/value pair, read from a data transaction or written by a callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    pub key: String,
    pub value: DataValue,
}

/// Account storage held in memory, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryState {
    accounts: BTreeMap<Address, BTreeMap<String, DataValue>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: &Address, key: impl Into<String>, value: DataValue) {
        self.accounts
            .entry(address.clone())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn with(mut self, address: &Address, key: impl Into<String>, value: DataValue) -> Self {
        self.insert(address, key, value);
        self
    }
}

impl LedgerState for InMemoryState {
    fn read(&self, address: &[u8], key: &str) -> Option<DataValue> {
        self.accounts
            .get(&Address(address.to_vec()))
            .and_then(|entries| entries.get(key))
            .cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub id: Bytes,
    pub quantity: i64,
    pub decimals: i64,
    pub issuer: Address,
    pub reissuable: bool,
}

/// What `this` refers to: the account running the script or the asset it
/// is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum This {
    Account(Address),
    Asset(AssetInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub asset_id: Option<Bytes>,
    pub amount: i64,
}

/// Fields common to every transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxHeader {
    pub id: Bytes,
    pub fee: i64,
    pub timestamp: i64,
    pub version: i64,
    pub sender: Address,
    pub sender_public_key: Bytes,
    pub body_bytes: Bytes,
    pub proofs: Vec<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTx {
    #[serde(flatten)]
    pub header: TxHeader,
    pub recipient: Address,
    pub amount: i64,
    #[serde(default)]
    pub asset_id: Option<Bytes>,
    #[serde(default)]
    pub fee_asset_id: Option<Bytes>,
    #[serde(default)]
    pub attachment: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTx {
    #[serde(flatten)]
    pub header: TxHeader,
    #[serde(default)]
    pub data: Vec<DataEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeScriptTx {
    #[serde(flatten)]
    pub header: TxHeader,
    pub d_app: Address,
    pub function: String,
    #[serde(default)]
    pub payment: Option<Payment>,
    #[serde(default)]
    pub fee_asset_id: Option<Bytes>,
}

/// The transaction being validated, seen by expression scripts as `tx` and
/// by verifiers through their annotation binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Transaction {
    Transfer(TransferTx),
    Data(DataTx),
    InvokeScript(InvokeScriptTx),
}

impl Transaction {
    pub fn header(&self) -> &TxHeader {
        match self {
            Transaction::Transfer(tx) => &tx.header,
            Transaction::Data(tx) => &tx.header,
            Transaction::InvokeScript(tx) => &tx.header,
        }
    }
}

/// The `@Callable` invocation: who called and what they attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub caller: Address,
    #[serde(default)]
    pub caller_public_key: Bytes,
    #[serde(default)]
    pub payment: Option<Payment>,
    #[serde(default)]
    pub transaction_id: Bytes,
    #[serde(default)]
    pub fee: i64,
    #[serde(default)]
    pub fee_asset_id: Option<Bytes>,
}

/// Everything observable by a running script.
#[derive(Clone)]
pub struct ExecutionContext<'s> {
    pub state: &'s dyn LedgerState,
    pub height: i64,
    pub this: This,
    pub tx: Option<Transaction>,
    pub invocation: Option<Invocation>,
}

impl<'s> ExecutionContext<'s> {
    pub fn new(state: &'s dyn LedgerState, this: This) -> Self {
        Self {
            state,
            height: 0,
            this,
            tx: None,
            invocation: None,
        }
    }

    pub fn with_height(mut self, height: i64) -> Self {
        self.height = height;
        self
    }

    pub fn with_tx(mut self, tx: Transaction) -> Self {
        self.tx = Some(tx);
        self
    }

    pub fn with_invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = Some(invocation);
        self
    }

    /// Address of the account running the script, or the asset issuer.
    pub fn this_address(&self) -> &Address {
        match &self.this {
            This::Account(address) => address,
            This::Asset(info) => &info.issuer,
        }
    }
}

impl core::fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("height", &self.height)
            .field("this", &self.this)
            .field("tx", &self.tx)
            .field("invocation", &self.invocation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_in_memory_reads() {
        let alice = Address(vec![1, 2, 3]);
        let state = InMemoryState::new().with(&alice, "count", DataValue::Integer(5));

        assert_eq!(state.read(&[1, 2, 3], "count"), Some(DataValue::Integer(5)));
        assert_eq!(state.read(&[1, 2, 3], "other"), None);
        assert_eq!(state.read(&[9], "count"), None);
    }

    #[test]
    fn test_state_from_json() {
        let json = indoc! {r#"
            {
                "Ldp": {
                    "count": { "type": "integer", "value": 5 },
                    "owner": { "type": "binary", "value": "Cn8eVZg" }
                }
            }
        "#};
        let state: InMemoryState = serde_json::from_str(json).unwrap();
        assert_eq!(state.read(&[1, 2, 3], "count"), Some(DataValue::Integer(5)));
        assert_eq!(
            state.read(&[1, 2, 3], "owner"),
            Some(DataValue::Binary(Bytes(b"hello".to_vec())))
        );
    }

    #[test]
    fn test_transaction_from_json() {
        let json = indoc! {r#"
            {
                "type": "Transfer",
                "id": "Ldp",
                "fee": 100000,
                "sender": "Ldp",
                "recipient": "Cn8eVZg",
                "amount": 42
            }
        "#};
        let tx: Transaction = serde_json::from_str(json).unwrap();
        let Transaction::Transfer(transfer) = &tx else {
            panic!("expected transfer, got {:?}", tx);
        };
        assert_eq!(transfer.amount, 42);
        assert_eq!(transfer.asset_id, None);
        assert_eq!(tx.header().fee, 100000);
        assert_eq!(tx.header().sender, Address(vec![1, 2, 3]));
    }

    #[test]
    fn test_invalid_base58_is_rejected() {
        let result: Result<Address, _> = serde_json::from_str(r#""0OIl""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_this_address() {
        let state = InMemoryState::new();
        let issuer = Address(vec![7]);
        let ctx = ExecutionContext::new(
            &state,
            This::Asset(AssetInfo {
                id: Bytes(vec![1]),
                quantity: 10,
                decimals: 2,
                issuer: issuer.clone(),
                reissuable: false,
            }),
        );
        assert_eq!(ctx.this_address(), &issuer);
    }
}
