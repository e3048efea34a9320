//! Conversion of context data into runtime struct values.
//!
//! Field order matches the struct types in `stdlib::structs`.

use bumpalo::Bump;

use crate::context::{
    Address, AssetInfo, Bytes, DataEntry, DataValue, Invocation, Payment, This, Transaction,
    TxHeader,
};
use crate::values::Value;

pub fn address<'v>(arena: &'v Bump, address: &Address) -> Value<'v> {
    Value::structure(arena, "Address", &[("bytes", Value::bytes(arena, &address.0))])
}

fn bytes<'v>(arena: &'v Bump, bytes: &Bytes) -> Value<'v> {
    Value::bytes(arena, &bytes.0)
}

fn optional_bytes<'v>(arena: &'v Bump, value: &Option<Bytes>) -> Value<'v> {
    value.as_ref().map_or(Value::Unit, |b| bytes(arena, b))
}

pub fn data_value<'v>(arena: &'v Bump, value: &DataValue) -> Value<'v> {
    match value {
        DataValue::Integer(i) => Value::Int(*i),
        DataValue::Boolean(b) => Value::Bool(*b),
        DataValue::String(s) => Value::str(arena, s),
        DataValue::Binary(b) => bytes(arena, b),
    }
}

pub fn data_entry<'v>(arena: &'v Bump, entry: &DataEntry) -> Value<'v> {
    Value::structure(
        arena,
        "DataEntry",
        &[
            ("key", Value::str(arena, &entry.key)),
            ("value", data_value(arena, &entry.value)),
        ],
    )
}

pub fn asset_info<'v>(arena: &'v Bump, info: &AssetInfo) -> Value<'v> {
    Value::structure(
        arena,
        "AssetInfo",
        &[
            ("id", bytes(arena, &info.id)),
            ("quantity", Value::Int(info.quantity)),
            ("decimals", Value::Int(info.decimals)),
            ("issuer", address(arena, &info.issuer)),
            ("reissuable", Value::Bool(info.reissuable)),
        ],
    )
}

/// `AttachedPayment`, or `unit` when nothing is attached.
pub fn payment<'v>(arena: &'v Bump, payment: &Option<Payment>) -> Value<'v> {
    match payment {
        Some(p) => Value::structure(
            arena,
            "AttachedPayment",
            &[
                ("assetId", optional_bytes(arena, &p.asset_id)),
                ("amount", Value::Int(p.amount)),
            ],
        ),
        None => Value::Unit,
    }
}

pub fn invocation<'v>(arena: &'v Bump, inv: &Invocation) -> Value<'v> {
    Value::structure(
        arena,
        "Invocation",
        &[
            ("caller", address(arena, &inv.caller)),
            ("callerPublicKey", bytes(arena, &inv.caller_public_key)),
            ("payment", payment(arena, &inv.payment)),
            ("transactionId", bytes(arena, &inv.transaction_id)),
            ("fee", Value::Int(inv.fee)),
            ("feeAssetId", optional_bytes(arena, &inv.fee_asset_id)),
        ],
    )
}

fn header<'v>(arena: &'v Bump, header: &TxHeader) -> Vec<(&'static str, Value<'v>)> {
    let proofs: Vec<Value<'v>> = header.proofs.iter().map(|p| bytes(arena, p)).collect();
    vec![
        ("id", bytes(arena, &header.id)),
        ("fee", Value::Int(header.fee)),
        ("timestamp", Value::Int(header.timestamp)),
        ("version", Value::Int(header.version)),
        ("sender", address(arena, &header.sender)),
        ("senderPublicKey", bytes(arena, &header.sender_public_key)),
        ("bodyBytes", bytes(arena, &header.body_bytes)),
        ("proofs", Value::list(arena, &proofs)),
    ]
}

pub fn transaction<'v>(arena: &'v Bump, tx: &Transaction) -> Value<'v> {
    let mut fields = header(arena, tx.header());
    let name = match tx {
        Transaction::Transfer(t) => {
            fields.extend([
                ("recipient", address(arena, &t.recipient)),
                ("amount", Value::Int(t.amount)),
                ("assetId", optional_bytes(arena, &t.asset_id)),
                ("feeAssetId", optional_bytes(arena, &t.fee_asset_id)),
                ("attachment", bytes(arena, &t.attachment)),
            ]);
            "TransferTransaction"
        }
        Transaction::Data(t) => {
            let data: Vec<Value<'v>> = t.data.iter().map(|e| data_entry(arena, e)).collect();
            fields.push(("data", Value::list(arena, &data)));
            "DataTransaction"
        }
        Transaction::InvokeScript(t) => {
            fields.extend([
                ("dApp", address(arena, &t.d_app)),
                ("function", Value::str(arena, &t.function)),
                ("payment", payment(arena, &t.payment)),
                ("feeAssetId", optional_bytes(arena, &t.fee_asset_id)),
            ]);
            "InvokeScriptTransaction"
        }
    };
    Value::structure(arena, name, &fields)
}

/// `this`: an `Address` for account scripts, `AssetInfo` for asset scripts.
pub fn this<'v>(arena: &'v Bump, this: &This) -> Value<'v> {
    match this {
        This::Account(a) => address(arena, a),
        This::Asset(info) => asset_info(arena, info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeManager;

    fn header() -> TxHeader {
        TxHeader {
            fee: 5,
            sender: Address(vec![1]),
            proofs: vec![Bytes(vec![2])],
            ..TxHeader::default()
        }
    }

    #[test]
    fn test_values_conform_to_std_types() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);
        let std = types.std();

        let transfer = Transaction::Transfer(crate::context::TransferTx {
            header: header(),
            recipient: Address(vec![3]),
            amount: 10,
            asset_id: None,
            fee_asset_id: Some(Bytes(vec![4])),
            attachment: Bytes::default(),
        });
        let value = transaction(&arena, &transfer);
        assert!(value.conforms(std.transfer_tx));
        assert!(value.conforms(std.transaction));

        let inv = Invocation {
            caller: Address(vec![1]),
            caller_public_key: Bytes(vec![]),
            payment: Some(Payment {
                asset_id: None,
                amount: 3,
            }),
            transaction_id: Bytes(vec![]),
            fee: 1,
            fee_asset_id: None,
        };
        assert!(invocation(&arena, &inv).conforms(std.invocation));
    }

    #[test]
    fn test_field_order_matches_struct_types() {
        let arena = Bump::new();
        let types = TypeManager::new(&arena);

        let data = Transaction::Data(crate::context::DataTx {
            header: header(),
            data: vec![DataEntry {
                key: "k".to_string(),
                value: DataValue::Boolean(true),
            }],
        });
        let value = transaction(&arena, &data);
        let fields: Vec<&str> = value.as_struct().unwrap().fields.iter().map(|(n, _)| *n).collect();
        let expected: Vec<&str> = types
            .std()
            .data_tx
            .as_struct()
            .unwrap()
            .fields
            .iter()
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(fields, expected);
    }
}
