//! Struct types provided by the execution environment.

use bumpalo::Bump;

use crate::types::manager::make_struct;
use crate::types::{Type, union_in};

/// The standard struct types, built once per [`TypeManager`](crate::types::TypeManager).
///
/// Field order here is the order of the runtime struct values built in
/// `context::convert` and by the constructor builtins.
#[derive(Debug)]
pub struct StdStructs<'a> {
    pub address: &'a Type<'a>,
    pub asset_info: &'a Type<'a>,
    pub attached_payment: &'a Type<'a>,
    pub invocation: &'a Type<'a>,
    pub transfer_tx: &'a Type<'a>,
    pub data_tx: &'a Type<'a>,
    pub invoke_tx: &'a Type<'a>,
    /// Union of all transaction types, the type of `tx`.
    pub transaction: &'a Type<'a>,
    /// `Int|Boolean|ByteVector|String`
    pub data_value: &'a Type<'a>,
    pub data_entry: &'a Type<'a>,
    pub script_transfer: &'a Type<'a>,
    pub write_set: &'a Type<'a>,
    pub transfer_set: &'a Type<'a>,
    pub script_result: &'a Type<'a>,
}

impl<'a> StdStructs<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        let int: &'a Type<'a> = &Type::Int;
        let boolean: &'a Type<'a> = &Type::Bool;
        let string: &'a Type<'a> = &Type::Str;
        let bytes: &'a Type<'a> = &Type::Bytes;
        let unit: &'a Type<'a> = &Type::Unit;
        let optional_bytes = union_in(arena, &[bytes, unit]);
        let list = |elem: &'a Type<'a>| -> &'a Type<'a> { arena.alloc(Type::List(elem)) };

        let address = make_struct(arena, "Address", &[("bytes", bytes)]);
        let asset_info = make_struct(
            arena,
            "AssetInfo",
            &[
                ("id", bytes),
                ("quantity", int),
                ("decimals", int),
                ("issuer", address),
                ("reissuable", boolean),
            ],
        );
        let attached_payment = make_struct(
            arena,
            "AttachedPayment",
            &[("assetId", optional_bytes), ("amount", int)],
        );
        let optional_payment = union_in(arena, &[attached_payment, unit]);
        let invocation = make_struct(
            arena,
            "Invocation",
            &[
                ("caller", address),
                ("callerPublicKey", bytes),
                ("payment", optional_payment),
                ("transactionId", bytes),
                ("fee", int),
                ("feeAssetId", optional_bytes),
            ],
        );

        let data_value = union_in(arena, &[int, boolean, bytes, string]);
        let data_entry = make_struct(arena, "DataEntry", &[("key", string), ("value", data_value)]);
        let script_transfer = make_struct(
            arena,
            "ScriptTransfer",
            &[
                ("recipient", address),
                ("amount", int),
                ("asset", optional_bytes),
            ],
        );
        let write_set = make_struct(arena, "WriteSet", &[("data", list(data_entry))]);
        let transfer_set = make_struct(
            arena,
            "TransferSet",
            &[("transfers", list(script_transfer))],
        );
        let script_result = make_struct(
            arena,
            "ScriptResult",
            &[("writeSet", write_set), ("transferSet", transfer_set)],
        );

        let header = |extra: &[(&'static str, &'a Type<'a>)]| -> Vec<(&'static str, &'a Type<'a>)> {
            let mut fields = vec![
                ("id", bytes),
                ("fee", int),
                ("timestamp", int),
                ("version", int),
                ("sender", address),
                ("senderPublicKey", bytes),
                ("bodyBytes", bytes),
                ("proofs", list(bytes)),
            ];
            fields.extend_from_slice(extra);
            fields
        };
        let transfer_tx = make_struct(
            arena,
            "TransferTransaction",
            &header(&[
                ("recipient", address),
                ("amount", int),
                ("assetId", optional_bytes),
                ("feeAssetId", optional_bytes),
                ("attachment", bytes),
            ]),
        );
        let data_tx = make_struct(
            arena,
            "DataTransaction",
            &header(&[("data", list(data_entry))]),
        );
        let invoke_tx = make_struct(
            arena,
            "InvokeScriptTransaction",
            &header(&[
                ("dApp", address),
                ("function", string),
                ("payment", optional_payment),
                ("feeAssetId", optional_bytes),
            ]),
        );
        let transaction = union_in(arena, &[transfer_tx, data_tx, invoke_tx]);

        Self {
            address,
            asset_info,
            attached_payment,
            invocation,
            transfer_tx,
            data_tx,
            invoke_tx,
            transaction,
            data_value,
            data_entry,
            script_transfer,
            write_set,
            transfer_set,
            script_result,
        }
    }

    /// Resolve a struct (or the `Transaction` alias) by its source name.
    pub fn by_name(&self, name: &str) -> Option<&'a Type<'a>> {
        let ty = match name {
            "Address" => self.address,
            "AssetInfo" => self.asset_info,
            "AttachedPayment" => self.attached_payment,
            "Invocation" => self.invocation,
            "TransferTransaction" => self.transfer_tx,
            "DataTransaction" => self.data_tx,
            "InvokeScriptTransaction" => self.invoke_tx,
            "Transaction" => self.transaction,
            "DataEntry" => self.data_entry,
            "ScriptTransfer" => self.script_transfer,
            "WriteSet" => self.write_set,
            "TransferSet" => self.transfer_set,
            "ScriptResult" => self.script_result,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether `ty` is an acceptable callable result.
    pub fn is_action_result(&self, ty: &Type<'a>) -> bool {
        let allowed = [self.write_set, self.transfer_set, self.script_result];
        match ty {
            Type::Nothing => true,
            Type::Union(members) => members.iter().all(|m| allowed.contains(m)),
            other => allowed.iter().any(|a| *a == other),
        }
    }
}
