//! JSON-RPC (de)serialization for [`Transaction`].
//!
//! Field names and hex-quantity formatting follow the Ethereum JSON-RPC
//! object shape. On ingest, `yParity` takes precedence over `v` for typed
//! transactions; `hash` and `from` are emitted only when already computed
//! and accepted as pre-populated caches.

use super::{Transaction, TxSignature};
use crate::{AccessList, Authorization, Error, TxType};
use alloy_primitives::{Address, Bytes, ChainId, B256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    #[serde(rename = "type", with = "alloy_serde::quantity")]
    tx_type: u8,
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    chain_id: Option<ChainId>,
    #[serde(with = "alloy_serde::quantity")]
    nonce: u64,
    #[serde(with = "alloy_serde::quantity")]
    gas: u64,
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    gas_price: Option<u128>,
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    max_priority_fee_per_gas: Option<u128>,
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    max_fee_per_gas: Option<u128>,
    #[serde(default)]
    to: Option<Address>,
    #[serde(default)]
    value: U256,
    #[serde(default, alias = "data")]
    input: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_list: Option<AccessList>,
    #[serde(default, alias = "authList", skip_serializing_if = "Option::is_none")]
    authorization_list: Option<Vec<Authorization>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    v: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    r: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    s: Option<U256>,
    #[serde(default, with = "alloy_serde::quantity::opt", skip_serializing_if = "Option::is_none")]
    y_parity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let typed = !self.tx_type.is_legacy();
        let aux = RpcTransaction {
            tx_type: self.tx_type.into(),
            chain_id: self.chain_id,
            nonce: self.nonce,
            gas: self.gas_limit,
            gas_price: self.gas_price,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            max_fee_per_gas: self.max_fee_per_gas,
            to: self.to,
            value: self.value,
            input: self.input.clone(),
            access_list: typed.then(|| self.access_list.clone()),
            authorization_list: self
                .tx_type
                .is_eip7702()
                .then(|| self.authorization_list.clone()),
            v: self.signature.as_ref().map(|sig| sig.v),
            r: self.signature.as_ref().map(|sig| sig.r),
            s: self.signature.as_ref().map(|sig| sig.s),
            y_parity: if typed {
                self.signature.as_ref().and_then(|sig| u8::try_from(sig.v).ok())
            } else {
                None
            },
            hash: self.signed_hash,
            from: self.from,
        };
        aux.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let aux = RpcTransaction::deserialize(deserializer)?;
        from_rpc(aux).map_err(serde::de::Error::custom)
    }
}

fn from_rpc(aux: RpcTransaction) -> crate::Result<Transaction> {
    let tx_type = TxType::try_from(aux.tx_type)?;
    if tx_type.is_eip4844() {
        return Err(Error::TxTypeNotSupported);
    }

    let v = if !tx_type.is_legacy() {
        match aux.y_parity {
            Some(parity) => Some(U256::from(parity)),
            None => aux.v,
        }
    } else {
        aux.v
    };
    let signature = match (v, aux.r, aux.s) {
        (Some(v), Some(r), Some(s)) => Some(TxSignature::new(v, r, s)),
        _ => None,
    };

    Ok(Transaction {
        tx_type,
        chain_id: aux.chain_id,
        nonce: aux.nonce,
        gas_limit: aux.gas,
        gas_price: aux.gas_price,
        max_priority_fee_per_gas: aux.max_priority_fee_per_gas,
        max_fee_per_gas: aux.max_fee_per_gas,
        to: aux.to,
        value: aux.value,
        input: aux.input,
        access_list: aux.access_list.unwrap_or_default(),
        authorization_list: aux.authorization_list.unwrap_or_default(),
        signature,
        signed_hash: aux.hash,
        from: aux.from,
        ..Default::default()
    })
}
