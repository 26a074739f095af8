//! Per-type decoders and the packet decoder.
//!
//! Decoders walk the envelope and fields with a [`Cursor`] and record the
//! three offsets (`tx_start`, `data_start`, `signature_start`) into the
//! retained byte window, so hashing and preimage reconstruction never
//! re-parse. All windows are zero-copy slices of the input buffer.

use super::{SignedLayout, Transaction, TxSignature};
use crate::{eip7702::read_u256, AccessList, Authorization, Error, Result, TxType};
use alloy_primitives::{Address, Bytes, ChainId};
use ethwire_rlp::Cursor;

/// Decodes a packet: an RLP list of transaction items.
///
/// Items carrying an unrecognized or non-materialized type tag (including
/// EIP-4844 blob transactions) are skipped in full and omitted from the
/// result; any other malformed item aborts the whole decode.
pub fn decode_packet(buf: &Bytes) -> Result<Vec<Transaction>> {
    let mut cur = Cursor::new(buf.as_ref());
    let payload = cur.read_list_header()?;
    if cur.remaining() < payload {
        return Err(ethwire_rlp::Error::Eof.into());
    }
    let start = cur.position();

    let mut txs = Vec::new();
    while cur.position() - start < payload {
        if cur.is_next_list() {
            txs.push(decode_legacy(&mut cur, buf)?);
            continue;
        }

        let region_start = cur.position();
        let envelope = cur.read_string_header()?;
        if cur.remaining() < envelope {
            return Err(ethwire_rlp::Error::Eof.into());
        }
        let tx_start = cur.position() - region_start;
        if envelope == 0 {
            // an empty string carries no type tag; nothing to emit
            continue;
        }
        let tag = cur.read_byte()?;
        match TxType::try_from(tag) {
            Ok(tx_type @ (TxType::Eip2930 | TxType::Eip1559 | TxType::Eip7702)) => {
                txs.push(decode_typed(&mut cur, buf, region_start, tx_start, envelope, tx_type)?);
            }
            _ => {
                // forward compatibility: skip the remainder of the item
                cur.skip(envelope - 1)?;
            }
        }
    }

    if cur.position() - start != payload {
        return Err(ethwire_rlp::Error::UnexpectedLength.into());
    }
    Ok(txs)
}

/// Decodes a single transaction from the front of `buf`.
pub(crate) fn decode_transaction(buf: &Bytes) -> Result<Transaction> {
    let mut cur = Cursor::new(buf.as_ref());
    if cur.is_next_list() {
        return decode_legacy(&mut cur, buf);
    }

    let region_start = cur.position();
    let envelope = cur.read_string_header()?;
    if cur.remaining() < envelope {
        return Err(ethwire_rlp::Error::Eof.into());
    }
    let tx_start = cur.position() - region_start;
    if envelope == 0 {
        return Err(Error::TxTypeNotSupported);
    }
    let tag = cur.read_byte()?;
    match TxType::try_from(tag)? {
        tx_type @ (TxType::Eip2930 | TxType::Eip1559 | TxType::Eip7702) => {
            decode_typed(&mut cur, buf, region_start, tx_start, envelope, tx_type)
        }
        _ => Err(Error::TxTypeNotSupported),
    }
}

/// Decodes a legacy transaction: a bare RLP list of nine fields.
pub(crate) fn decode_legacy(cur: &mut Cursor<'_>, buf: &Bytes) -> Result<Transaction> {
    let region_start = cur.position();
    let payload = cur.read_list_header()?;
    if cur.remaining() < payload {
        return Err(ethwire_rlp::Error::Eof.into());
    }
    let data_start = cur.position() - region_start;

    let nonce = cur.read_uint()?;
    let gas_price = read_u128(cur)?;
    let gas_limit = cur.read_uint()?;
    let to = read_address_opt(cur)?;
    let value = read_u256(cur)?;
    let input = read_input(cur, buf)?;
    let signature_start = cur.position() - region_start;
    let v = read_u256(cur)?;
    let r = read_u256(cur)?;
    let s = read_u256(cur)?;

    if cur.position() - region_start != data_start + payload {
        return Err(ethwire_rlp::Error::UnexpectedLength.into());
    }
    let bytes = buf.slice(region_start..cur.position());

    Ok(Transaction {
        tx_type: TxType::Legacy,
        chain_id: derive_chain_id(&v),
        nonce,
        gas_limit,
        gas_price: Some(gas_price),
        to,
        value,
        input,
        signature: Some(TxSignature::new(v, r, s)),
        signed: Some(SignedLayout::new(bytes, 0, data_start, signature_start)),
        ..Default::default()
    })
}

/// Decodes the fields list of a typed transaction.
///
/// The cursor sits just past the type tag; `region_start` is the absolute
/// position of the string envelope, `tx_start` the envelope header size and
/// `envelope` its declared payload length.
fn decode_typed(
    cur: &mut Cursor<'_>,
    buf: &Bytes,
    region_start: usize,
    tx_start: usize,
    envelope: usize,
    tx_type: TxType,
) -> Result<Transaction> {
    let payload = cur.read_list_header()?;
    let data_start = cur.position() - region_start;

    let chain_id = cur.read_uint()?;
    let nonce = cur.read_uint()?;
    let (gas_price, max_priority_fee_per_gas, max_fee_per_gas) = match tx_type {
        TxType::Eip2930 => (Some(read_u128(cur)?), None, None),
        _ => {
            let tip = read_u128(cur)?;
            let fee = read_u128(cur)?;
            (None, Some(tip), Some(fee))
        }
    };
    let gas_limit = cur.read_uint()?;
    let to = read_address_opt(cur)?;
    let value = read_u256(cur)?;
    let input = read_input(cur, buf)?;
    let access_list = AccessList::decode(cur)?;
    let authorization_list = if tx_type.is_eip7702() {
        decode_authorization_list(cur)?
    } else {
        Vec::new()
    };
    let signature_start = cur.position() - region_start;
    let v = read_u256(cur)?;
    let r = read_u256(cur)?;
    let s = read_u256(cur)?;

    let consumed = cur.position() - region_start;
    if consumed != data_start + payload || consumed != tx_start + envelope {
        return Err(ethwire_rlp::Error::UnexpectedLength.into());
    }
    let bytes = buf.slice(region_start..cur.position());

    Ok(Transaction {
        tx_type,
        chain_id: Some(chain_id),
        nonce,
        gas_limit,
        gas_price,
        max_priority_fee_per_gas,
        max_fee_per_gas,
        to,
        value,
        input,
        access_list,
        authorization_list,
        signature: Some(TxSignature::new(v, r, s)),
        signed: Some(SignedLayout::new(bytes, tx_start, data_start, signature_start)),
        ..Default::default()
    })
}

fn decode_authorization_list(cur: &mut Cursor<'_>) -> Result<Vec<Authorization>> {
    let payload = cur.read_list_header()?;
    let end = cur.position() + payload;
    let mut list = Vec::new();
    while cur.position() < end {
        list.push(Authorization::decode(cur)?);
    }
    if cur.position() != end {
        return Err(ethwire_rlp::Error::UnexpectedLength.into());
    }
    Ok(list)
}

/// Reads an integer item of at most 16 content bytes.
fn read_u128(cur: &mut Cursor<'_>) -> Result<u128> {
    if cur.is_next_list() {
        return Err(ethwire_rlp::Error::NotAString.into());
    }
    let content = cur.read_value()?;
    if content.len() > 16 || content.first() == Some(&0) {
        return Err(ethwire_rlp::Error::ValueNotSupported.into());
    }
    let mut v = 0u128;
    for &b in content {
        v = v << 8 | u128::from(b);
    }
    Ok(v)
}

/// Reads the `to` field: a 20-byte address or the empty string for contract
/// creation.
fn read_address_opt(cur: &mut Cursor<'_>) -> Result<Option<Address>> {
    let content = cur.read_value()?;
    match content.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(content))),
        _ => Err(ethwire_rlp::Error::ValueNotSupported.into()),
    }
}

/// Reads the calldata field as a zero-copy window of the input buffer.
fn read_input(cur: &mut Cursor<'_>, buf: &Bytes) -> Result<Bytes> {
    if cur.is_next_list() {
        return Err(ethwire_rlp::Error::NotAString.into());
    }
    let content = cur.read_value()?;
    let end = cur.position();
    Ok(buf.slice(end - content.len()..end))
}

/// Extracts the EIP-155 chain id from a legacy `v`; 27/28 means pre-EIP-155.
fn derive_chain_id(v: &alloy_primitives::U256) -> Option<ChainId> {
    let v = u64::try_from(*v).ok()?;
    if v >= 35 {
        Some((v - 35) / 2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::encode::encode_packet;
    use super::*;
    use alloy_primitives::{address, b256, hex, keccak256, U256};
    use ethwire_rlp::Writer;

    /// Signed EIP-2930 call with an empty access list, from a production
    /// Ethereum library test suite.
    const EIP2930_RAW: [u8; 102] = hex!("b86401f8610180010294000000000000000000000000000000000000000003820102c080a0840cfc572845f5786e702984c2a582528cad4b49b2a10b9db1be7fca90058565a025e7109ceb98168d95b09b18bbf6b685130e0562f233877d492b94eee0c5b6d1");

    /// Signed mainnet legacy transaction with a known sender.
    const LEGACY_RAW: [u8; 343] = hex!("f9015482078b8505d21dba0083022ef1947a250d5630b4cf539739df2c5dacb4c659f2488d880c46549a521b13d8b8e47ff36ab50000000000000000000000000000000000000000000066ab5a608bd00a23f2fe000000000000000000000000000000000000000000000000000000000000008000000000000000000000000048c04ed5691981c42154c6167398f95e8f38a7ff00000000000000000000000000000000000000000000000000000000632ceac70000000000000000000000000000000000000000000000000000000000000002000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc20000000000000000000000006c6ee5e31d828de241282b9606c8e98ea48526e225a0c9077369501641a92ef7399ff81c21639ed4fd8fc69cb793cfa1dbfab342e10aa0615facb2f1bcf3274a354cfe384a38d0cc008a11c2dd23a69111bc6930ba27a8");

    #[test]
    fn decodes_eip2930_envelope_byte_exactly() {
        let raw = Bytes::from(EIP2930_RAW.to_vec());
        let tx = decode_transaction(&raw).unwrap();

        assert_eq!(tx.tx_type, TxType::Eip2930);
        assert_eq!(tx.chain_id, Some(1));
        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.gas_price, Some(1));
        assert_eq!(tx.gas_limit, 2);
        assert_eq!(tx.to, Some(Address::ZERO));
        assert_eq!(tx.value, U256::from(3u8));
        assert_eq!(tx.input.as_ref(), &[1, 2]);
        assert!(tx.access_list.is_empty());

        let sig = tx.signature.as_ref().unwrap();
        assert_eq!(sig.v, U256::ZERO);
        assert_eq!(
            sig.r,
            U256::from_be_bytes(
                b256!("840cfc572845f5786e702984c2a582528cad4b49b2a10b9db1be7fca90058565").0
            )
        );

        let layout = tx.signed.as_ref().unwrap();
        assert_eq!(layout.bytes().as_ref(), &EIP2930_RAW[..]);
        assert_eq!(layout.tx_start(), 2);
        assert_eq!(layout.data_start(), 5);
        assert_eq!(layout.bytes()[layout.signature_start()], 0x80); // v = 0

        // re-encode from the cached window
        let mut out = Vec::new();
        tx.encode_signed(&mut out).unwrap();
        assert_eq!(out, EIP2930_RAW);

        // re-encode cold, from the fields alone
        let mut cold = tx.clone();
        cold.set_nonce(0);
        let mut out = Vec::new();
        cold.encode_signed(&mut out).unwrap();
        assert_eq!(out, EIP2930_RAW);

        let mut tx = tx;
        assert_eq!(tx.hash().unwrap(), keccak256(&EIP2930_RAW[2..]));
    }

    #[test]
    fn decodes_mainnet_legacy_and_recovers_sender() {
        let raw = Bytes::from(LEGACY_RAW.to_vec());
        let mut tx = decode_transaction(&raw).unwrap();

        assert_eq!(tx.tx_type, TxType::Legacy);
        assert_eq!(tx.chain_id, Some(1));
        assert_eq!(
            tx.from().unwrap(),
            address!("a12e1462d0ceD572f396F58B6E2D03894cD7C8a4")
        );

        let mut out = Vec::new();
        tx.encode_signed(&mut out).unwrap();
        assert_eq!(out, LEGACY_RAW);
    }

    #[test]
    fn packet_skips_unknown_type_items() {
        // legacy, eip-2930, an unrecognized 0x7f item of 42 bytes, legacy
        let mut unknown = vec![0x80 + 42];
        unknown.push(0x7F);
        unknown.extend(core::iter::repeat(0u8).take(41));

        let payload = LEGACY_RAW.len() * 2 + EIP2930_RAW.len() + unknown.len();
        let mut packet = Vec::new();
        Writer::new(&mut packet).write_list_header(payload);
        packet.extend_from_slice(&LEGACY_RAW);
        packet.extend_from_slice(&EIP2930_RAW);
        packet.extend_from_slice(&unknown);
        packet.extend_from_slice(&LEGACY_RAW);

        let txs = decode_packet(&Bytes::from(packet)).unwrap();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].tx_type, TxType::Legacy);
        assert_eq!(txs[1].tx_type, TxType::Eip2930);
        assert_eq!(txs[2].tx_type, TxType::Legacy);
    }

    #[test]
    fn packet_skips_blob_items() {
        // a 0x03-tagged item is recognized but not materialized
        let blob_item = [0x84, 0x03, 0xDE, 0xAD, 0xBE];
        let payload = EIP2930_RAW.len() + blob_item.len();
        let mut packet = Vec::new();
        Writer::new(&mut packet).write_list_header(payload);
        packet.extend_from_slice(&EIP2930_RAW);
        packet.extend_from_slice(&blob_item);

        let txs = decode_packet(&Bytes::from(packet)).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].tx_type, TxType::Eip2930);
    }

    #[test]
    fn packet_round_trip() {
        let raw = Bytes::from(EIP2930_RAW.to_vec());
        let a = decode_transaction(&raw).unwrap();
        let raw = Bytes::from(LEGACY_RAW.to_vec());
        let b = decode_transaction(&raw).unwrap();

        let mut packet = Vec::new();
        encode_packet(&[a.clone(), b.clone()], &mut packet).unwrap();

        let decoded = decode_packet(&Bytes::from(packet)).unwrap();
        assert_eq!(decoded, vec![a, b]);
    }

    #[test]
    fn truncated_item_aborts_the_packet() {
        // envelope declares more bytes than the packet holds
        let packet = vec![0xC3, 0xB8, 0x40, 0x02];
        let err = decode_packet(&Bytes::from(packet)).unwrap_err();
        assert_eq!(err, Error::Rlp(ethwire_rlp::Error::Eof));
    }

    #[test]
    fn malformed_known_type_aborts_the_packet() {
        // a recognized 0x02 item whose fields list is garbage must error,
        // not be skipped
        let item = [0x83, 0x02, 0xC1, 0xC0];
        let payload = item.len();
        let mut packet = Vec::new();
        Writer::new(&mut packet).write_list_header(payload);
        packet.extend_from_slice(&item);
        assert!(decode_packet(&Bytes::from(packet)).is_err());
    }

    #[test]
    fn decodes_contract_creation_to_as_none() {
        let mut tx = decode_transaction(&Bytes::from(EIP2930_RAW.to_vec())).unwrap();
        tx.set_to(None);
        tx.set_signature(TxSignature::new(U256::ZERO, U256::from(1u8), U256::from(2u8)));
        let mut out = Vec::new();
        tx.encode_signed(&mut out).unwrap();

        let decoded = decode_transaction(&Bytes::from(out)).unwrap();
        assert_eq!(decoded.to, None);
        // the `to` slot encodes as the empty string
        let layout = decoded.signed.as_ref().unwrap();
        let fields = &layout.bytes()[layout.data_start()..];
        assert_eq!(fields[4], 0x80);
    }
}
