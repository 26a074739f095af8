//! Per-type signed and unsigned encoders.
//!
//! Every encoder measures its payload bottom-up, writes the outer envelope,
//! then the fields in the canonical order. The signed encoders report the
//! three cursor offsets of the freshly written region so the record can hash
//! and splice without re-serializing.

use super::Transaction;
use crate::{Error, Result, TxType};
use alloy_primitives::Bytes;
use ethwire_rlp::{length, Writer};

/// Cursor offsets of a signed encoding, relative to the start of the written
/// region.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Offsets {
    pub(crate) tx_start: usize,
    pub(crate) data_start: usize,
    pub(crate) signature_start: usize,
}

/// Encodes a list of signed transactions as a packet: an RLP list whose
/// items are the per-transaction signed encodings.
pub fn encode_packet(txs: &[Transaction], out: &mut Vec<u8>) -> Result<()> {
    let mut payload = 0;
    for tx in txs {
        payload += tx.encoded_len_signed()?;
    }
    Writer::new(out).write_list_header(payload);
    for tx in txs {
        tx.encode_signed(out)?;
    }
    Ok(())
}

/// The exact signed encoding length, envelope included.
pub(crate) fn signed_encoded_length(tx: &Transaction) -> Result<usize> {
    let sig = tx.signature.as_ref().ok_or(Error::InvalidSignature)?;
    let payload = fields_length(tx)? + sig.rlp_length();
    Ok(match tx.tx_type {
        TxType::Legacy => length::list_length(payload),
        _ => length::string_length(1 + length::list_length(payload)),
    })
}

/// The exact signing-preimage length.
pub(crate) fn unsigned_encoded_length(tx: &Transaction) -> Result<usize> {
    let fields = fields_length(tx)?;
    Ok(match tx.tx_type {
        TxType::Legacy => length::list_length(fields + eip155_suffix_length(tx)),
        _ => 1 + length::list_length(fields),
    })
}

/// Appends the signed encoding of `tx` to `out` and returns the offsets of
/// the written region.
pub(crate) fn encode_signed_into(tx: &Transaction, out: &mut Vec<u8>) -> Result<Offsets> {
    let sig = tx.signature.as_ref().ok_or(Error::InvalidSignature)?;
    let fields_len = fields_length(tx)?;
    let payload = fields_len + sig.rlp_length();
    let mut w = Writer::new(out);

    match tx.tx_type {
        TxType::Legacy => {
            let header = w.write_list_header(payload);
            write_fields(tx, &mut w)?;
            sig.encode(&mut w);
            Ok(Offsets {
                tx_start: 0,
                data_start: header,
                signature_start: header + fields_len,
            })
        }
        TxType::Eip4844 => Err(Error::TxTypeNotSupported),
        _ => {
            let inner = length::list_length(payload);
            let outer = w.write_string_header(1 + inner);
            w.write_byte(u8::from(tx.tx_type));
            let list_header = w.write_list_header(payload);
            write_fields(tx, &mut w)?;
            sig.encode(&mut w);
            let data_start = outer + 1 + list_header;
            Ok(Offsets {
                tx_start: outer,
                data_start,
                signature_start: data_start + fields_len,
            })
        }
    }
}

/// Appends the signing preimage of `tx` to `out`.
///
/// The fields window is spliced out of a cached encoding when one exists;
/// otherwise the fields are encoded and the window is cached for the signed
/// encoder to reuse.
pub(crate) fn encode_unsigned_into(tx: &mut Transaction, out: &mut Vec<u8>) -> Result<()> {
    let fields_len = fields_length(tx)?;
    let fields_start;
    {
        let mut w = Writer::new(out);
        match tx.tx_type {
            TxType::Legacy => {
                w.write_list_header(fields_len + eip155_suffix_length(tx));
            }
            TxType::Eip4844 => return Err(Error::TxTypeNotSupported),
            _ => {
                w.write_byte(u8::from(tx.tx_type));
                w.write_list_header(fields_len);
            }
        }
        fields_start = w.len();
        write_fields(tx, &mut w)?;
        if tx.tx_type.is_legacy() {
            if let Some(id) = tx.chain_id {
                w.write_uint(id);
                w.write_empty_string();
                w.write_empty_string();
            }
        }
    }
    if tx.unsigned_fields.is_none() && tx.signed.is_none() {
        tx.unsigned_fields = Some(Bytes::from(out[fields_start..fields_start + fields_len].to_vec()));
    }
    Ok(())
}

/// The encoded size of the transaction's fields, without envelope, EIP-155
/// suffix or signature.
fn fields_length(tx: &Transaction) -> Result<usize> {
    if let Some(fields) = &tx.unsigned_fields {
        return Ok(fields.len());
    }
    if let Some(layout) = &tx.signed {
        return Ok(layout.fields().len());
    }

    let common = length::uint_length(tx.nonce)
        + length::uint_length(tx.gas_limit)
        + to_length(tx)
        + length::u256_length(&tx.value)
        + length::bytes_length(&tx.input);

    Ok(match tx.tx_type {
        TxType::Legacy => common + length::uint128_length(tx.gas_price.unwrap_or_default()),
        TxType::Eip2930 => {
            length::uint_length(tx.chain_id.unwrap_or_default())
                + common
                + length::uint128_length(tx.gas_price.unwrap_or_default())
                + tx.access_list.length()
        }
        TxType::Eip1559 | TxType::Eip7702 => {
            let mut len = length::uint_length(tx.chain_id.unwrap_or_default())
                + common
                + length::uint128_length(tx.max_priority_fee_per_gas.unwrap_or_default())
                + length::uint128_length(tx.max_fee_per_gas.unwrap_or_default())
                + tx.access_list.length();
            if tx.tx_type.is_eip7702() {
                len += authorization_list_length(tx);
            }
            len
        }
        TxType::Eip4844 => return Err(Error::TxTypeNotSupported),
    })
}

/// Writes the transaction's fields in canonical order, reusing a cached
/// window when one exists.
fn write_fields(tx: &Transaction, w: &mut Writer<'_>) -> Result<usize> {
    if let Some(fields) = &tx.unsigned_fields {
        return Ok(w.write_raw(fields));
    }
    if let Some(layout) = &tx.signed {
        return Ok(w.write_raw(layout.fields()));
    }

    let mut n = 0;
    match tx.tx_type {
        TxType::Legacy => {
            n += w.write_uint(tx.nonce);
            n += w.write_uint128(tx.gas_price.unwrap_or_default());
            n += w.write_uint(tx.gas_limit);
            n += write_to(tx, w);
            n += w.write_u256(&tx.value);
            n += w.write_bytes(&tx.input);
        }
        TxType::Eip2930 => {
            n += w.write_uint(tx.chain_id.unwrap_or_default());
            n += w.write_uint(tx.nonce);
            n += w.write_uint128(tx.gas_price.unwrap_or_default());
            n += w.write_uint(tx.gas_limit);
            n += write_to(tx, w);
            n += w.write_u256(&tx.value);
            n += w.write_bytes(&tx.input);
            n += tx.access_list.encode(w);
        }
        TxType::Eip1559 | TxType::Eip7702 => {
            n += w.write_uint(tx.chain_id.unwrap_or_default());
            n += w.write_uint(tx.nonce);
            n += w.write_uint128(tx.max_priority_fee_per_gas.unwrap_or_default());
            n += w.write_uint128(tx.max_fee_per_gas.unwrap_or_default());
            n += w.write_uint(tx.gas_limit);
            n += write_to(tx, w);
            n += w.write_u256(&tx.value);
            n += w.write_bytes(&tx.input);
            n += tx.access_list.encode(w);
            if tx.tx_type.is_eip7702() {
                n += w.write_list_header(authorization_list_payload(tx));
                for auth in &tx.authorization_list {
                    n += auth.encode(w);
                }
            }
        }
        TxType::Eip4844 => return Err(Error::TxTypeNotSupported),
    }
    Ok(n)
}

fn to_length(tx: &Transaction) -> usize {
    match tx.to {
        Some(_) => crate::eip2930::ADDRESS_RLP_LENGTH,
        None => 1,
    }
}

fn write_to(tx: &Transaction, w: &mut Writer<'_>) -> usize {
    match &tx.to {
        Some(address) => w.write_bytes(address.as_slice()),
        None => w.write_empty_string(),
    }
}

fn eip155_suffix_length(tx: &Transaction) -> usize {
    match tx.chain_id {
        // chain id plus the two empty-string placeholders
        Some(id) => length::uint_length(id) + 2,
        None => 0,
    }
}

fn authorization_list_payload(tx: &Transaction) -> usize {
    tx.authorization_list.iter().map(|auth| auth.length()).sum()
}

fn authorization_list_length(tx: &Transaction) -> usize {
    length::list_length(authorization_list_payload(tx))
}

#[cfg(test)]
mod tests {
    use super::super::TxSignature;
    use super::*;
    use crate::{decode_packet, AccessList};
    use alloy_primitives::{Address, U256};

    fn signed_legacy(input: Bytes) -> Transaction {
        let mut tx = Transaction::legacy(
            Some(1),
            0,
            1,
            21_000,
            Some(Address::ZERO),
            U256::ZERO,
            input,
        );
        tx.set_signature(TxSignature::new(U256::from(37u8), U256::from(2u8), U256::from(3u8)));
        tx
    }

    #[test]
    fn legacy_offsets_point_at_fields_and_signature() {
        let tx = signed_legacy(Bytes::new());
        let mut out = Vec::new();
        let offsets = encode_signed_into(&tx, &mut out).unwrap();

        assert_eq!(offsets.tx_start, 0);
        assert_eq!(offsets.data_start, 1);
        assert_eq!(out[offsets.data_start], 0x80); // nonce = 0
        assert_eq!(out[offsets.signature_start], 0x25); // v = 37
        assert_eq!(out.len(), signed_encoded_length(&tx).unwrap());
    }

    #[test]
    fn typed_offsets_point_at_tag_fields_and_signature() {
        let mut tx = Transaction::eip1559(
            1,
            7,
            2,
            3,
            21_000,
            None,
            U256::ZERO,
            Bytes::new(),
            AccessList::default(),
        );
        tx.set_signature(TxSignature::new(U256::from(1u8), U256::from(2u8), U256::from(3u8)));

        let mut out = Vec::new();
        let offsets = encode_signed_into(&tx, &mut out).unwrap();
        assert_eq!(out[offsets.tx_start], 0x02);
        assert_eq!(out[offsets.data_start], 0x01); // chain_id = 1
        assert_eq!(out[offsets.signature_start], 0x01); // v = 1
        assert_eq!(out.len(), signed_encoded_length(&tx).unwrap());
    }

    #[test]
    fn list_header_transitions_at_56_byte_payload() {
        // sized so the legacy list payload lands exactly on 55, then 56
        let short = signed_legacy(Bytes::from(vec![0xAAu8; 24]));
        let long = signed_legacy(Bytes::from(vec![0xAAu8; 25]));

        let mut out = Vec::new();
        short.encode_signed(&mut out).unwrap();
        assert_eq!(out[0], 0xC0 + 55);
        assert_eq!(out.len(), 56);

        let mut out = Vec::new();
        long.encode_signed(&mut out).unwrap();
        assert_eq!(&out[..2], &[0xF8, 56]);
        assert_eq!(out.len(), 58);

        for tx in [short, long] {
            let mut out = Vec::new();
            tx.encode_signed(&mut out).unwrap();
            let decoded = Transaction::decode(&Bytes::from(out)).unwrap();
            assert_eq!(decoded, tx);
        }
    }

    #[test]
    fn long_input_uses_long_string_header() {
        // a 256-byte calldata crosses the one-byte length-of-length mark
        let tx = signed_legacy(Bytes::from(vec![0x55u8; 256]));
        let mut out = Vec::new();
        tx.encode_signed(&mut out).unwrap();
        let decoded = Transaction::decode(&Bytes::from(out.clone())).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.encoded_len_signed().unwrap(), out.len());
    }

    #[test]
    fn packet_prefix_is_exact() {
        let a = signed_legacy(Bytes::new());
        let b = signed_legacy(Bytes::from(vec![1, 2, 3]));
        let items = a.encoded_len_signed().unwrap() + b.encoded_len_signed().unwrap();

        let mut packet = Vec::new();
        encode_packet(&[a.clone(), b.clone()], &mut packet).unwrap();
        assert_eq!(&packet[..2], &[0xF8, items as u8]);
        assert_eq!(packet.len(), 2 + items);

        let decoded = decode_packet(&Bytes::from(packet)).unwrap();
        assert_eq!(decoded, vec![a, b]);
    }

    #[test]
    fn unsigned_fields_window_feeds_signed_encoding() {
        let mut tx = signed_legacy(Bytes::from(vec![9, 9, 9]));
        let mut reference = Vec::new();
        tx.encode_signed(&mut reference).unwrap();

        // computing the preimage first caches the fields window
        let mut preimage = Vec::new();
        encode_unsigned_into(&mut tx, &mut preimage).unwrap();
        assert!(tx.unsigned_fields.is_some());

        let mut out = Vec::new();
        tx.encode_signed(&mut out).unwrap();
        assert_eq!(out, reference);
    }
}
