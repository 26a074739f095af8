//! A lightweight transaction record for ingest paths that filter by type or
//! hash before committing to a full decode.
//!
//! [`RawTx`] walks just enough of an item to classify it: the envelope, the
//! type tag and (for typed transactions) the leading chain id field. The
//! fields are never materialized; the record keeps the raw byte window and
//! the offset the hasher starts at.

use crate::{Result, TxType};
use alloy_primitives::{keccak256, Bytes, ChainId, B256};
use ethwire_rlp::Cursor;

/// A transaction kept as raw bytes plus the minimum decoded to classify it.
#[derive(Clone, Debug)]
pub struct RawTx {
    tx_type: TxType,
    bytes: Bytes,
    chain_id: Option<ChainId>,
    tx_start: usize,
    hash: Option<B256>,
}

impl RawTx {
    /// The transaction type tag.
    pub const fn tx_type(&self) -> TxType {
        self.tx_type
    }

    /// The raw wire encoding, envelope included.
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The chain id, when it was cheap to capture: the leading field of a
    /// typed transaction. Legacy items never carry it here.
    pub const fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// Offset of the first byte the hasher digests.
    pub const fn tx_start(&self) -> usize {
        self.tx_start
    }

    /// The transaction hash, computed lazily over `bytes[tx_start..]`.
    pub fn hash(&mut self) -> B256 {
        if let Some(hash) = self.hash {
            return hash;
        }
        let hash = keccak256(&self.bytes[self.tx_start..]);
        self.hash = Some(hash);
        hash
    }
}

/// Decodes a packet into raw records without materializing fields.
///
/// Unrecognized type tags are skipped and omitted, the same
/// forward-compatibility rule as the full packet decoder; EIP-4844 blob
/// items are kept as raw records.
pub fn decode_raw_packet(buf: &Bytes) -> Result<Vec<RawTx>> {
    let mut cur = Cursor::new(buf.as_ref());
    let payload = cur.read_list_header()?;
    if cur.remaining() < payload {
        return Err(ethwire_rlp::Error::Eof.into());
    }
    let start = cur.position();

    let mut txs = Vec::new();
    while cur.position() - start < payload {
        if let Some(tx) = decode_raw(&mut cur, buf)? {
            txs.push(tx);
        }
    }
    if cur.position() - start != payload {
        return Err(ethwire_rlp::Error::UnexpectedLength.into());
    }
    Ok(txs)
}

/// Decodes one item, returning `None` for skipped unknown types.
fn decode_raw(cur: &mut Cursor<'_>, buf: &Bytes) -> Result<Option<RawTx>> {
    if cur.is_next_list() {
        let region_start = cur.position();
        let payload = cur.read_list_header()?;
        cur.skip(payload)?;
        let bytes = buf.slice(region_start..cur.position());
        return Ok(Some(RawTx {
            tx_type: TxType::Legacy,
            bytes,
            chain_id: None,
            tx_start: 0,
            hash: None,
        }));
    }

    let region_start = cur.position();
    let envelope = cur.read_string_header()?;
    if cur.remaining() < envelope {
        return Err(ethwire_rlp::Error::Eof.into());
    }
    let tx_start = cur.position() - region_start;
    if envelope == 0 {
        return Ok(None);
    }
    let tag = cur.read_byte()?;

    match TxType::try_from(tag) {
        Ok(tx_type) if !tx_type.is_legacy() => {
            let payload = cur.read_list_header()?;
            let fields_start = cur.position();
            let chain_id = capture_chain_id(cur.read_value()?);
            let consumed = cur.position() - fields_start;
            if consumed > payload {
                return Err(ethwire_rlp::Error::UnexpectedLength.into());
            }
            cur.skip(payload - consumed)?;

            if cur.position() - region_start != tx_start + envelope {
                return Err(ethwire_rlp::Error::UnexpectedLength.into());
            }
            let bytes = buf.slice(region_start..cur.position());
            Ok(Some(RawTx { tx_type, bytes, chain_id, tx_start, hash: None }))
        }
        _ => {
            cur.skip(envelope - 1)?;
            Ok(None)
        }
    }
}

/// Folds the leading chain id field when it fits a `u64`.
fn capture_chain_id(content: &[u8]) -> Option<ChainId> {
    if content.len() > 8 {
        return None;
    }
    let mut id = 0u64;
    for &b in content {
        id = id << 8 | u64::from(b);
    }
    Some(id)
}
