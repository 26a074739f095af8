//! [EIP-2930] access list types.
//!
//! [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930

use crate::Result;
use alloy_primitives::{Address, B256};
use ethwire_rlp::{length, Cursor, Writer};

/// Encoded size of a 20-byte address item: the fixed `0x94` prefix plus the
/// address.
pub const ADDRESS_RLP_LENGTH: usize = 1 + 20;

/// Encoded size of a 32-byte storage key item: the fixed `0xA0` prefix plus
/// the key.
pub const STORAGE_KEY_RLP_LENGTH: usize = 1 + 32;

/// An address and the storage keys the transaction plans to access under it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    /// Account address that would be loaded at the start of execution.
    pub address: Address,
    /// Keys of storage that would be loaded at the start of execution.
    pub storage_keys: Vec<B256>,
}

impl AccessListItem {
    /// The encoded size of the tuple's payload; both items are fixed-width.
    pub(crate) fn rlp_payload_length(&self) -> usize {
        ADDRESS_RLP_LENGTH + length::list_length(self.storage_keys.len() * STORAGE_KEY_RLP_LENGTH)
    }

    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> usize {
        let mut n = w.write_list_header(self.rlp_payload_length());
        n += w.write_bytes(self.address.as_slice());
        n += w.write_list_header(self.storage_keys.len() * STORAGE_KEY_RLP_LENGTH);
        for key in &self.storage_keys {
            n += w.write_bytes(key.as_slice());
        }
        n
    }

    pub(crate) fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let payload = cur.read_list_header()?;
        let end = cur.position() + payload;

        let address = cur.read_value()?;
        if address.len() != 20 {
            return Err(ethwire_rlp::Error::ValueNotSupported.into());
        }
        let address = Address::from_slice(address);

        let mut storage_keys = Vec::new();
        let keys_payload = cur.read_list_header()?;
        let keys_end = cur.position() + keys_payload;
        while cur.position() < keys_end {
            let key = cur.read_value()?;
            if key.len() != 32 {
                return Err(ethwire_rlp::Error::ValueNotSupported.into());
            }
            storage_keys.push(B256::from_slice(key));
        }

        if cur.position() != end {
            return Err(ethwire_rlp::Error::UnexpectedLength.into());
        }
        Ok(Self { address, storage_keys })
    }
}

/// The ordered access list declared by an [EIP-2930] or later transaction.
///
/// The empty list encodes as the single byte `0xC0`, and the same byte is
/// emitted when the field is semantically absent from the record.
///
/// [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessList(pub Vec<AccessListItem>);

impl AccessList {
    /// Whether the list has no tuples.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of tuples in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The encoded size of the tuples, without the outer list header.
    pub(crate) fn rlp_payload_length(&self) -> usize {
        self.0.iter().map(|item| length::list_length(item.rlp_payload_length())).sum()
    }

    /// The full encoded size of the list, header included.
    pub(crate) fn length(&self) -> usize {
        length::list_length(self.rlp_payload_length())
    }

    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> usize {
        let mut n = w.write_list_header(self.rlp_payload_length());
        for item in &self.0 {
            n += item.encode(w);
        }
        n
    }

    pub(crate) fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let payload = cur.read_list_header()?;
        let end = cur.position() + payload;
        let mut items = Vec::new();
        while cur.position() < end {
            items.push(AccessListItem::decode(cur)?);
        }
        if cur.position() != end {
            return Err(ethwire_rlp::Error::UnexpectedLength.into());
        }
        Ok(Self(items))
    }
}

impl From<Vec<AccessListItem>> for AccessList {
    fn from(items: Vec<AccessListItem>) -> Self {
        Self(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use alloy_primitives::{address, b256};

    #[test]
    fn empty_list_is_one_byte() {
        let list = AccessList::default();
        assert_eq!(list.length(), 1);
        let mut buf = Vec::new();
        list.encode(&mut Writer::new(&mut buf));
        assert_eq!(buf, [0xC0]);
    }

    #[test]
    fn single_tuple_layout() {
        let list = AccessList(vec![AccessListItem {
            address: address!("0001020304050000000000000000000000000000"),
            storage_keys: vec![b256!(
                "000102030405060708090a0b0c0d0e0f00000000000000000000000000000000"
            )],
        }]);

        let mut buf = Vec::new();
        let n = list.encode(&mut Writer::new(&mut buf));
        assert_eq!(n, buf.len());
        assert_eq!(n, list.length());

        // list[ list[ 0x94 || address, list[ 0xA0 || key ] ] ]
        assert_eq!(&buf[..3], &[0xF8, 56, 0xF7]);
        assert_eq!(buf[3], 0x94);
        assert_eq!(buf[24], 0xC0 + 33);
        assert_eq!(buf[25], 0xA0);

        let mut cur = Cursor::new(&buf);
        let decoded = AccessList::decode(&mut cur).unwrap();
        assert_eq!(decoded, list);
        assert!(cur.is_empty());
    }

    #[test]
    fn rejects_malformed_address_width() {
        // a 6-byte address inside a tuple
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_list_header(9);
        w.write_list_header(8);
        w.write_bytes(&[0, 1, 2, 3, 4, 5]);
        w.write_empty_list();
        let err = AccessList::decode(&mut Cursor::new(&buf)).unwrap_err();
        assert_eq!(err, Error::Rlp(ethwire_rlp::Error::ValueNotSupported));
    }
}
