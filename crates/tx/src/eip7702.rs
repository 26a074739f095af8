//! [EIP-7702] authorization list types.
//!
//! [EIP-7702]: https://eips.ethereum.org/EIPS/eip-7702

use crate::Result;
use alloy_primitives::{Address, U256};
use ethwire_rlp::{length, Cursor, Writer};

use crate::eip2930::ADDRESS_RLP_LENGTH;

/// A signed authorization attaching code to an EOA for the duration of one
/// transaction.
///
/// Encodes as `list[chain_id, address, nonce, y_parity, r, s]`. A y-parity
/// decoded from empty bytes is zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    /// The chain the authorization is valid on; zero means any chain.
    pub chain_id: U256,
    /// The address of the code to attach.
    pub address: Address,
    /// The nonce of the authorizing account.
    #[serde(with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// Signature parity bit.
    #[serde(with = "alloy_serde::quantity")]
    pub y_parity: u8,
    /// Signature scalar `r`.
    pub r: U256,
    /// Signature scalar `s`.
    pub s: U256,
}

impl Authorization {
    /// The encoded size of the tuple's payload.
    pub(crate) fn rlp_payload_length(&self) -> usize {
        length::u256_length(&self.chain_id)
            + ADDRESS_RLP_LENGTH
            + length::uint_length(self.nonce)
            + length::uint_length(self.y_parity as u64)
            + length::u256_length(&self.r)
            + length::u256_length(&self.s)
    }

    /// The full encoded size of the tuple, header included.
    pub(crate) fn length(&self) -> usize {
        length::list_length(self.rlp_payload_length())
    }

    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> usize {
        let mut n = w.write_list_header(self.rlp_payload_length());
        n += w.write_u256(&self.chain_id);
        n += w.write_bytes(self.address.as_slice());
        n += w.write_uint(self.nonce);
        n += w.write_uint(self.y_parity as u64);
        n += w.write_u256(&self.r);
        n += w.write_u256(&self.s);
        n
    }

    pub(crate) fn decode(cur: &mut Cursor<'_>) -> Result<Self> {
        let payload = cur.read_list_header()?;
        let end = cur.position() + payload;

        let chain_id = read_u256(cur)?;
        let address = cur.read_value()?;
        if address.len() != 20 {
            return Err(ethwire_rlp::Error::ValueNotSupported.into());
        }
        let address = Address::from_slice(address);
        let nonce = cur.read_uint()?;
        let y_parity = cur
            .read_uint()?
            .try_into()
            .map_err(|_| ethwire_rlp::Error::ValueNotSupported)?;
        let r = read_u256(cur)?;
        let s = read_u256(cur)?;

        if cur.position() != end {
            return Err(ethwire_rlp::Error::UnexpectedLength.into());
        }
        Ok(Self { chain_id, address, nonce, y_parity, r, s })
    }
}

/// Reads an integer item of at most 32 content bytes.
pub(crate) fn read_u256(cur: &mut Cursor<'_>) -> Result<U256> {
    if cur.is_next_list() {
        return Err(ethwire_rlp::Error::NotAString.into());
    }
    let content = cur.read_value()?;
    if content.len() > 32 || content.first() == Some(&0) {
        return Err(ethwire_rlp::Error::ValueNotSupported.into());
    }
    Ok(U256::from_be_slice(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn tuple_round_trip() {
        let auth = Authorization {
            chain_id: U256::from(1),
            address: address!("6069a6c32cf691f5982febae4faf8a6f3ab2f0f6"),
            nonce: 42,
            y_parity: 1,
            r: U256::from(0x1234),
            s: U256::from(0x5678),
        };
        let mut buf = Vec::new();
        let n = auth.encode(&mut Writer::new(&mut buf));
        assert_eq!(n, auth.length());
        assert_eq!(n, buf.len());

        let decoded = Authorization::decode(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, auth);
    }

    #[test]
    fn zero_parity_is_empty_string() {
        let auth = Authorization {
            chain_id: U256::ZERO,
            address: Address::ZERO,
            nonce: 0,
            y_parity: 0,
            ..Default::default()
        };
        let mut buf = Vec::new();
        auth.encode(&mut Writer::new(&mut buf));
        // chain_id, nonce, y_parity, r and s all encode as 0x80
        assert_eq!(buf[0], 0xC0 + auth.rlp_payload_length() as u8);
        assert_eq!(buf[1], 0x80);
        let decoded = Authorization::decode(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, auth);
    }
}
