//! The Ethereum transaction type identifier.

use crate::Error;
use core::fmt;

/// Transaction type tags as specified in EIPs [2718], [2930], [1559], [4844]
/// and [7702].
///
/// EIP-4844 blob transactions are recognized for forward-compatible handling
/// of packets but are not materialized by this codec.
///
/// [2718]: https://eips.ethereum.org/EIPS/eip-2718
/// [2930]: https://eips.ethereum.org/EIPS/eip-2930
/// [1559]: https://eips.ethereum.org/EIPS/eip-1559
/// [4844]: https://eips.ethereum.org/EIPS/eip-4844
/// [7702]: https://eips.ethereum.org/EIPS/eip-7702
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TxType {
    /// Legacy transaction type.
    #[default]
    Legacy = 0,
    /// EIP-2930 access list transaction type.
    Eip2930 = 1,
    /// EIP-1559 dynamic fee transaction type.
    Eip1559 = 2,
    /// EIP-4844 blob transaction type.
    Eip4844 = 3,
    /// EIP-7702 set code transaction type.
    Eip7702 = 4,
}

impl TxType {
    /// Returns true if the transaction type is Legacy.
    #[inline]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Returns true if the transaction type is EIP-2930.
    #[inline]
    pub const fn is_eip2930(&self) -> bool {
        matches!(self, Self::Eip2930)
    }

    /// Returns true if the transaction type is EIP-1559.
    #[inline]
    pub const fn is_eip1559(&self) -> bool {
        matches!(self, Self::Eip1559)
    }

    /// Returns true if the transaction type is EIP-4844.
    #[inline]
    pub const fn is_eip4844(&self) -> bool {
        matches!(self, Self::Eip4844)
    }

    /// Returns true if the transaction type is EIP-7702.
    #[inline]
    pub const fn is_eip7702(&self) -> bool {
        matches!(self, Self::Eip7702)
    }

    /// Returns true if the transaction type prices gas with a tip and fee
    /// cap.
    #[inline]
    pub const fn is_dynamic_fee(&self) -> bool {
        matches!(self, Self::Eip1559 | Self::Eip4844 | Self::Eip7702)
    }

    /// Returns true if transactions of this type are bare RLP lists on the
    /// wire rather than type-tagged byte strings.
    #[inline]
    pub const fn is_list_encoded(&self) -> bool {
        self.is_legacy()
    }
}

impl From<TxType> for u8 {
    fn from(value: TxType) -> Self {
        value as Self
    }
}

impl TryFrom<u8> for TxType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Legacy,
            1 => Self::Eip2930,
            2 => Self::Eip1559,
            3 => Self::Eip4844,
            4 => Self::Eip7702,
            _ => return Err(Error::TxTypeNotSupported),
        })
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "Legacy"),
            Self::Eip2930 => write!(f, "EIP-2930"),
            Self::Eip1559 => write!(f, "EIP-1559"),
            Self::Eip4844 => write!(f, "EIP-4844"),
            Self::Eip7702 => write!(f, "EIP-7702"),
        }
    }
}

impl PartialEq<u8> for TxType {
    fn eq(&self, other: &u8) -> bool {
        (*self as u8) == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_tags() {
        for tag in 0u8..=4 {
            assert_eq!(u8::from(TxType::try_from(tag).unwrap()), tag);
        }
    }

    #[test]
    fn rejects_unknown_tags() {
        assert_eq!(TxType::try_from(0x05), Err(Error::TxTypeNotSupported));
        assert_eq!(TxType::try_from(0x7F), Err(Error::TxTypeNotSupported));
    }
}
