//! Exact RLP item sizing.
//!
//! Every encoder in this workspace measures its payload bottom-up with these
//! functions, writes the outer prefix, then the contents. Nothing is ever
//! re-measured or re-emitted.

use alloy_primitives::U256;

/// Returns the minimal big-endian byte count of `v`, with zero taking one
/// byte.
///
/// This is the length-prefix path: a length of zero still occupies a byte on
/// the wire.
pub const fn length_of_uint(v: u64) -> usize {
    if v == 0 {
        1
    } else {
        (64 - v.leading_zeros() as usize).div_ceil(8)
    }
}

/// Returns the number of header bytes needed for a payload of `len` bytes.
///
/// One byte for payloads under 56 bytes, otherwise the length-of-length
/// marker plus the big-endian length itself.
pub const fn length_of_length(len: usize) -> usize {
    if len < 56 {
        1
    } else {
        1 + length_of_uint(len as u64)
    }
}

/// Returns the full encoded size of a byte string with `len` content bytes.
///
/// Does not apply the single-byte shortcut; use [`bytes_length`] when the
/// content is at hand.
pub const fn string_length(len: usize) -> usize {
    length_of_length(len) + len
}

/// Returns the full encoded size of a list whose items occupy `len` bytes.
pub const fn list_length(len: usize) -> usize {
    length_of_length(len) + len
}

/// Returns the encoded size of `data` as a byte-string item.
///
/// A single byte below 0x80 encodes as itself; the empty string is the one
/// prefix byte.
pub const fn bytes_length(data: &[u8]) -> usize {
    if data.len() == 1 && data[0] <= 0x7F {
        1
    } else {
        string_length(data.len())
    }
}

/// Returns the encoded size of `v` as an integer item.
///
/// Integers encode as their minimal big-endian string: zero is the empty
/// string, values up to 0x7F are the self-encoding byte.
pub const fn uint_length(v: u64) -> usize {
    if v <= 0x7F {
        1
    } else {
        1 + length_of_uint(v)
    }
}

/// Returns the minimal big-endian byte count of `v`, with zero taking one
/// byte.
pub const fn length_of_uint128(v: u128) -> usize {
    if v == 0 {
        1
    } else {
        (128 - v.leading_zeros() as usize).div_ceil(8)
    }
}

/// Returns the encoded size of `v` as an integer item.
pub const fn uint128_length(v: u128) -> usize {
    if v <= 0x7F {
        1
    } else {
        1 + length_of_uint128(v)
    }
}

/// Returns the minimal big-endian byte count of `v`, zero taking no bytes.
pub fn length_of_u256(v: &U256) -> usize {
    v.bit_len().div_ceil(8)
}

/// Returns the encoded size of `v` as an integer item.
pub fn u256_length(v: &U256) -> usize {
    let len = length_of_u256(v);
    if len <= 1 && v.as_limbs()[0] <= 0x7F {
        1
    } else {
        1 + len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_prefix_lengths() {
        assert_eq!(length_of_uint(0), 1);
        assert_eq!(length_of_uint(0x7F), 1);
        assert_eq!(length_of_uint(0xFF), 1);
        assert_eq!(length_of_uint(0x100), 2);
        assert_eq!(length_of_uint(0xFFFF), 2);
        assert_eq!(length_of_uint(0x1_0000), 3);
        assert_eq!(length_of_uint(u64::MAX), 8);
    }

    #[test]
    fn header_size_at_short_long_boundary() {
        assert_eq!(length_of_length(0), 1);
        assert_eq!(length_of_length(55), 1);
        assert_eq!(length_of_length(56), 2);
        assert_eq!(length_of_length(255), 2);
        assert_eq!(length_of_length(256), 3);
        assert_eq!(length_of_length(65_535), 3);
        assert_eq!(length_of_length(65_536), 4);
    }

    #[test]
    fn integer_item_sizes() {
        assert_eq!(uint_length(0), 1); // 0x80
        assert_eq!(uint_length(0x7F), 1); // self-encoding
        assert_eq!(uint_length(0x80), 2); // 0x81 0x80
        assert_eq!(uint_length(0x100), 3);

        assert_eq!(uint128_length(0), 1);
        assert_eq!(uint128_length(0x80), 2);
        assert_eq!(uint128_length(u128::MAX), 17);

        assert_eq!(u256_length(&U256::ZERO), 1);
        assert_eq!(u256_length(&U256::from(0x7F)), 1);
        assert_eq!(u256_length(&U256::from(0x80)), 2);
        assert_eq!(u256_length(&U256::MAX), 33);
    }

    #[test]
    fn string_item_sizes() {
        assert_eq!(bytes_length(&[]), 1);
        assert_eq!(bytes_length(&[0x7F]), 1);
        assert_eq!(bytes_length(&[0x80]), 2);
        assert_eq!(bytes_length(&[0u8; 55]), 56);
        assert_eq!(bytes_length(&[0u8; 56]), 58);
        assert_eq!(list_length(55), 56);
        assert_eq!(list_length(56), 58);
    }
}
