//! Push-style RLP encoder.

use crate::{length, EMPTY_LIST_CODE, EMPTY_STRING_CODE};
use alloy_primitives::U256;

/// A thin wrapper over a growable byte buffer.
///
/// Every operation returns the number of bytes it emitted so the caller can
/// maintain offsets into the output while encoding. The buffer grows on
/// demand; writes are infallible.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> Writer<'a> {
    /// Wraps the caller's buffer. Output is appended; existing contents are
    /// left untouched.
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    /// The number of bytes written to the underlying buffer so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends a single raw byte.
    pub fn write_byte(&mut self, b: u8) -> usize {
        self.buf.push(b);
        1
    }

    /// Appends raw bytes with no prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) -> usize {
        self.buf.extend_from_slice(bytes);
        bytes.len()
    }

    /// Emits the canonical header for a byte string of `len` content bytes.
    pub fn write_string_header(&mut self, len: usize) -> usize {
        if len < 56 {
            self.write_byte(0x80 + len as u8)
        } else {
            let marker = self.write_byte(0xB7 + length::length_of_uint(len as u64) as u8);
            marker + self.write_be(len as u64)
        }
    }

    /// Emits the canonical header for a list whose items occupy `len` bytes.
    pub fn write_list_header(&mut self, len: usize) -> usize {
        if len < 56 {
            self.write_byte(0xC0 + len as u8)
        } else {
            let marker = self.write_byte(0xF7 + length::length_of_uint(len as u64) as u8);
            marker + self.write_be(len as u64)
        }
    }

    /// Emits `data` as a byte-string item, applying the single-byte shortcut.
    pub fn write_bytes(&mut self, data: &[u8]) -> usize {
        if data.len() == 1 && data[0] <= 0x7F {
            self.write_byte(data[0])
        } else {
            let header = self.write_string_header(data.len());
            header + self.write_raw(data)
        }
    }

    /// Emits `v` as an integer item: the minimal big-endian string, empty for
    /// zero.
    pub fn write_uint(&mut self, v: u64) -> usize {
        if v == 0 {
            self.write_empty_string()
        } else if v <= 0x7F {
            self.write_byte(v as u8)
        } else {
            let header = self.write_byte(0x80 + length::length_of_uint(v) as u8);
            header + self.write_be(v)
        }
    }

    /// Emits `v` as an integer item: the minimal big-endian string, empty for
    /// zero.
    pub fn write_uint128(&mut self, v: u128) -> usize {
        if v == 0 {
            self.write_empty_string()
        } else if v <= 0x7F {
            self.write_byte(v as u8)
        } else {
            let len = length::length_of_uint128(v);
            let header = self.write_byte(0x80 + len as u8);
            let be = v.to_be_bytes();
            self.buf.extend_from_slice(&be[16 - len..]);
            header + len
        }
    }

    /// Emits `v` as an integer item, dropping leading zero bytes.
    pub fn write_u256(&mut self, v: &U256) -> usize {
        let len = length::length_of_u256(v);
        let be = v.to_be_bytes::<32>();
        self.write_bytes(&be[32 - len..])
    }

    /// Emits the encoding of the empty string (also the integer 0).
    pub fn write_empty_string(&mut self) -> usize {
        self.write_byte(EMPTY_STRING_CODE)
    }

    /// Emits the encoding of the empty list.
    pub fn write_empty_list(&mut self) -> usize {
        self.write_byte(EMPTY_LIST_CODE)
    }

    /// Appends the minimal big-endian representation of `v`, nothing for
    /// zero.
    fn write_be(&mut self, v: u64) -> usize {
        let len = if v == 0 { 0 } else { length::length_of_uint(v) };
        let be = v.to_be_bytes();
        self.buf.extend_from_slice(&be[8 - len..]);
        len
    }
}
