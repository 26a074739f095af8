//! Pull-style RLP reader.

use crate::{Error, Result};
use core::ops::Range;

/// A non-consuming view over an immutable byte window with a monotonically
/// advancing position.
///
/// All reads hand out sub-slices of the original window; the cursor never
/// copies. On error the position is left where decoding stopped so callers
/// can report where the input went bad.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `bytes`.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// The absolute position from the start of the window.
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// The number of unread bytes.
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Whether the cursor is exhausted.
    pub const fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Returns the next byte without consuming it.
    pub fn peek_byte(&self) -> Result<u8> {
        self.bytes.get(self.pos).copied().ok_or(Error::Eof)
    }

    /// Returns the next byte and advances past it.
    pub fn read_byte(&mut self) -> Result<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Ok(b)
    }

    /// Returns the next `len` bytes as a borrowed sub-window.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Eof);
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Advances past `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        if self.remaining() < len {
            return Err(Error::Eof);
        }
        self.pos += len;
        Ok(())
    }

    /// Returns an absolute sub-window of the underlying bytes.
    ///
    /// The range is independent of the current position; decoders use this to
    /// retain the raw encoding of an item they have walked through.
    pub fn window(&self, range: Range<usize>) -> Result<&'a [u8]> {
        self.bytes.get(range).ok_or(Error::Eof)
    }

    /// Whether the next byte starts a list.
    pub fn is_next_list(&self) -> bool {
        matches!(self.bytes.get(self.pos), Some(&b) if b >= 0xC0)
    }

    /// Reads a list header and returns the payload length.
    ///
    /// Fails with [`Error::NotAList`] if the next item is a byte string.
    pub fn read_list_header(&mut self) -> Result<usize> {
        let b = self.peek_byte()?;
        match b {
            0xF8.. => {
                self.pos += 1;
                self.read_long_length((b - 0xF7) as usize)
            }
            0xC0.. => {
                self.pos += 1;
                Ok((b - 0xC0) as usize)
            }
            _ => Err(Error::NotAList),
        }
    }

    /// Reads a string header and returns the payload length.
    ///
    /// A single byte below 0x80 is its own encoding: the reported length is 1
    /// and the byte is **not** consumed, so the following value read returns
    /// it as content. Fails with [`Error::NotAString`] on a list prefix.
    pub fn read_string_header(&mut self) -> Result<usize> {
        let b = self.peek_byte()?;
        match b {
            0xC0.. => Err(Error::NotAString),
            0xB8.. => {
                self.pos += 1;
                self.read_long_length((b - 0xB7) as usize)
            }
            0x80.. => {
                self.pos += 1;
                Ok((b - 0x80) as usize)
            }
            _ => Ok(1),
        }
    }

    /// Reads the next item and returns its content as a borrowed sub-window.
    ///
    /// Byte strings yield their contents; lists yield their raw encoded items
    /// for recursive parsing. The canonical single-byte form is enforced: a
    /// one-byte string holding a byte below 0x80 is rejected with
    /// [`Error::SingleByteForbidden`].
    pub fn read_value(&mut self) -> Result<&'a [u8]> {
        let b = self.read_byte()?;
        match b {
            0xF8.. => {
                let len = self.read_long_length((b - 0xF7) as usize)?;
                self.read_slice(len)
            }
            0xC0.. => self.read_slice((b - 0xC0) as usize),
            0xB8.. => {
                let len = self.read_long_length((b - 0xB7) as usize)?;
                self.read_slice(len)
            }
            0x81.. => {
                let content = self.read_slice((b - 0x80) as usize)?;
                if content.len() == 1 && content[0] <= 0x7F {
                    return Err(Error::SingleByteForbidden);
                }
                Ok(content)
            }
            0x80 => Ok(&[]),
            _ => {
                // self-encoding byte; the content is the byte we consumed
                Ok(&self.bytes[self.pos - 1..self.pos])
            }
        }
    }

    /// Reads an integer item into a `u64`.
    ///
    /// Rejects lists, payloads over eight bytes and non-minimal encodings
    /// with a leading zero byte.
    pub fn read_uint(&mut self) -> Result<u64> {
        if self.is_next_list() {
            return Err(Error::NotAString);
        }
        let content = self.read_value()?;
        uint_from_be(content)
    }

    /// Reads a long-form length of `len_of_len` bytes.
    ///
    /// Canonical form only: 1..=8 length bytes, no leading zero, and a value
    /// that would not have fit the short form.
    fn read_long_length(&mut self, len_of_len: usize) -> Result<usize> {
        if len_of_len == 0 || len_of_len > 8 {
            return Err(Error::UnexpectedLength);
        }
        let bytes = self.read_slice(len_of_len)?;
        if bytes[0] == 0 {
            return Err(Error::UnexpectedLength);
        }
        let mut len = 0u64;
        for &b in bytes {
            len = len << 8 | u64::from(b);
        }
        if len < 56 {
            return Err(Error::UnexpectedLength);
        }
        usize::try_from(len).map_err(|_| Error::UnexpectedLength)
    }
}

/// Folds a minimal big-endian byte string into a `u64`.
pub(crate) fn uint_from_be(content: &[u8]) -> Result<u64> {
    if content.len() > 8 {
        return Err(Error::ValueNotSupported);
    }
    if content.first() == Some(&0) {
        return Err(Error::ValueNotSupported);
    }
    let mut v = 0u64;
    for &b in content {
        v = v << 8 | u64::from(b);
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_self_encoding_byte() {
        let mut cur = Cursor::new(&[0x7F]);
        assert_eq!(cur.read_string_header(), Ok(1));
        // the header read must not consume the self-encoding byte
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.read_value(), Ok(&[0x7F][..]));
        assert!(cur.is_empty());
    }

    #[test]
    fn reads_short_and_long_strings() {
        let mut cur = Cursor::new(&[0x83, b'a', b'b', b'c']);
        assert_eq!(cur.read_value(), Ok(&b"abc"[..]));

        let mut encoded = vec![0xB8, 60];
        encoded.extend(core::iter::repeat(0xAB).take(60));
        let mut cur = Cursor::new(&encoded);
        assert_eq!(cur.read_string_header(), Ok(60));
        assert_eq!(cur.read_slice(60).unwrap().len(), 60);
    }

    #[test]
    fn reads_list_headers() {
        let mut cur = Cursor::new(&[0xC3, 0x01, 0x02, 0x03]);
        assert_eq!(cur.read_list_header(), Ok(3));

        let mut encoded = vec![0xF9, 0x01, 0x00];
        encoded.extend(core::iter::repeat(0u8).take(256));
        let mut cur = Cursor::new(&encoded);
        assert_eq!(cur.read_list_header(), Ok(256));
    }

    #[test]
    fn rejects_mismatched_shapes() {
        assert_eq!(Cursor::new(&[0x83]).read_list_header(), Err(Error::NotAList));
        assert_eq!(Cursor::new(&[0xC3]).read_string_header(), Err(Error::NotAString));
    }

    #[test]
    fn rejects_single_byte_in_string_header() {
        let mut cur = Cursor::new(&[0x81, 0x05]);
        assert_eq!(cur.read_value(), Err(Error::SingleByteForbidden));
        // 0x80 and above must stay legal in the one-byte form
        let mut cur = Cursor::new(&[0x81, 0x80]);
        assert_eq!(cur.read_value(), Ok(&[0x80][..]));
    }

    #[test]
    fn rejects_non_canonical_lengths() {
        // long form used for a length that fits the short form
        let mut cur = Cursor::new(&[0xB8, 0x05, 1, 2, 3, 4, 5]);
        assert_eq!(cur.read_value(), Err(Error::UnexpectedLength));
        // leading zero in the length bytes
        let mut cur = Cursor::new(&[0xB9, 0x00, 0x38]);
        assert_eq!(cur.read_value(), Err(Error::UnexpectedLength));
    }

    #[test]
    fn truncated_input_is_eof() {
        let mut cur = Cursor::new(&[0x85, 1, 2]);
        assert_eq!(cur.read_value(), Err(Error::Eof));
        let mut cur = Cursor::new(&[]);
        assert_eq!(cur.read_byte(), Err(Error::Eof));
        let mut cur = Cursor::new(&[0xF9]);
        assert_eq!(cur.read_list_header(), Err(Error::Eof));
    }

    #[test]
    fn uint_decoding() {
        let mut cur = Cursor::new(&[0x80]);
        assert_eq!(cur.read_uint(), Ok(0));
        let mut cur = Cursor::new(&[0x09]);
        assert_eq!(cur.read_uint(), Ok(9));
        let mut cur = Cursor::new(&[0x82, 0x04, 0x00]);
        assert_eq!(cur.read_uint(), Ok(1024));
        // leading zero is non-minimal
        let mut cur = Cursor::new(&[0x82, 0x00, 0x01]);
        assert_eq!(cur.read_uint(), Err(Error::ValueNotSupported));
        // nine content bytes overflow a u64
        let mut cur = Cursor::new(&[0x89, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(cur.read_uint(), Err(Error::ValueNotSupported));
    }

    #[test]
    fn nested_list_value_is_raw_children() {
        // [[1, 2], 3] -> outer value read yields the encoded children
        let bytes = [0xC4, 0xC2, 0x01, 0x02, 0x03];
        let mut cur = Cursor::new(&bytes);
        let children = cur.read_value().unwrap();
        assert_eq!(children, &[0xC2, 0x01, 0x02, 0x03]);
        let mut inner = Cursor::new(children);
        assert!(inner.is_next_list());
        assert_eq!(inner.read_value(), Ok(&[0x01, 0x02][..]));
    }
}
