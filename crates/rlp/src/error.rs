//! RLP decoding errors.

/// RLP result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced while reading or writing RLP items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input ended before the declared length of an item.
    #[error("unexpected end of input")]
    Eof,
    /// Expected a list prefix, found a byte string.
    #[error("not a list")]
    NotAList,
    /// Expected a byte string, found a list prefix.
    #[error("not a string")]
    NotAString,
    /// A length-of-length outside 1..=8, or a non-canonical long-form length.
    #[error("unexpected length")]
    UnexpectedLength,
    /// A decoded value does not fit the domain of the field it was read for.
    #[error("value not supported")]
    ValueNotSupported,
    /// A single byte below 0x80 wrapped in a one-byte string header.
    #[error("cannot be a single byte")]
    SingleByteForbidden,
}
