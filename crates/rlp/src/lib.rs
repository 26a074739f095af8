//! Recursive length prefix (RLP) primitives for the Ethereum wire format.
//!
//! The crate is split along the data flow of a codec:
//!
//! - [`length`] — pure functions that measure items bottom-up, so encoders can
//!   emit the outer prefix before the contents in a single pass.
//! - [`Cursor`] — a pull-style reader over an immutable byte window that hands
//!   out borrowed sub-windows and never copies.
//! - [`Writer`] — a push-style encoder appending to a growable buffer, with
//!   every operation reporting the number of bytes it emitted.

mod cursor;
pub use cursor::Cursor;

mod error;
pub use error::{Error, Result};

pub mod length;

mod writer;
pub use writer::Writer;

/// The RLP prefix of an empty byte string, also the encoding of the integer 0.
pub const EMPTY_STRING_CODE: u8 = 0x80;

/// The RLP prefix of an empty list.
pub const EMPTY_LIST_CODE: u8 = 0xC0;
