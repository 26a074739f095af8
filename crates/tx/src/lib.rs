//! Ethereum wire-format transaction codec.
//!
//! Decodes byte streams carrying typed transactions (legacy, [EIP-2930],
//! [EIP-1559], [EIP-7702], with forward-compatible skipping of unknown
//! types) into [`Transaction`] records, re-encodes both the signed and the
//! signing-preimage forms byte-exactly, computes transaction hashes over the
//! retained input window and recovers senders from signatures.
//!
//! Decoding borrows into the input wherever possible: records keep zero-copy
//! windows of the original buffer plus the cursor offsets needed to hash
//! without re-serializing. Encoding writes into caller-supplied buffers,
//! sized exactly by a bottom-up length pass.
//!
//! [EIP-2930]: https://eips.ethereum.org/EIPS/eip-2930
//! [EIP-1559]: https://eips.ethereum.org/EIPS/eip-1559
//! [EIP-7702]: https://eips.ethereum.org/EIPS/eip-7702

pub mod crypto;

mod eip2930;
pub use eip2930::{AccessList, AccessListItem, ADDRESS_RLP_LENGTH, STORAGE_KEY_RLP_LENGTH};

mod eip7702;
pub use eip7702::Authorization;

mod error;
pub use error::{Error, Result};

mod raw;
pub use raw::{decode_raw_packet, RawTx};

mod transaction;
pub use transaction::{decode_packet, encode_packet, SignedLayout, Transaction, TxSignature};

mod tx_type;
pub use tx_type::TxType;
