//! Transaction codec errors.

/// Transaction codec result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced at the transaction boundary.
///
/// Inside packet decoding an unrecognized type tag is skipped, not surfaced;
/// every other decoding failure aborts the current decode with the cursor
/// left at the failing position. Recovery failures are reported and never
/// retried; they do not poison the record for re-encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A length-prefix level failure.
    #[error(transparent)]
    Rlp(#[from] ethwire_rlp::Error),
    /// The transaction type tag is not one this codec materializes.
    #[error("tx type not supported")]
    TxTypeNotSupported,
    /// Signature values are missing or outside the valid scalar ranges.
    #[error("invalid signature")]
    InvalidSignature,
    /// Recovery produced a point that is not a valid uncompressed public key.
    #[error("invalid public key")]
    InvalidPublicKey,
}
