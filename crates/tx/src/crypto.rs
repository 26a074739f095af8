//! Secp256k1 signing and recovery over k256.

use crate::{Error, Result};
use alloy_primitives::{keccak256, Address, B256, U256};
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};

/// The order of the secp256k1 curve. Signatures with `r` or `s` outside
/// `[1, n)` are rejected.
pub const SECP256K1N: U256 = U256::from_be_bytes([
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
]);

/// The order of the secp256k1 curve, divided by two. Signatures that should
/// be checked according to [EIP-2] must have an `s` value at most this.
///
/// [EIP-2]: https://eips.ethereum.org/EIPS/eip-2
pub const SECP256K1N_HALF: U256 = U256::from_be_bytes([
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
]);

/// Checks the scalar ranges of a signature: `r` and `s` in `[1, n)` and the
/// parity a plain bit.
///
/// With `homestead` set, the upper half of the `s` range is rejected as well
/// (ECDSA malleability, [EIP-2]).
///
/// [EIP-2]: https://eips.ethereum.org/EIPS/eip-2
pub fn validate_signature_values(parity: u8, r: &U256, s: &U256, homestead: bool) -> bool {
    if r.is_zero() || s.is_zero() {
        return false;
    }
    if homestead && *s > SECP256K1N_HALF {
        return false;
    }
    // frontier rules allow s in the full range
    *r < SECP256K1N && *s < SECP256K1N && (parity == 0 || parity == 1)
}

/// Recovers the signer address from a message digest and the 65-byte
/// signature `pad(r, 32) || pad(s, 32) || parity`.
///
/// The scalar ranges are the caller's responsibility; this only runs the
/// curve recovery and converts the resulting key into an address.
pub fn recover_signer(r: &U256, s: &U256, parity: u8, digest: B256) -> Result<Address> {
    let mut sig = [0u8; 65];
    sig[0..32].copy_from_slice(&r.to_be_bytes::<32>());
    sig[32..64].copy_from_slice(&s.to_be_bytes::<32>());
    sig[64] = parity;

    let mut signature =
        k256::ecdsa::Signature::from_slice(&sig[0..64]).map_err(|_| Error::InvalidSignature)?;
    let mut recid = sig[64];

    // normalize signature and flip recovery id if needed
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recid ^= 1;
    }
    let recid = RecoveryId::from_byte(recid).ok_or(Error::InvalidSignature)?;
    let recovered = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recid)
        .map_err(|_| Error::InvalidSignature)?;
    public_key_to_address(&recovered)
}

/// Signs a message digest with the given secret key, returning the raw
/// `(r, s, recovery_id)` triple.
pub fn sign_message(secret: B256, digest: B256) -> Result<(U256, U256, u8)> {
    let key = SigningKey::from_slice(secret.as_slice()).map_err(|_| Error::InvalidSignature)?;
    let (signature, recid) =
        key.sign_prehash_recoverable(digest.as_slice()).map_err(|_| Error::InvalidSignature)?;
    let (r_bytes, s_bytes) = signature.split_bytes();
    let r = U256::try_from_be_slice(&r_bytes[..]).expect("the slice has at most 32 bytes");
    let s = U256::try_from_be_slice(&s_bytes[..]).expect("the slice has at most 32 bytes");
    Ok((r, s, recid.to_byte()))
}

/// Converts a public key into an ethereum address by hashing its encoded
/// uncompressed form.
///
/// The uncompressed serialization must carry the `0x04` tag byte; anything
/// else is not a valid recovered key.
pub fn public_key_to_address(public: &VerifyingKey) -> Result<Address> {
    let point = public.to_encoded_point(/* compress = */ false);
    let encoded = point.as_bytes();
    if encoded.first() != Some(&0x04) {
        return Err(Error::InvalidPublicKey);
    }
    let hash = keccak256(&encoded[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Derives the address belonging to a secret key.
pub fn secret_to_address(secret: B256) -> Result<Address> {
    let key = SigningKey::from_slice(secret.as_slice()).map_err(|_| Error::InvalidSignature)?;
    public_key_to_address(key.verifying_key())
}
