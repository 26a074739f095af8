//! The wire transaction record.
//!
//! A [`Transaction`] either originates from decoding signed wire bytes, in
//! which case it retains the original byte window plus the offsets needed to
//! hash without re-serializing, or it is assembled field by field for
//! signing. Semantic fields are behind accessors; every mutation invalidates
//! the cached encodings and hashes.

mod decode;
pub use decode::decode_packet;

mod encode;
pub use encode::encode_packet;

mod json;

use crate::{crypto, AccessList, Authorization, Error, Result, TxType};
use alloy_primitives::{keccak256, Address, Bytes, ChainId, B256, U256};
use ethwire_rlp::{length, Writer};

/// Raw signature values exactly as they appear on the wire.
///
/// For legacy transactions `v` carries the EIP-155 chain id; for typed
/// transactions it is the bare y-parity and encodes as the empty string when
/// zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxSignature {
    /// Recovery value.
    pub v: U256,
    /// Signature scalar `r`.
    pub r: U256,
    /// Signature scalar `s`.
    pub s: U256,
}

impl TxSignature {
    /// Creates a signature from its raw wire values.
    pub const fn new(v: U256, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// The encoded size of the three integer items.
    pub(crate) fn rlp_length(&self) -> usize {
        length::u256_length(&self.v) + length::u256_length(&self.r) + length::u256_length(&self.s)
    }

    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> usize {
        w.write_u256(&self.v) + w.write_u256(&self.r) + w.write_u256(&self.s)
    }
}

/// The signed encoding of a transaction together with the cursor offsets
/// into it.
///
/// The offsets let the signed hash be computed over `bytes[tx_start..]`
/// without re-serializing, and the signing preimage be reconstituted by
/// splicing `bytes[data_start..signature_start]` into the per-type envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedLayout {
    bytes: Bytes,
    tx_start: usize,
    data_start: usize,
    signature_start: usize,
}

impl SignedLayout {
    pub(crate) const fn new(
        bytes: Bytes,
        tx_start: usize,
        data_start: usize,
        signature_start: usize,
    ) -> Self {
        Self { bytes, tx_start, data_start, signature_start }
    }

    /// The full signed encoding, envelope included.
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Offset of the first content byte: the type tag for typed
    /// transactions, 0 for legacy.
    pub const fn tx_start(&self) -> usize {
        self.tx_start
    }

    /// Offset of the first field inside the fields list.
    pub const fn data_start(&self) -> usize {
        self.data_start
    }

    /// Offset of the `v` signature field.
    pub const fn signature_start(&self) -> usize {
        self.signature_start
    }

    /// The region the transaction hash digests.
    pub(crate) fn hashable(&self) -> &[u8] {
        &self.bytes[self.tx_start..]
    }

    /// The encoded fields without envelope or signature, shared between the
    /// signed form and the signing preimage.
    pub(crate) fn fields(&self) -> &[u8] {
        &self.bytes[self.data_start..self.signature_start]
    }
}

/// An Ethereum wire-format transaction of any supported type.
///
/// Field presence follows the type: `gas_price` for legacy and EIP-2930,
/// the tip/fee cap pair for EIP-1559 and EIP-7702, the authorization list
/// for EIP-7702 only. EIP-4844 blob transactions are recognized in packets
/// but never materialized as this record.
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    pub(crate) tx_type: TxType,
    pub(crate) chain_id: Option<ChainId>,
    pub(crate) nonce: u64,
    pub(crate) gas_limit: u64,
    pub(crate) gas_price: Option<u128>,
    pub(crate) max_priority_fee_per_gas: Option<u128>,
    pub(crate) max_fee_per_gas: Option<u128>,
    pub(crate) to: Option<Address>,
    pub(crate) value: U256,
    pub(crate) input: Bytes,
    pub(crate) access_list: AccessList,
    pub(crate) authorization_list: Vec<Authorization>,
    pub(crate) signature: Option<TxSignature>,

    // caches; all invalidated on any semantic mutation
    pub(crate) signed: Option<SignedLayout>,
    pub(crate) unsigned_fields: Option<Bytes>,
    pub(crate) signed_hash: Option<B256>,
    pub(crate) unsigned_hash: Option<B256>,
    pub(crate) from: Option<Address>,
}

/// Structural equality on semantic fields; caches are not compared.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.tx_type == other.tx_type
            && self.chain_id == other.chain_id
            && self.nonce == other.nonce
            && self.gas_limit == other.gas_limit
            && self.gas_price == other.gas_price
            && self.max_priority_fee_per_gas == other.max_priority_fee_per_gas
            && self.max_fee_per_gas == other.max_fee_per_gas
            && self.to == other.to
            && self.value == other.value
            && self.input == other.input
            && self.access_list == other.access_list
            && self.authorization_list == other.authorization_list
            && self.signature == other.signature
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// Creates an unsigned legacy transaction.
    ///
    /// A present `chain_id` selects EIP-155 replay protection; `None` keeps
    /// the pre-EIP-155 signing preimage.
    pub fn legacy(
        chain_id: Option<ChainId>,
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        input: Bytes,
    ) -> Self {
        Self {
            tx_type: TxType::Legacy,
            chain_id,
            nonce,
            gas_price: Some(gas_price),
            gas_limit,
            to,
            value,
            input,
            ..Default::default()
        }
    }

    /// Creates an unsigned EIP-2930 access list transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn eip2930(
        chain_id: ChainId,
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        input: Bytes,
        access_list: AccessList,
    ) -> Self {
        Self {
            tx_type: TxType::Eip2930,
            chain_id: Some(chain_id),
            nonce,
            gas_price: Some(gas_price),
            gas_limit,
            to,
            value,
            input,
            access_list,
            ..Default::default()
        }
    }

    /// Creates an unsigned EIP-1559 dynamic fee transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn eip1559(
        chain_id: ChainId,
        nonce: u64,
        max_priority_fee_per_gas: u128,
        max_fee_per_gas: u128,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        input: Bytes,
        access_list: AccessList,
    ) -> Self {
        Self {
            tx_type: TxType::Eip1559,
            chain_id: Some(chain_id),
            nonce,
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
            max_fee_per_gas: Some(max_fee_per_gas),
            gas_limit,
            to,
            value,
            input,
            access_list,
            ..Default::default()
        }
    }

    /// Creates an unsigned EIP-7702 set code transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn eip7702(
        chain_id: ChainId,
        nonce: u64,
        max_priority_fee_per_gas: u128,
        max_fee_per_gas: u128,
        gas_limit: u64,
        to: Address,
        value: U256,
        input: Bytes,
        access_list: AccessList,
        authorization_list: Vec<Authorization>,
    ) -> Self {
        Self {
            tx_type: TxType::Eip7702,
            chain_id: Some(chain_id),
            nonce,
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
            max_fee_per_gas: Some(max_fee_per_gas),
            gas_limit,
            to: Some(to),
            value,
            input,
            access_list,
            authorization_list,
            ..Default::default()
        }
    }

    /// Decodes a single transaction: a bare RLP list for legacy, a
    /// type-tagged byte string for everything else.
    pub fn decode(buf: &Bytes) -> Result<Self> {
        decode::decode_transaction(buf)
    }

    /// The transaction type.
    pub const fn tx_type(&self) -> TxType {
        self.tx_type
    }

    /// The chain id, absent for pre-EIP-155 legacy transactions.
    pub const fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// The sender nonce.
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The gas limit.
    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// The gas price of legacy and EIP-2930 transactions.
    pub const fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    /// The max priority fee per gas of dynamic fee transactions.
    pub const fn max_priority_fee_per_gas(&self) -> Option<u128> {
        self.max_priority_fee_per_gas
    }

    /// The max fee per gas of dynamic fee transactions.
    pub const fn max_fee_per_gas(&self) -> Option<u128> {
        self.max_fee_per_gas
    }

    /// The recipient, `None` for contract creation.
    pub const fn to(&self) -> Option<Address> {
        self.to
    }

    /// The transferred value.
    pub const fn value(&self) -> U256 {
        self.value
    }

    /// The calldata, or the init code for contract creation.
    pub const fn input(&self) -> &Bytes {
        &self.input
    }

    /// The declared access list; always empty for legacy transactions.
    pub const fn access_list(&self) -> &AccessList {
        &self.access_list
    }

    /// The EIP-7702 authorization list; empty for every other type.
    pub fn authorization_list(&self) -> &[Authorization] {
        &self.authorization_list
    }

    /// The raw signature values, if the transaction is signed.
    pub const fn signature(&self) -> Option<&TxSignature> {
        self.signature.as_ref()
    }

    /// Sets the nonce.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.invalidate();
    }

    /// Sets the gas limit.
    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.gas_limit = gas_limit;
        self.invalidate();
    }

    /// Sets the gas price.
    pub fn set_gas_price(&mut self, gas_price: u128) {
        self.gas_price = Some(gas_price);
        self.invalidate();
    }

    /// Sets the max priority fee per gas.
    pub fn set_max_priority_fee_per_gas(&mut self, tip: u128) {
        self.max_priority_fee_per_gas = Some(tip);
        self.invalidate();
    }

    /// Sets the max fee per gas.
    pub fn set_max_fee_per_gas(&mut self, fee: u128) {
        self.max_fee_per_gas = Some(fee);
        self.invalidate();
    }

    /// Sets the recipient; `None` turns the transaction into a contract
    /// creation.
    pub fn set_to(&mut self, to: Option<Address>) {
        self.to = to;
        self.invalidate();
    }

    /// Sets the transferred value.
    pub fn set_value(&mut self, value: U256) {
        self.value = value;
        self.invalidate();
    }

    /// Sets the calldata.
    pub fn set_input(&mut self, input: Bytes) {
        self.input = input;
        self.invalidate();
    }

    /// Sets the access list.
    pub fn set_access_list(&mut self, access_list: AccessList) {
        self.access_list = access_list;
        self.invalidate();
    }

    /// Sets the authorization list.
    pub fn set_authorization_list(&mut self, authorization_list: Vec<Authorization>) {
        self.authorization_list = authorization_list;
        self.invalidate();
    }

    /// Sets the chain id.
    pub fn set_chain_id(&mut self, chain_id: Option<ChainId>) {
        self.chain_id = chain_id;
        self.invalidate();
    }

    /// Attaches raw signature values.
    pub fn set_signature(&mut self, signature: TxSignature) {
        self.signature = Some(signature);
        self.invalidate_signed();
    }

    /// Clears the signature values together with everything derived from
    /// them.
    pub fn clear_signature(&mut self) {
        self.signature = None;
        self.invalidate_signed();
    }

    /// The exact length of the signed encoding, envelope included.
    pub fn encoded_len_signed(&self) -> Result<usize> {
        if let Some(layout) = &self.signed {
            return Ok(layout.bytes().len());
        }
        encode::signed_encoded_length(self)
    }

    /// Appends the signed encoding to `out`.
    ///
    /// Uses the cached window when one exists, re-encoding the fields
    /// otherwise.
    pub fn encode_signed(&self, out: &mut Vec<u8>) -> Result<()> {
        if let Some(layout) = &self.signed {
            out.extend_from_slice(layout.bytes());
            return Ok(());
        }
        encode::encode_signed_into(self, out).map(|_| ())
    }

    /// Appends the signing preimage to `out`.
    ///
    /// For typed transactions this is `type_byte || rlp(fields)` with no
    /// outer string envelope; for legacy it is the fields list with the
    /// EIP-155 suffix when a chain id is present.
    pub fn encode_unsigned(&mut self, out: &mut Vec<u8>) -> Result<()> {
        encode::encode_unsigned_into(self, out)
    }

    /// The signed encoding together with its cursor offsets, encoding and
    /// caching it on first use.
    pub fn signed_layout(&mut self) -> Result<&SignedLayout> {
        if self.signed.is_none() {
            let mut buf = Vec::with_capacity(encode::signed_encoded_length(self)?);
            let offsets = encode::encode_signed_into(self, &mut buf)?;
            self.signed = Some(SignedLayout::new(
                buf.into(),
                offsets.tx_start,
                offsets.data_start,
                offsets.signature_start,
            ));
        }
        Ok(self.signed.as_ref().expect("layout was just stored"))
    }

    /// The transaction hash: Keccak-256 over the signed encoding starting at
    /// the type tag (the whole list for legacy).
    pub fn hash(&mut self) -> Result<B256> {
        if let Some(hash) = self.signed_hash {
            return Ok(hash);
        }
        let hash = keccak256(self.signed_layout()?.hashable());
        self.signed_hash = Some(hash);
        Ok(hash)
    }

    /// The signing hash: Keccak-256 over the signing preimage.
    pub fn signature_hash(&mut self) -> Result<B256> {
        if let Some(hash) = self.unsigned_hash {
            return Ok(hash);
        }
        let mut buf = Vec::with_capacity(encode::unsigned_encoded_length(self)?);
        encode::encode_unsigned_into(self, &mut buf)?;
        let hash = keccak256(&buf);
        self.unsigned_hash = Some(hash);
        Ok(hash)
    }

    /// The sender address, recovered from the signature under frontier rules
    /// and cached.
    pub fn from(&mut self) -> Result<Address> {
        if let Some(from) = self.from {
            return Ok(from);
        }
        self.recover_from(false)
    }

    /// Recovers the sender address from the signature.
    ///
    /// With `homestead` set the EIP-2 low-`s` rule applies. Failures do not
    /// poison the record; it stays valid for re-encoding.
    pub fn recover_from(&mut self, homestead: bool) -> Result<Address> {
        let (v, r, s) = match &self.signature {
            Some(sig) => (sig.v, sig.r, sig.s),
            None => return Err(Error::InvalidSignature),
        };
        let parity = match self.tx_type {
            TxType::Legacy => self.legacy_parity(&v)?,
            _ => typed_parity(&v)?,
        };
        if !crypto::validate_signature_values(parity, &r, &s, homestead) {
            return Err(Error::InvalidSignature);
        }
        let digest = self.signature_hash()?;
        let from = crypto::recover_signer(&r, &s, parity, digest)?;
        self.from = Some(from);
        Ok(from)
    }

    /// Signs the transaction with the given secret key, replacing any
    /// previous signature.
    ///
    /// Legacy `v` becomes `recovery_id + 35 + 2 * chain_id` (27/28 without a
    /// chain id); typed `v` is the recovery id itself.
    pub fn sign(&mut self, secret: B256) -> Result<()> {
        let digest = self.signature_hash()?;
        let (r, s, recovery_id) = crypto::sign_message(secret, digest)?;
        let v = match self.tx_type {
            TxType::Legacy => match self.chain_id {
                Some(id) => {
                    U256::from(id) * U256::from(2u8) + U256::from(35 + recovery_id as u64)
                }
                None => U256::from(27 + recovery_id as u64),
            },
            _ => U256::from(recovery_id),
        };
        self.signature = Some(TxSignature::new(v, r, s));
        self.invalidate_signed();
        Ok(())
    }

    /// Maps a legacy `v` to its y-parity using the record's chain id.
    fn legacy_parity(&self, v: &U256) -> Result<u8> {
        let v = u64::try_from(*v).map_err(|_| Error::InvalidSignature)?;
        match (v, self.chain_id) {
            (27 | 28, _) => Ok((v - 27) as u8),
            (35.., Some(id)) => {
                let base = id
                    .checked_mul(2)
                    .and_then(|doubled| doubled.checked_add(35))
                    .ok_or(Error::InvalidSignature)?;
                match v.checked_sub(base) {
                    Some(parity @ 0..=1) => Ok(parity as u8),
                    _ => Err(Error::InvalidSignature),
                }
            }
            (35.., None) => Ok(((v - 35) % 2) as u8),
            _ => Err(Error::InvalidSignature),
        }
    }

    /// Drops every cache derived from the semantic fields.
    fn invalidate(&mut self) {
        self.signed = None;
        self.unsigned_fields = None;
        self.signed_hash = None;
        self.unsigned_hash = None;
        self.from = None;
    }

    /// Drops the caches derived from the signature; the signing preimage is
    /// unaffected.
    fn invalidate_signed(&mut self) {
        self.signed = None;
        self.signed_hash = None;
        self.from = None;
    }
}

/// Maps a typed transaction `v` to its y-parity; only 0 and 1 are valid.
fn typed_parity(v: &U256) -> Result<u8> {
    let v = u64::try_from(*v).map_err(|_| Error::InvalidSignature)?;
    if v <= 1 {
        Ok(v as u8)
    } else {
        Err(Error::InvalidSignature)
    }
}
