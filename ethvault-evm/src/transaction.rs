//! Ethereum transaction signing.
//!
//! Input is an unsigned transaction as produced by a transaction builder:
//!
//! - legacy: `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`
//! - EIP-2930: `0x01 || rlp([chainId, nonce, gasPrice, gas, to, value, data, accessList])`
//! - EIP-1559: `0x02 || rlp([chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gas, to,
//!   value, data, accessList])`
//!
//! Typed payloads may also carry three empty signature placeholders. The
//! chain ID is always taken from the transaction itself.

use alloy_primitives::{keccak256, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::address::address_of;
use crate::private_key::PrivateKey;
use crate::rlp::{self, Item};
use crate::{Error, Result};

/// EIP-2930 type byte.
pub const ACCESS_LIST_TX_TYPE: u8 = 0x01;

/// EIP-1559 type byte.
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x02;

/// Largest chain ID whose EIP-155 `v` still fits in a u64.
pub const MAX_LEGACY_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// Transaction envelope type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    /// Pre-typed transaction with EIP-155 replay protection.
    Legacy,
    /// EIP-2930 access list transaction.
    AccessList,
    /// EIP-1559 dynamic fee transaction.
    DynamicFee,
}

/// One EIP-2930 access list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessListItem {
    /// Accessed contract.
    pub address: [u8; 20],
    /// Accessed storage slots.
    pub storage_keys: Vec<[u8; 32]>,
}

/// Legacy transaction (EIP-155).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    /// Chain ID (EIP-155).
    pub chain_id: u64,
    /// Transaction nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient address (None for contract creation).
    pub to: Option<[u8; 20]>,
    /// Value in wei.
    pub value: U256,
    /// Transaction data.
    pub data: Vec<u8>,
}

/// EIP-2930 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessListTransaction {
    /// Chain ID.
    pub chain_id: u64,
    /// Transaction nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient address (None for contract creation).
    pub to: Option<[u8; 20]>,
    /// Value in wei.
    pub value: U256,
    /// Transaction data.
    pub data: Vec<u8>,
    /// Access list.
    pub access_list: Vec<AccessListItem>,
}

/// EIP-1559 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Transaction {
    /// Chain ID.
    pub chain_id: u64,
    /// Transaction nonce.
    pub nonce: u64,
    /// Max priority fee per gas (tip).
    pub max_priority_fee_per_gas: u128,
    /// Max fee per gas.
    pub max_fee_per_gas: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient address (None for contract creation).
    pub to: Option<[u8; 20]>,
    /// Value in wei.
    pub value: U256,
    /// Transaction data.
    pub data: Vec<u8>,
    /// Access list.
    pub access_list: Vec<AccessListItem>,
}

/// A transaction awaiting a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedTransaction {
    /// Legacy EIP-155 transaction.
    Legacy(LegacyTransaction),
    /// EIP-2930 transaction.
    AccessList(AccessListTransaction),
    /// EIP-1559 transaction.
    DynamicFee(Eip1559Transaction),
}

/// ECDSA signature components of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSignature {
    /// Signature r value.
    pub r: [u8; 32],
    /// Signature s value.
    pub s: [u8; 32],
    /// Parity of the ephemeral public key's y coordinate.
    pub y_parity: bool,
}

/// A decoded signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Transaction body.
    pub transaction: UnsignedTransaction,
    /// Attached signature.
    pub signature: TxSignature,
}

/// Sign an unsigned transaction.
///
/// Returns the signed transaction in its network encoding, ready to be
/// broadcast.
///
/// # Errors
///
/// Returns [`Error::Sign`] for malformed or already-signed input, a missing
/// or zero chain ID, or a signing failure.
pub fn sign_transaction(raw: &[u8], key: &PrivateKey) -> Result<Vec<u8>> {
    let tx = UnsignedTransaction::decode(raw)?;
    tracing::debug!(tx_type = ?tx.tx_type(), chain_id = tx.chain_id(), "signing transaction");

    let (signature, recid) = key.sign_prehash(&tx.signing_hash())?;
    Ok(tx.encode_signed(&TxSignature::new(&signature, recid)))
}

impl TxSignature {
    fn new(signature: &Signature, recid: RecoveryId) -> Self {
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self {
            r,
            s,
            y_parity: recid.is_y_odd(),
        }
    }
}

impl UnsignedTransaction {
    /// Decode an unsigned transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sign`] describing why the payload was rejected.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let (&first, payload) = raw
            .split_first()
            .ok_or_else(|| Error::Sign("empty transaction".into()))?;

        let tx = match first {
            0xc0..=0xff => Self::Legacy(decode_legacy_unsigned(raw)?),
            ACCESS_LIST_TX_TYPE => {
                let fields = typed_unsigned_fields(payload, 8)?;
                Self::AccessList(decode_access_list_fields(&fields)?)
            }
            DYNAMIC_FEE_TX_TYPE => {
                let fields = typed_unsigned_fields(payload, 9)?;
                Self::DynamicFee(decode_dynamic_fee_fields(&fields)?)
            }
            other => {
                return Err(Error::Sign(format!(
                    "unsupported transaction type 0x{other:02x}"
                )))
            }
        };

        if tx.chain_id() == 0 {
            return Err(Error::Sign("chain id must not be zero".into()));
        }
        Ok(tx)
    }

    /// Envelope type.
    pub const fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::AccessList(_) => TxType::AccessList,
            Self::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    /// Chain ID embedded in the transaction.
    pub const fn chain_id(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.chain_id,
            Self::AccessList(tx) => tx.chain_id,
            Self::DynamicFee(tx) => tx.chain_id,
        }
    }

    /// Encoding whose Keccak-256 hash is signed.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        match self {
            Self::Legacy(tx) => {
                let mut items = tx.fields();
                items.push(rlp::encode_u64(tx.chain_id));
                items.push(rlp::encode_u64(0));
                items.push(rlp::encode_u64(0));
                rlp::encode_list(&items)
            }
            Self::AccessList(tx) => typed(ACCESS_LIST_TX_TYPE, &tx.fields()),
            Self::DynamicFee(tx) => typed(DYNAMIC_FEE_TX_TYPE, &tx.fields()),
        }
    }

    /// Hash that the sender signs.
    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(self.encode_unsigned()).0
    }

    /// Network encoding with `signature` attached.
    ///
    /// Legacy transactions carry `v = chainId * 2 + 35 + yParity`; typed
    /// transactions carry `yParity` directly. A hand-built legacy
    /// transaction must keep its chain ID at or below
    /// [`MAX_LEGACY_CHAIN_ID`]; decoded ones always do.
    pub fn encode_signed(&self, signature: &TxSignature) -> Vec<u8> {
        let parity = u64::from(signature.y_parity);
        let sig_fields = |v: u64| {
            [
                rlp::encode_u64(v),
                rlp::encode_uint_bytes(&signature.r),
                rlp::encode_uint_bytes(&signature.s),
            ]
        };

        match self {
            Self::Legacy(tx) => {
                let mut items = tx.fields();
                items.extend(sig_fields(tx.chain_id * 2 + 35 + parity));
                rlp::encode_list(&items)
            }
            Self::AccessList(tx) => {
                let mut items = tx.fields();
                items.extend(sig_fields(parity));
                typed(ACCESS_LIST_TX_TYPE, &items)
            }
            Self::DynamicFee(tx) => {
                let mut items = tx.fields();
                items.extend(sig_fields(parity));
                typed(DYNAMIC_FEE_TX_TYPE, &items)
            }
        }
    }
}

impl SignedTransaction {
    /// Decode a signed transaction in network encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sign`] for malformed input or a legacy signature
    /// without EIP-155 replay protection.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let (&first, payload) = raw
            .split_first()
            .ok_or_else(|| Error::Sign("empty transaction".into()))?;

        match first {
            0xc0..=0xff => decode_legacy_signed(raw),
            ACCESS_LIST_TX_TYPE => {
                let fields = typed_signed_fields(payload, 8)?;
                Ok(Self {
                    transaction: UnsignedTransaction::AccessList(decode_access_list_fields(
                        &fields[..8],
                    )?),
                    signature: decode_typed_signature(&fields[8..])?,
                })
            }
            DYNAMIC_FEE_TX_TYPE => {
                let fields = typed_signed_fields(payload, 9)?;
                Ok(Self {
                    transaction: UnsignedTransaction::DynamicFee(decode_dynamic_fee_fields(
                        &fields[..9],
                    )?),
                    signature: decode_typed_signature(&fields[9..])?,
                })
            }
            other => Err(Error::Sign(format!(
                "unsupported transaction type 0x{other:02x}"
            ))),
        }
    }

    /// Recover the checksummed sender address from the signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if no public key can be recovered.
    pub fn recover_sender(&self) -> Result<String> {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&self.signature.r);
        rs[32..].copy_from_slice(&self.signature.s);
        let signature = Signature::from_slice(&rs).map_err(|_| Error::InvalidSignature)?;
        let recid = RecoveryId::new(self.signature.y_parity, false);

        let key = VerifyingKey::recover_from_prehash(
            &self.transaction.signing_hash(),
            &signature,
            recid,
        )
        .map_err(|_| Error::InvalidSignature)?;
        Ok(address_of(&key))
    }

    /// Network encoding.
    pub fn encode(&self) -> Vec<u8> {
        self.transaction.encode_signed(&self.signature)
    }

    /// Transaction hash, `keccak256` of the network encoding.
    pub fn hash(&self) -> [u8; 32] {
        keccak256(self.encode()).0
    }
}

impl LegacyTransaction {
    fn fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.nonce),
            rlp::encode_u128(self.gas_price),
            rlp::encode_u64(self.gas_limit),
            encode_to(self.to.as_ref()),
            rlp::encode_uint_bytes(&self.value.to_be_bytes::<32>()),
            rlp::encode_bytes(&self.data),
        ]
    }
}

impl AccessListTransaction {
    fn fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.chain_id),
            rlp::encode_u64(self.nonce),
            rlp::encode_u128(self.gas_price),
            rlp::encode_u64(self.gas_limit),
            encode_to(self.to.as_ref()),
            rlp::encode_uint_bytes(&self.value.to_be_bytes::<32>()),
            rlp::encode_bytes(&self.data),
            encode_access_list(&self.access_list),
        ]
    }
}

impl Eip1559Transaction {
    fn fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.chain_id),
            rlp::encode_u64(self.nonce),
            rlp::encode_u128(self.max_priority_fee_per_gas),
            rlp::encode_u128(self.max_fee_per_gas),
            rlp::encode_u64(self.gas_limit),
            encode_to(self.to.as_ref()),
            rlp::encode_uint_bytes(&self.value.to_be_bytes::<32>()),
            rlp::encode_bytes(&self.data),
            encode_access_list(&self.access_list),
        ]
    }
}

fn typed(tx_type: u8, items: &[Vec<u8>]) -> Vec<u8> {
    let body = rlp::encode_list(items);
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(tx_type);
    out.extend_from_slice(&body);
    out
}

fn encode_to(to: Option<&[u8; 20]>) -> Vec<u8> {
    match to {
        Some(addr) => rlp::encode_bytes(addr),
        None => rlp::encode_bytes(&[]),
    }
}

fn encode_access_list(access_list: &[AccessListItem]) -> Vec<u8> {
    let items: Vec<Vec<u8>> = access_list
        .iter()
        .map(|entry| {
            let keys: Vec<Vec<u8>> = entry
                .storage_keys
                .iter()
                .map(|k| rlp::encode_bytes(k))
                .collect();
            rlp::encode_list(&[rlp::encode_bytes(&entry.address), rlp::encode_list(&keys)])
        })
        .collect();
    rlp::encode_list(&items)
}

fn decode_legacy_unsigned(raw: &[u8]) -> Result<LegacyTransaction> {
    let fields = Item::decode_exact(raw)?.list()?;
    match fields.len() {
        9 => {}
        6 => return Err(Error::Sign("legacy transaction has no chain id".into())),
        n => {
            return Err(Error::Sign(format!(
                "legacy transaction has {n} fields, expected 9"
            )))
        }
    }
    if !fields[7].is_empty_bytes() || !fields[8].is_empty_bytes() {
        return Err(Error::Sign("transaction is already signed".into()));
    }

    let chain_id = fields[6].u64()?;
    if chain_id > MAX_LEGACY_CHAIN_ID {
        return Err(Error::Sign(format!("chain id {chain_id} is too large")));
    }
    decode_legacy_body(&fields[..6], chain_id)
}

fn decode_legacy_signed(raw: &[u8]) -> Result<SignedTransaction> {
    let fields = Item::decode_exact(raw)?.list()?;
    if fields.len() != 9 {
        return Err(Error::Sign(format!(
            "signed legacy transaction has {} fields, expected 9",
            fields.len()
        )));
    }

    let v = fields[6].u64()?;
    if v < 37 {
        return Err(Error::Sign(format!(
            "v = {v} carries no EIP-155 chain id"
        )));
    }
    let chain_id = (v - 35) / 2;
    let y_parity = (v - 35) % 2 == 1;

    Ok(SignedTransaction {
        transaction: UnsignedTransaction::Legacy(decode_legacy_body(&fields[..6], chain_id)?),
        signature: TxSignature {
            r: decode_scalar(fields[7])?,
            s: decode_scalar(fields[8])?,
            y_parity,
        },
    })
}

fn decode_legacy_body(fields: &[Item<'_>], chain_id: u64) -> Result<LegacyTransaction> {
    Ok(LegacyTransaction {
        chain_id,
        nonce: fields[0].u64()?,
        gas_price: fields[1].u128()?,
        gas_limit: fields[2].u64()?,
        to: decode_to(fields[3])?,
        value: decode_u256(fields[4])?,
        data: fields[5].bytes()?.to_vec(),
    })
}

/// Fields of an unsigned typed payload, with optional empty signature
/// placeholders stripped.
fn typed_unsigned_fields(payload: &[u8], count: usize) -> Result<Vec<Item<'_>>> {
    let mut fields = Item::decode_exact(payload)?.list()?;
    if fields.len() == count + 3 {
        if !fields[count + 1].is_empty_bytes() || !fields[count + 2].is_empty_bytes() {
            return Err(Error::Sign("transaction is already signed".into()));
        }
        if !fields[count].is_empty_bytes() {
            return Err(Error::Sign("signature placeholder must be empty".into()));
        }
        fields.truncate(count);
    }
    if fields.len() != count {
        return Err(Error::Sign(format!(
            "typed transaction has {} fields, expected {count}",
            fields.len()
        )));
    }
    Ok(fields)
}

fn typed_signed_fields(payload: &[u8], count: usize) -> Result<Vec<Item<'_>>> {
    let fields = Item::decode_exact(payload)?.list()?;
    if fields.len() != count + 3 {
        return Err(Error::Sign(format!(
            "signed typed transaction has {} fields, expected {}",
            fields.len(),
            count + 3
        )));
    }
    Ok(fields)
}

fn decode_access_list_fields(fields: &[Item<'_>]) -> Result<AccessListTransaction> {
    Ok(AccessListTransaction {
        chain_id: fields[0].u64()?,
        nonce: fields[1].u64()?,
        gas_price: fields[2].u128()?,
        gas_limit: fields[3].u64()?,
        to: decode_to(fields[4])?,
        value: decode_u256(fields[5])?,
        data: fields[6].bytes()?.to_vec(),
        access_list: decode_access_list(fields[7])?,
    })
}

fn decode_dynamic_fee_fields(fields: &[Item<'_>]) -> Result<Eip1559Transaction> {
    Ok(Eip1559Transaction {
        chain_id: fields[0].u64()?,
        nonce: fields[1].u64()?,
        max_priority_fee_per_gas: fields[2].u128()?,
        max_fee_per_gas: fields[3].u128()?,
        gas_limit: fields[4].u64()?,
        to: decode_to(fields[5])?,
        value: decode_u256(fields[6])?,
        data: fields[7].bytes()?.to_vec(),
        access_list: decode_access_list(fields[8])?,
    })
}

fn decode_typed_signature(fields: &[Item<'_>]) -> Result<TxSignature> {
    let y_parity = match fields[0].u64()? {
        0 => false,
        1 => true,
        v => return Err(Error::Sign(format!("invalid y parity {v}"))),
    };
    Ok(TxSignature {
        r: decode_scalar(fields[1])?,
        s: decode_scalar(fields[2])?,
        y_parity,
    })
}

fn decode_to(item: Item<'_>) -> Result<Option<[u8; 20]>> {
    if item.is_empty_bytes() {
        Ok(None)
    } else {
        Ok(Some(item.fixed::<20>()?))
    }
}

fn decode_u256(item: Item<'_>) -> Result<U256> {
    Ok(item.u256()?)
}

fn decode_scalar(item: Item<'_>) -> Result<[u8; 32]> {
    Ok(item.u256()?.to_be_bytes::<32>())
}

fn decode_access_list(item: Item<'_>) -> Result<Vec<AccessListItem>> {
    item.list()?
        .into_iter()
        .map(|entry| {
            let parts = entry.list()?;
            if parts.len() != 2 {
                return Err(Error::Sign("access list entry must have 2 fields".into()));
            }
            let storage_keys = parts[1]
                .list()?
                .into_iter()
                .map(Item::fixed::<32>)
                .collect::<core::result::Result<Vec<_>, _>>()?;
            Ok(AccessListItem {
                address: parts[0].fixed::<20>()?,
                storage_keys,
            })
        })
        .collect()
}
