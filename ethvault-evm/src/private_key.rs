//! secp256k1 private key used for Ethereum signing.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::address::address_of;
use crate::{Error, Result};

/// Ethereum private key based on secp256k1.
///
/// The wrapped [`SigningKey`] wipes its scalar on drop. `Debug` never prints
/// key material.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Create a key from 32 big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPrivateKey`] for a wrong length, zero, or a
    /// value not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::InvalidPrivateKey);
        }
        let inner = SigningKey::from_slice(bytes).map_err(|_| Error::InvalidPrivateKey)?;
        Ok(Self { inner })
    }

    /// Parse a key from hex, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHex`] for non-hex input and
    /// [`Error::InvalidPrivateKey`] for an out-of-range key.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = Zeroizing::new(hex::decode(s).map_err(|_| Error::InvalidHex)?);
        Self::from_bytes(&bytes)
    }

    /// Raw key bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.inner.to_bytes().into())
    }

    /// Hex-encoded key without `0x` prefix.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.to_bytes().as_slice()))
    }

    /// Corresponding public key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.inner.verifying_key()
    }

    /// EIP-55 checksummed address of this key.
    pub fn address(&self) -> String {
        address_of(self.verifying_key())
    }

    /// Sign a 32-byte digest, returning a low-S signature and recovery id.
    pub(crate) fn sign_prehash(&self, hash: &[u8; 32]) -> Result<(Signature, RecoveryId)> {
        self.inner
            .sign_prehash_recoverable(hash)
            .map_err(|e| Error::Sign(e.to_string()))
    }
}

impl From<SigningKey> for PrivateKey {
    fn from(inner: SigningKey) -> Self {
        Self { inner }
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}
