//! EIP-191 personal message signing.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::address_of;
use crate::private_key::PrivateKey;
use crate::{Error, Result};

const PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Compute the EIP-191 personal message hash.
///
/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)` where
/// `len` is the decimal byte length of `message`.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PREFIX);
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Turn user input into the bytes to sign.
///
/// With `is_hex`, the input must be `0x`-prefixed hex; otherwise its UTF-8
/// bytes are used as-is.
///
/// # Errors
///
/// Returns [`Error::InvalidHexMessage`] if hex input lacks the prefix or
/// does not decode.
pub fn message_bytes(input: &str, is_hex: bool) -> Result<Vec<u8>> {
    if !is_hex {
        return Ok(input.as_bytes().to_vec());
    }
    let digits = input.strip_prefix("0x").ok_or(Error::InvalidHexMessage)?;
    hex::decode(digits).map_err(|_| Error::InvalidHexMessage)
}

/// Sign `message` with the EIP-191 prefix.
///
/// Returns `r || s || v` with `v` in `{27, 28}`.
///
/// # Errors
///
/// Returns [`Error::Sign`] if the signing primitive fails.
pub fn sign_message(message: &[u8], key: &PrivateKey) -> Result<[u8; 65]> {
    let hash = hash_message(message);
    let (signature, recid) = key.sign_prehash(&hash)?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recid.to_byte() + 27;
    Ok(out)
}

/// Recover the checksummed address that produced `signature` over `message`.
///
/// Accepts `v` as either `27`/`28` or `0`/`1`.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] if the signature is malformed or no
/// key can be recovered.
pub fn recover_message_signer(message: &[u8], signature: &[u8; 65]) -> Result<String> {
    let v = match signature[64] {
        v @ (27 | 28) => v - 27,
        v @ (0 | 1) => v,
        _ => return Err(Error::InvalidSignature),
    };
    let recid = RecoveryId::from_byte(v).ok_or(Error::InvalidSignature)?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| Error::InvalidSignature)?;

    let hash = hash_message(message);
    let key = VerifyingKey::recover_from_prehash(&hash, &sig, recid)
        .map_err(|_| Error::InvalidSignature)?;
    Ok(address_of(&key))
}
