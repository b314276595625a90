//! Ethereum address derivation and EIP-55 formatting.

use alloy_primitives::{keccak256, Address};
use k256::ecdsa::VerifyingKey;

/// Format an address with EIP-55 mixed-case checksum.
///
/// A hex letter is upper-cased when the matching nibble of
/// `keccak256(lowercase_hex)` is 8 or more.
pub fn to_checksum_address(address: &Address) -> String {
    let addr_hex = hex::encode(address.as_slice());
    let hash = keccak256(addr_hex.as_bytes());

    let mut result = String::with_capacity(42);
    result.push_str("0x");

    for (i, c) in addr_hex.chars().enumerate() {
        let hash_nibble = (hash[i / 2] >> (4 * (1 - i % 2))) & 0xf;
        if c.is_ascii_alphabetic() && hash_nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert public key bytes to an Ethereum address.
///
/// Accepts the 65-byte SEC1 uncompressed form or the bare 64-byte `x || y`.
pub fn public_key_to_address(public_key_bytes: &[u8]) -> Address {
    let key_bytes = if public_key_bytes.len() == 65 && public_key_bytes[0] == 0x04 {
        &public_key_bytes[1..]
    } else {
        public_key_bytes
    };

    let hash = keccak256(key_bytes);
    Address::from_slice(&hash[12..])
}

/// Checksummed address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    to_checksum_address(&public_key_to_address(point.as_bytes()))
}
