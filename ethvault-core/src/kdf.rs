//! Argon2id password-based key derivation.
//!
//! The default cost is deliberately heavy (1 GiB, 12 passes, 4 lanes) to make
//! offline guessing against a stolen wallet file expensive on GPUs and ASICs.
//! Whatever parameters are used are written into the envelope, so decryption
//! never depends on these defaults.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Length of the derived AES-256 key in bytes.
pub const KEY_LENGTH: u32 = 32;

/// Default memory cost in KiB (1 GiB).
pub const DEFAULT_MEMORY_KIB: u32 = 1024 * 1024;

/// Default number of passes.
pub const DEFAULT_ITERATIONS: u32 = 12;

/// Default degree of parallelism.
pub const DEFAULT_PARALLELISM: u32 = 4;

/// Largest memory cost accepted from an envelope (4 GiB).
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Largest pass count accepted from an envelope.
pub const MAX_ITERATIONS: u32 = 1024;

/// Largest degree of parallelism accepted from an envelope.
pub const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Number of lanes.
    pub parallelism: u32,
    /// Output length in bytes.
    pub key_length: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
            key_length: KEY_LENGTH,
        }
    }
}

impl KdfParams {
    /// Check the parameters before any memory is committed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKdfParams`] if a value is zero, above the
    /// accepted ceiling, or the key length is not 32 bytes.
    pub fn validate(&self) -> Result<()> {
        if self.key_length != KEY_LENGTH {
            return Err(Error::InvalidKdfParams(format!(
                "key length must be {KEY_LENGTH} bytes, got {}",
                self.key_length
            )));
        }
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(Error::InvalidKdfParams(format!(
                "iterations must be between 1 and {MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(Error::InvalidKdfParams(format!(
                "parallelism must be between 1 and {MAX_PARALLELISM}, got {}",
                self.parallelism
            )));
        }
        if self.memory_kib < 8 * self.parallelism || self.memory_kib > MAX_MEMORY_KIB {
            return Err(Error::InvalidKdfParams(format!(
                "memory must be between {} and {MAX_MEMORY_KIB} KiB, got {}",
                8 * self.parallelism,
                self.memory_kib
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from `password` and `salt` with Argon2id v1.3.
///
/// # Errors
///
/// Returns [`Error::InvalidKdfParams`] for out-of-range parameters or a salt
/// shorter than Argon2 accepts, and [`Error::KeyDerivation`] if hashing fails.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>> {
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LENGTH as usize),
    )
    .map_err(|e| Error::InvalidKdfParams(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    tracing::debug!(
        memory_kib = params.memory_kib,
        iterations = params.iterations,
        parallelism = params.parallelism,
        "deriving key with argon2id"
    );

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password, salt, key.as_mut_slice())
        .map_err(|e| match e {
            argon2::Error::SaltTooShort | argon2::Error::SaltTooLong => {
                Error::InvalidKdfParams(e.to_string())
            }
            other => Error::KeyDerivation(other.to_string()),
        })?;
    Ok(key)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Light parameters so the test suite stays fast.
    pub(crate) fn test_params() -> KdfParams {
        KdfParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
            key_length: KEY_LENGTH,
        }
    }

    #[test]
    fn test_default_params() {
        let params = KdfParams::default();
        assert_eq!(params.memory_kib, 1_048_576);
        assert_eq!(params.iterations, 12);
        assert_eq!(params.parallelism, 4);
        assert_eq!(params.key_length, 32);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let salt = b"0123456789abcdef";
        let key1 = derive_key(b"password", salt, &test_params()).unwrap();
        let key2 = derive_key(b"password", salt, &test_params()).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn test_different_password_different_key() {
        let salt = b"0123456789abcdef";
        let key1 = derive_key(b"password_a", salt, &test_params()).unwrap();
        let key2 = derive_key(b"password_b", salt, &test_params()).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key(b"password", b"salt_aaaaaaaaaaa", &test_params()).unwrap();
        let key2 = derive_key(b"password", b"salt_bbbbbbbbbbb", &test_params()).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_params_change_key() {
        let salt = b"0123456789abcdef";
        let mut heavier = test_params();
        heavier.iterations = 2;
        let key1 = derive_key(b"password", salt, &test_params()).unwrap();
        let key2 = derive_key(b"password", salt, &heavier).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let params = KdfParams {
            iterations: 0,
            ..test_params()
        };
        let err = derive_key(b"pw", b"0123456789abcdef", &params).unwrap_err();
        assert!(matches!(err, Error::InvalidKdfParams(_)));
    }

    #[test]
    fn test_rejects_huge_memory() {
        let params = KdfParams {
            memory_kib: MAX_MEMORY_KIB + 1,
            ..test_params()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_wrong_key_length() {
        let params = KdfParams {
            key_length: 16,
            ..test_params()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_short_salt() {
        let err = derive_key(b"pw", b"short", &test_params()).unwrap_err();
        assert!(matches!(err, Error::InvalidKdfParams(_)));
    }

    #[test]
    fn test_empty_password_allowed() {
        let key = derive_key(b"", b"0123456789abcdef", &test_params()).unwrap();
        assert_ne!(*key, [0u8; 32]);
    }
}
