//! Password-encrypted envelope for a secret (the mnemonic).
//!
//! # Scheme
//!
//! 1. A fresh 16-byte salt is drawn from the OS CSPRNG.
//! 2. A 256-bit key is derived with Argon2id from the password and salt.
//! 3. A fresh 12-byte nonce is drawn from the OS CSPRNG.
//! 4. The plaintext is sealed with AES-256-GCM, no associated data.
//!
//! The envelope stores every parameter needed to reverse the process, so a
//! file written with one cost setting stays readable after the defaults
//! change.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "version": 1,
//!   "algorithm": "AES-256-GCM",
//!   "key_derivation": "Argon2id",
//!   "memory": 1048576,
//!   "iterations": 12,
//!   "parallelism": 4,
//!   "key_length": 32,
//!   "salt": "<base64>",
//!   "nonce": "<base64>",
//!   "ciphertext": "<base64>"
//! }
//! ```

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::kdf::{derive_key, KdfParams};
use crate::mnemonic::fill_random;
use crate::{Error, Result};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// Cipher identifier written into every envelope.
pub const ALGORITHM: &str = "AES-256-GCM";

/// Key derivation identifier written into every envelope.
pub const KEY_DERIVATION: &str = "Argon2id";

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// AES-GCM nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// A self-describing password-encrypted blob.
///
/// Fields are private: an envelope is immutable once built. Changing the
/// password goes through [`EncryptedEnvelope::reencrypt`], which produces a
/// new envelope with its own salt and nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    version: u32,
    algorithm: String,
    key_derivation: String,
    memory: u32,
    iterations: u32,
    parallelism: u32,
    key_length: u32,
    salt: String,
    nonce: String,
    ciphertext: String,
}

impl EncryptedEnvelope {
    /// Encrypt `plaintext` under `password` with the default Argon2id cost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Entropy`] if the OS random source fails, or a
    /// crypto error if key derivation or sealing fails. No partial envelope
    /// is ever returned.
    pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Self> {
        Self::encrypt_with_params(plaintext, password, &KdfParams::default())
    }

    /// Encrypt `plaintext` under `password` with explicit Argon2id cost.
    ///
    /// # Errors
    ///
    /// See [`EncryptedEnvelope::encrypt`]; additionally returns
    /// [`Error::InvalidKdfParams`] for out-of-range parameters.
    pub fn encrypt_with_params(
        plaintext: &[u8],
        password: &str,
        params: &KdfParams,
    ) -> Result<Self> {
        params.validate()?;

        let mut salt = [0u8; SALT_LENGTH];
        fill_random(&mut salt)?;

        let key = derive_key(password.as_bytes(), &salt, params)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| Error::Cipher)?;

        let mut nonce = [0u8; NONCE_LENGTH];
        fill_random(&mut nonce)?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| Error::Cipher)?;

        tracing::debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "sealed envelope"
        );

        Ok(Self {
            version: ENVELOPE_VERSION,
            algorithm: ALGORITHM.to_string(),
            key_derivation: KEY_DERIVATION.to_string(),
            memory: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
            key_length: params.key_length,
            salt: BASE64.encode(salt),
            nonce: BASE64.encode(nonce),
            ciphertext: BASE64.encode(ciphertext),
        })
    }

    /// Decrypt the envelope with `password`.
    ///
    /// The key is re-derived from the salt and parameters stored in the
    /// envelope itself.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEnvelope`] / [`Error::MalformedEnvelope`] /
    ///   [`Error::InvalidKdfParams`] when the envelope cannot be interpreted.
    /// - [`Error::Decryption`] when authentication fails, whether because the
    ///   password is wrong or the data was altered.
    pub fn decrypt(&self, password: &str) -> Result<Zeroizing<Vec<u8>>> {
        self.check_header()?;
        let params = self.kdf_params();
        params.validate()?;

        let salt = decode_field("salt", &self.salt)?;
        let nonce = decode_field("nonce", &self.nonce)?;
        let ciphertext = decode_field("ciphertext", &self.ciphertext)?;

        if nonce.len() != NONCE_LENGTH {
            return Err(Error::MalformedEnvelope(format!(
                "nonce must be {NONCE_LENGTH} bytes, got {}",
                nonce.len()
            )));
        }
        if ciphertext.len() < TAG_LENGTH {
            return Err(Error::MalformedEnvelope(format!(
                "ciphertext shorter than the {TAG_LENGTH}-byte tag"
            )));
        }

        let key = derive_key(password.as_bytes(), &salt, &params)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| Error::Cipher)?;

        cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| Error::Decryption)
    }

    /// Decrypt and interpret the plaintext as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Same as [`EncryptedEnvelope::decrypt`].
    pub fn decrypt_string(&self, password: &str) -> Result<Zeroizing<String>> {
        let mut plaintext = self.decrypt(password)?;
        let bytes = core::mem::take(&mut *plaintext);
        String::from_utf8(bytes)
            .map(Zeroizing::new)
            .map_err(|e| {
                // Wipe the rejected buffer before reporting.
                drop(Zeroizing::new(e.into_bytes()));
                Error::InvalidPlaintext
            })
    }

    /// Produce a new envelope for the same plaintext under a new password.
    ///
    /// The new envelope uses `params` and has its own salt and nonce; `self`
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Fails like [`EncryptedEnvelope::decrypt`] for the old password and
    /// like [`EncryptedEnvelope::encrypt_with_params`] for the new one.
    pub fn reencrypt(
        &self,
        old_password: &str,
        new_password: &str,
        params: &KdfParams,
    ) -> Result<Self> {
        let plaintext = self.decrypt(old_password)?;
        Self::encrypt_with_params(&plaintext, new_password, params)
    }

    /// Argon2id parameters recorded in this envelope.
    pub const fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.memory,
            iterations: self.iterations,
            parallelism: self.parallelism,
            key_length: self.key_length,
        }
    }

    /// Format version of this envelope.
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Cipher identifier.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Key derivation identifier.
    pub fn key_derivation(&self) -> &str {
        &self.key_derivation
    }

    /// Serialize to the JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON or missing fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn check_header(&self) -> Result<()> {
        if self.version != ENVELOPE_VERSION {
            return Err(Error::UnsupportedEnvelope(format!(
                "version {}",
                self.version
            )));
        }
        if self.algorithm != ALGORITHM {
            return Err(Error::UnsupportedEnvelope(format!(
                "cipher {:?}",
                self.algorithm
            )));
        }
        if self.key_derivation != KEY_DERIVATION {
            return Err(Error::UnsupportedEnvelope(format!(
                "key derivation {:?}",
                self.key_derivation
            )));
        }
        Ok(())
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|e| Error::MalformedEnvelope(format!("{name} is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::tests::test_params;
    use crate::ErrorKind;

    const PASSWORD: &str = "Abcd1234!@#$";

    fn seal(plaintext: &[u8], password: &str) -> EncryptedEnvelope {
        EncryptedEnvelope::encrypt_with_params(plaintext, password, &test_params()).unwrap()
    }

    /// Flip one bit of a base64 field and re-encode it.
    fn flip_bit(field: &str, byte: usize, bit: u8) -> String {
        let mut raw = BASE64.decode(field).unwrap();
        raw[byte] ^= 1 << bit;
        BASE64.encode(raw)
    }

    #[test]
    fn test_roundtrip() {
        let envelope = seal(b"test mnemonic phrase", PASSWORD);
        let plaintext = envelope.decrypt(PASSWORD).unwrap();
        assert_eq!(plaintext.as_slice(), b"test mnemonic phrase");
    }

    #[test]
    fn test_roundtrip_through_json() {
        let envelope = seal(b"test mnemonic phrase", PASSWORD);
        let json = envelope.to_json().unwrap();
        let parsed = EncryptedEnvelope::from_json(&json).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(*parsed.decrypt_string(PASSWORD).unwrap(), "test mnemonic phrase");
    }

    #[test]
    fn test_roundtrip_empty_and_binary() {
        for plaintext in [&b""[..], &[0u8, 255, 1, 128][..], &[7u8; 1000][..]] {
            let envelope = seal(plaintext, "pw");
            assert_eq!(envelope.decrypt("pw").unwrap().as_slice(), plaintext);
        }
    }

    #[test]
    fn test_json_field_order_and_names() {
        let envelope = seal(b"x", PASSWORD);
        let json = serde_json::to_string(&envelope).unwrap();
        let keys = [
            "\"version\":1",
            "\"algorithm\":\"AES-256-GCM\"",
            "\"key_derivation\":\"Argon2id\"",
            "\"memory\":256",
            "\"iterations\":1",
            "\"parallelism\":1",
            "\"key_length\":32",
            "\"salt\":",
            "\"nonce\":",
            "\"ciphertext\":",
        ];
        let mut last = 0;
        for key in keys {
            let pos = json.find(key).unwrap_or_else(|| panic!("missing {key} in {json}"));
            assert!(pos >= last, "{key} out of order in {json}");
            last = pos;
        }
    }

    #[test]
    fn test_field_sizes() {
        let envelope = seal(b"twelve bytes", PASSWORD);
        assert_eq!(BASE64.decode(&envelope.salt).unwrap().len(), SALT_LENGTH);
        assert_eq!(BASE64.decode(&envelope.nonce).unwrap().len(), NONCE_LENGTH);
        assert_eq!(
            BASE64.decode(&envelope.ciphertext).unwrap().len(),
            12 + TAG_LENGTH
        );
    }

    #[test]
    fn test_salt_and_nonce_fresh_each_time() {
        let a = seal(b"same", PASSWORD);
        let b = seal(b"same", PASSWORD);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let envelope = seal(b"secret", PASSWORD);
        let err = envelope.decrypt("Abcd1234!@#%").unwrap_err();
        assert!(matches!(err, Error::Decryption));
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let envelope = seal(b"secret", PASSWORD);
        let len = BASE64.decode(&envelope.ciphertext).unwrap().len();
        for byte in [0, len / 2, len - 1] {
            for bit in [0, 7] {
                let mut tampered = envelope.clone();
                tampered.ciphertext = flip_bit(&envelope.ciphertext, byte, bit);
                assert!(matches!(tampered.decrypt(PASSWORD), Err(Error::Decryption)));
            }
        }
    }

    #[test]
    fn test_tampered_nonce_rejected() {
        let envelope = seal(b"secret", PASSWORD);
        for byte in 0..NONCE_LENGTH {
            let mut tampered = envelope.clone();
            tampered.nonce = flip_bit(&envelope.nonce, byte, 3);
            assert!(matches!(tampered.decrypt(PASSWORD), Err(Error::Decryption)));
        }
    }

    #[test]
    fn test_tampered_salt_rejected() {
        let envelope = seal(b"secret", PASSWORD);
        let mut tampered = envelope.clone();
        tampered.salt = flip_bit(&envelope.salt, 5, 1);
        assert!(matches!(tampered.decrypt(PASSWORD), Err(Error::Decryption)));
    }

    #[test]
    fn test_tampered_params_rejected() {
        let envelope = seal(b"secret", PASSWORD);
        let mut tampered = envelope.clone();
        tampered.iterations = 2;
        assert!(matches!(tampered.decrypt(PASSWORD), Err(Error::Decryption)));
    }

    #[test]
    fn test_unsupported_header_rejected() {
        let envelope = seal(b"secret", PASSWORD);

        let mut bad = envelope.clone();
        bad.version = 2;
        assert!(matches!(bad.decrypt(PASSWORD), Err(Error::UnsupportedEnvelope(_))));

        let mut bad = envelope.clone();
        bad.algorithm = "ChaCha20-Poly1305".into();
        assert!(matches!(bad.decrypt(PASSWORD), Err(Error::UnsupportedEnvelope(_))));

        let mut bad = envelope;
        bad.key_derivation = "scrypt".into();
        assert!(matches!(bad.decrypt(PASSWORD), Err(Error::UnsupportedEnvelope(_))));
    }

    #[test]
    fn test_malformed_fields_rejected() {
        let envelope = seal(b"secret", PASSWORD);

        let mut bad = envelope.clone();
        bad.nonce = "***".into();
        assert!(matches!(bad.decrypt(PASSWORD), Err(Error::MalformedEnvelope(_))));

        let mut bad = envelope.clone();
        bad.nonce = BASE64.encode([0u8; 8]);
        assert!(matches!(bad.decrypt(PASSWORD), Err(Error::MalformedEnvelope(_))));

        let mut bad = envelope;
        bad.ciphertext = BASE64.encode([0u8; 4]);
        assert!(matches!(bad.decrypt(PASSWORD), Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn test_hostile_memory_cost_rejected_before_derivation() {
        let mut envelope = seal(b"secret", PASSWORD);
        envelope.memory = u32::MAX;
        assert!(matches!(envelope.decrypt(PASSWORD), Err(Error::InvalidKdfParams(_))));
    }

    #[test]
    fn test_stored_params_used_for_decrypt() {
        let params = KdfParams {
            memory_kib: 512,
            iterations: 2,
            parallelism: 2,
            key_length: 32,
        };
        let envelope = EncryptedEnvelope::encrypt_with_params(b"data", "pw", &params).unwrap();
        assert_eq!(envelope.kdf_params(), params);
        assert_eq!(envelope.decrypt("pw").unwrap().as_slice(), b"data");
    }

    #[test]
    fn test_reencrypt() {
        let envelope = seal(b"mnemonic words", "old-password");
        let renewed = envelope
            .reencrypt("old-password", "new-password", &test_params())
            .unwrap();

        assert_ne!(renewed.salt, envelope.salt);
        assert_ne!(renewed.nonce, envelope.nonce);
        assert!(renewed.decrypt("old-password").is_err());
        assert_eq!(renewed.decrypt("new-password").unwrap().as_slice(), b"mnemonic words");
        // The original is unchanged and still opens with the old password.
        assert_eq!(envelope.decrypt("old-password").unwrap().as_slice(), b"mnemonic words");
    }

    #[test]
    fn test_decrypt_string_rejects_non_utf8() {
        let envelope = seal(&[0xff, 0xfe], PASSWORD);
        assert!(matches!(
            envelope.decrypt_string(PASSWORD),
            Err(Error::InvalidPlaintext)
        ));
    }

    #[test]
    #[ignore = "uses the 1 GiB production cost"]
    fn test_roundtrip_default_params() {
        let envelope = EncryptedEnvelope::encrypt(b"test mnemonic phrase", PASSWORD).unwrap();
        assert_eq!(envelope.kdf_params(), KdfParams::default());
        let json = envelope.to_json().unwrap();
        let parsed = EncryptedEnvelope::from_json(&json).unwrap();
        assert_eq!(*parsed.decrypt_string(PASSWORD).unwrap(), "test mnemonic phrase");
    }
}
