//! Mnemonic-backed HD wallet seed.

use bip39::{Language, Mnemonic};
use zeroize::Zeroizing;

use crate::mnemonic::generate_mnemonic;
use crate::Result;

/// An HD wallet seed together with the mnemonic it came from.
///
/// The seed is computed with PBKDF2-HMAC-SHA512 over the mnemonic and the
/// BIP39 passphrase. Both the phrase and the 64-byte seed are wiped when the
/// wallet is dropped.
///
/// # Passphrase
///
/// There is no "no passphrase" state: a wallet always has exactly one
/// passphrase, and it defaults to the empty string. The same mnemonic with
/// different passphrases yields unrelated seeds.
pub struct Wallet {
    /// BIP39 mnemonic phrase.
    mnemonic: Zeroizing<String>,
    /// Seed derived from mnemonic + passphrase.
    seed: Zeroizing<[u8; 64]>,
    /// Whether a non-empty passphrase was used.
    has_passphrase: bool,
}

impl Wallet {
    /// Generate a wallet around a fresh 24-word mnemonic.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS random source fails.
    pub fn generate(passphrase: &str) -> Result<Self> {
        let phrase = generate_mnemonic()?;
        Self::from_mnemonic(&phrase, passphrase)
    }

    /// Create a wallet from an existing mnemonic phrase.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Mnemonic`] if the phrase has an unknown word,
    /// an unsupported length or a bad checksum.
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)?;
        let seed = Zeroizing::new(mnemonic.to_seed(passphrase));

        Ok(Self {
            mnemonic: Zeroizing::new(mnemonic.to_string()),
            seed,
            has_passphrase: !passphrase.is_empty(),
        })
    }

    /// Get the mnemonic phrase.
    ///
    /// **Security Warning**: anyone holding this phrase (and the passphrase)
    /// controls every derived key.
    #[inline]
    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Get the seed bytes for key derivation.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> &[u8; 64] {
        &self.seed
    }

    /// Check whether a non-empty passphrase was used to derive the seed.
    #[must_use]
    pub const fn has_passphrase(&self) -> bool {
        self.has_passphrase
    }

    /// Get the word count of the mnemonic.
    #[inline]
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.mnemonic.split_whitespace().count()
    }
}

impl core::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Wallet")
            .field("mnemonic", &"[REDACTED]")
            .field("seed", &"[REDACTED]")
            .field("has_passphrase", &self.has_passphrase)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_24_words() {
        let wallet = Wallet::generate("").unwrap();
        assert_eq!(wallet.word_count(), 24);
        assert!(!wallet.has_passphrase());
    }

    #[test]
    fn test_generate_with_passphrase() {
        let wallet = Wallet::generate("secret").unwrap();
        assert!(wallet.has_passphrase());
    }

    #[test]
    fn test_from_mnemonic() {
        let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, "").unwrap();
        assert_eq!(wallet.mnemonic(), TEST_MNEMONIC);
        assert_eq!(wallet.word_count(), 12);
    }

    #[test]
    fn test_bip39_seed_vector() {
        // BIP39 reference vector (passphrase "TREZOR").
        let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, "TREZOR").unwrap();
        let expected = hex_literal::hex!(
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
        assert_eq!(wallet.seed(), &expected);
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let wallet1 = Wallet::from_mnemonic(TEST_MNEMONIC, "").unwrap();
        let wallet2 = Wallet::from_mnemonic(TEST_MNEMONIC, "password").unwrap();

        assert_ne!(wallet1.seed(), wallet2.seed());
    }

    #[test]
    fn test_deterministic_seed() {
        let wallet1 = Wallet::from_mnemonic(TEST_MNEMONIC, "test").unwrap();
        let wallet2 = Wallet::from_mnemonic(TEST_MNEMONIC, "test").unwrap();

        assert_eq!(wallet1.seed(), wallet2.seed());
    }

    #[test]
    fn test_invalid_mnemonic_rejected() {
        assert!(Wallet::from_mnemonic("not a real mnemonic", "").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, "").unwrap();
        let debug = format!("{wallet:?}");
        assert!(!debug.contains("abandon"));
        assert!(debug.contains("REDACTED"));
    }
}
