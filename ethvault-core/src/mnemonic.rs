//! BIP-39 mnemonic generation.
//!
//! This is the single point where fresh entropy enters wallet creation.
//! Entropy always comes from the operating system CSPRNG; if it cannot be
//! read the call fails with [`Error::Entropy`] rather than falling back to
//! anything weaker.
//!
//! # Example
//!
//! ```
//! let phrase = ethvault_core::mnemonic::generate_mnemonic().unwrap();
//! assert_eq!(phrase.split_whitespace().count(), 24);
//! ```

use bip39::{Language, Mnemonic};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Entropy size for generated mnemonics: 256 bits, i.e. 24 words.
pub const ENTROPY_BYTES: usize = 32;

/// Number of words in a generated mnemonic.
pub const WORD_COUNT: usize = 24;

/// Generate a fresh 24-word English mnemonic from 256 bits of OS entropy.
///
/// # Errors
///
/// Returns [`Error::Entropy`] if the OS random source fails.
pub fn generate_mnemonic() -> Result<Zeroizing<String>> {
    let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
    fill_random(&mut entropy[..])?;

    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..])?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Check that a phrase is a valid English BIP-39 mnemonic.
///
/// # Errors
///
/// Returns [`Error::Mnemonic`] for unknown words, a wrong word count or a
/// bad checksum.
pub fn validate(phrase: &str) -> Result<()> {
    Mnemonic::parse_in(Language::English, phrase)?;
    Ok(())
}

/// Fill `buf` from the OS CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Entropy(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_24_words() {
        let phrase = generate_mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), WORD_COUNT);
        assert!(validate(&phrase).is_ok());
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let a = generate_mnemonic().unwrap();
        let b = generate_mnemonic().unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_validate_rejects_bad_checksum() {
        // "abandon" x12 has an invalid checksum word.
        let phrase = ["abandon"; 12].join(" ");
        let err = validate(&phrase).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InputValidation);
    }

    #[test]
    fn test_validate_rejects_unknown_word() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon zzzz";
        assert!(validate(phrase).is_err());
    }

    #[test]
    fn test_validate_accepts_known_vector() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(validate(phrase).is_ok());
    }
}
