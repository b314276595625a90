//! Error types for core wallet operations.

use core::fmt;

/// Coarse classification of a failure, independent of the operation that
/// produced it.
///
/// The CLI layer decides presentation from this alone; for example every
/// [`ErrorKind::Decryption`] is reported as "could not decrypt, check your
/// password" regardless of whether the password or the file was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed caller input, rejected before any expensive work.
    InputValidation,
    /// Authenticated decryption failed.
    Decryption,
    /// A cryptographic primitive failed.
    CryptoOperation,
    /// The operating system could not supply randomness.
    Entropy,
    /// The operation was cancelled by the caller.
    Cancelled,
}

/// Errors that can occur during wallet operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid mnemonic phrase (unknown word, bad checksum, bad length).
    Mnemonic(bip39::Error),
    /// The OS random number generator failed.
    Entropy(String),
    /// Argon2 parameters outside the accepted range.
    InvalidKdfParams(String),
    /// The envelope or wallet file cannot be interpreted.
    MalformedEnvelope(String),
    /// Envelope was produced by an unknown format version or algorithm.
    UnsupportedEnvelope(String),
    /// Password-based key derivation failed.
    KeyDerivation(String),
    /// Cipher construction or sealing failed.
    Cipher,
    /// Authentication tag did not verify.
    ///
    /// Deliberately carries no detail: a wrong password and a tampered
    /// envelope must be indistinguishable.
    Decryption,
    /// Decrypted plaintext is not valid UTF-8.
    InvalidPlaintext,
    /// JSON (de)serialization failed.
    Json(serde_json::Error),
}

impl Error {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Mnemonic(_)
            | Self::InvalidKdfParams(_)
            | Self::MalformedEnvelope(_)
            | Self::UnsupportedEnvelope(_)
            | Self::Json(_) => ErrorKind::InputValidation,
            Self::Decryption | Self::InvalidPlaintext => ErrorKind::Decryption,
            Self::KeyDerivation(_) | Self::Cipher => ErrorKind::CryptoOperation,
            Self::Entropy(_) => ErrorKind::Entropy,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mnemonic(e) => write!(f, "invalid mnemonic: {e}"),
            Self::Entropy(msg) => write!(f, "random number generator failed: {msg}"),
            Self::InvalidKdfParams(msg) => write!(f, "invalid key derivation parameters: {msg}"),
            Self::MalformedEnvelope(msg) => write!(f, "malformed encrypted envelope: {msg}"),
            Self::UnsupportedEnvelope(msg) => write!(f, "unsupported encrypted envelope: {msg}"),
            Self::KeyDerivation(msg) => write!(f, "password key derivation failed: {msg}"),
            Self::Cipher => write!(f, "cipher operation failed"),
            Self::Decryption | Self::InvalidPlaintext => write!(f, "decryption failed"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mnemonic(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bip39::Error> for Error {
    fn from(err: bip39::Error) -> Self {
        Self::Mnemonic(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// A convenient Result type alias for ethvault-core operations.
pub type Result<T> = core::result::Result<T, Error>;
