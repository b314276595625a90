//! Error types for Ethereum key and signing operations.

use core::fmt;

use ethvault_core::ErrorKind;

/// Errors that can occur during Ethereum wallet operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from the core wallet layer (mnemonic, entropy).
    Core(ethvault_core::Error),
    /// Invalid private key format or value.
    InvalidPrivateKey,
    /// Invalid hex string format.
    InvalidHex,
    /// Invalid derivation path.
    InvalidPath(String),
    /// Key derivation error with details.
    Derivation(String),
    /// Vanity pattern is not a valid regular expression.
    InvalidPattern(String),
    /// Vanity search was cancelled.
    Cancelled,
    /// A hex message did not start with `0x` or did not decode.
    InvalidHexMessage,
    /// Transaction could not be signed (malformed input or signing failure).
    Sign(String),
    /// Signature could not be parsed or recovered.
    InvalidSignature,
}

impl Error {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            Self::InvalidPrivateKey
            | Self::InvalidHex
            | Self::InvalidPath(_)
            | Self::InvalidPattern(_)
            | Self::InvalidHexMessage
            | Self::Sign(_)
            | Self::InvalidSignature => ErrorKind::InputValidation,
            Self::Derivation(_) => ErrorKind::CryptoOperation,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{e}"),
            Self::InvalidPrivateKey => write!(f, "invalid private key"),
            Self::InvalidHex => write!(f, "invalid hex string"),
            Self::InvalidPath(path) => write!(f, "invalid derivation path: {path}"),
            Self::Derivation(msg) => write!(f, "key derivation error: {msg}"),
            Self::InvalidPattern(msg) => write!(f, "invalid pattern: {msg}"),
            Self::Cancelled => write!(f, "search cancelled"),
            Self::InvalidHexMessage => {
                write!(f, "invalid hex message: expected 0x-prefixed hex")
            }
            Self::Sign(msg) => write!(f, "sign failed: {msg}"),
            Self::InvalidSignature => write!(f, "invalid signature"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ethvault_core::Error> for Error {
    fn from(err: ethvault_core::Error) -> Self {
        Self::Core(err)
    }
}

impl From<alloy_rlp::Error> for Error {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Sign(format!("malformed transaction: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_kind_passes_through() {
        let err = Error::from(ethvault_core::Error::Decryption);
        assert_eq!(err.kind(), ErrorKind::Decryption);
    }

    #[test]
    fn test_sign_message_prefix() {
        let err = Error::Sign("chain id is zero".into());
        assert_eq!(err.to_string(), "sign failed: chain id is zero");
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }
}
