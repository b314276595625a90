//! Ethereum key derivation from a mnemonic-backed wallet.

use bip32::{DerivationPath, XPrv};
use ethvault_core::wallet_file::DEFAULT_DERIVATION_PATH;
use ethvault_core::Wallet;

use crate::private_key::PrivateKey;
use crate::{Error, Result};

/// Ethereum address deriver over a wallet seed.
///
/// # Example
///
/// ```
/// use ethvault_core::Wallet;
/// use ethvault_evm::Deriver;
///
/// let wallet = Wallet::from_mnemonic(
///     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
///     "",
/// )?;
/// let identity = Deriver::new(&wallet).derive_default()?;
/// assert_eq!(identity.address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
/// # Ok::<(), ethvault_evm::Error>(())
/// ```
#[derive(Debug)]
pub struct Deriver<'a> {
    wallet: &'a Wallet,
}

/// A private key and the address it controls, derived at one path.
///
/// Held only for the operation that needs it; the key is wiped on drop.
#[derive(Debug)]
pub struct DerivedIdentity {
    /// Derivation path used (e.g., `m/44'/60'/0'/0/0`).
    pub path: String,
    /// Signing key.
    pub private_key: PrivateKey,
    /// Checksummed Ethereum address (EIP-55).
    pub address: String,
}

impl<'a> Deriver<'a> {
    /// Create a new Ethereum deriver from a wallet.
    #[must_use]
    pub const fn new(wallet: &'a Wallet) -> Self {
        Self { wallet }
    }

    /// Derive the first BIP44 Ethereum account, `m/44'/60'/0'/0/0`.
    ///
    /// # Errors
    ///
    /// Returns an error if derivation fails.
    pub fn derive_default(&self) -> Result<DerivedIdentity> {
        self.derive_at_path(DEFAULT_DERIVATION_PATH)
    }

    /// Derive the key and address at a BIP32 path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for an unparsable path and
    /// [`Error::Derivation`] if a child key is invalid.
    pub fn derive_at_path(&self, path: &str) -> Result<DerivedIdentity> {
        let derivation_path = parse_path(path)?;
        self.derive_parsed(path, &derivation_path)
    }

    fn derive_parsed(
        &self,
        path: &str,
        derivation_path: &DerivationPath,
    ) -> Result<DerivedIdentity> {
        let derived = XPrv::derive_from_path(self.wallet.seed(), derivation_path)
            .map_err(|e| Error::Derivation(e.to_string()))?;
        let private_key = PrivateKey::from(derived.private_key().clone());
        let address = private_key.address();

        tracing::debug!(path, address = %address, "derived account");

        Ok(DerivedIdentity {
            path: path.to_string(),
            private_key,
            address,
        })
    }
}

/// Parse a BIP32 derivation path such as `m/44'/60'/0'/0/0`.
///
/// Cheap enough to run before any password prompt or key stretching.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if `path` is not a valid BIP32 path.
pub fn parse_path(path: &str) -> Result<DerivationPath> {
    path.parse()
        .map_err(|e| Error::InvalidPath(format!("{path}: {e}")))
}

/// Derive the identity for a mnemonic, passphrase and path in one call.
///
/// An empty `path` means `m/44'/60'/0'/0/0`. The path is checked before the
/// seed is computed. The intermediate seed is wiped before this returns.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] for a bad path, [`Error::Core`] for an
/// invalid mnemonic and derivation errors from [`Deriver::derive_at_path`].
pub fn derive_identity(mnemonic: &str, passphrase: &str, path: &str) -> Result<DerivedIdentity> {
    let path = if path.is_empty() {
        DEFAULT_DERIVATION_PATH
    } else {
        path
    };
    let derivation_path = parse_path(path)?;

    let wallet = Wallet::from_mnemonic(mnemonic, passphrase)?;
    Deriver::new(&wallet).derive_parsed(path, &derivation_path)
}
