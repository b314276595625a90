//! On-disk wallet record wrapping the encrypted mnemonic.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::envelope::EncryptedEnvelope;
use crate::kdf::KdfParams;
use crate::{Error, Result};

/// Current wallet record format version.
pub const WALLET_FILE_VERSION: u32 = 1;

/// BIP44 Ethereum account-level path.
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";

/// BIP44 path of the first Ethereum address.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// A persisted wallet: the encrypted mnemonic plus the paths used with it.
///
/// Paths are fixed when the record is created and read back verbatim; a
/// later change of defaults never moves an existing wallet's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Record format version.
    pub version: u32,
    /// Password-encrypted mnemonic.
    pub encrypted_mnemonic: EncryptedEnvelope,
    /// Account-level HD path.
    #[serde(default)]
    pub hd_path: String,
    /// Full derivation path of the wallet address.
    #[serde(default)]
    pub derivation_path: String,
    /// Whether the wallet is meant for a test network.
    #[serde(default)]
    pub testnet: bool,
}

impl WalletRecord {
    /// Encrypt `mnemonic` under `password` and wrap it with the default paths.
    ///
    /// # Errors
    ///
    /// Propagates envelope encryption errors.
    pub fn create(
        mnemonic: &str,
        password: &str,
        params: &KdfParams,
        testnet: bool,
    ) -> Result<Self> {
        let encrypted_mnemonic =
            EncryptedEnvelope::encrypt_with_params(mnemonic.as_bytes(), password, params)?;
        Ok(Self {
            version: WALLET_FILE_VERSION,
            encrypted_mnemonic,
            hd_path: DEFAULT_HD_PATH.to_string(),
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
            testnet,
        })
    }

    /// Path to derive the wallet address from.
    ///
    /// Uses `derivation_path` when set, then `hd_path`, then the default.
    pub fn derivation_path(&self) -> &str {
        if !self.derivation_path.is_empty() {
            &self.derivation_path
        } else if !self.hd_path.is_empty() {
            &self.hd_path
        } else {
            DEFAULT_DERIVATION_PATH
        }
    }

    /// Decrypt the stored mnemonic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decryption`] for a wrong password or altered file.
    pub fn decrypt_mnemonic(&self, password: &str) -> Result<Zeroizing<String>> {
        self.encrypted_mnemonic.decrypt_string(password)
    }

    /// Replace the envelope with one sealed under `new_password`.
    ///
    /// Paths and flags are carried over unchanged.
    ///
    /// # Errors
    ///
    /// Fails if `old_password` does not open the current envelope.
    pub fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        params: &KdfParams,
    ) -> Result<Self> {
        let encrypted_mnemonic =
            self.encrypted_mnemonic
                .reencrypt(old_password, new_password, params)?;
        Ok(Self {
            encrypted_mnemonic,
            ..self.clone()
        })
    }

    /// Seal an already decrypted `mnemonic` under `new_password`, keeping
    /// this record's paths and flags.
    ///
    /// # Errors
    ///
    /// Propagates envelope encryption errors.
    pub fn reseal(&self, mnemonic: &str, new_password: &str, params: &KdfParams) -> Result<Self> {
        let encrypted_mnemonic =
            EncryptedEnvelope::encrypt_with_params(mnemonic.as_bytes(), new_password, params)?;
        Ok(Self {
            encrypted_mnemonic,
            ..self.clone()
        })
    }

    /// Serialize with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a wallet record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and
    /// [`Error::UnsupportedEnvelope`] for an unknown record version.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)?;
        if record.version != WALLET_FILE_VERSION {
            return Err(Error::UnsupportedEnvelope(format!(
                "wallet file version {}",
                record.version
            )));
        }
        Ok(record)
    }

    /// Parse a wallet record from raw bytes as read from storage.
    ///
    /// # Errors
    ///
    /// Same as [`WalletRecord::from_json`], plus
    /// [`Error::MalformedEnvelope`] for non-UTF-8 input.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let json = core::str::from_utf8(bytes)
            .map_err(|_| Error::MalformedEnvelope("wallet file is not UTF-8".into()))?;
        Self::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::tests::test_params;

    const MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn record() -> WalletRecord {
        WalletRecord::create(MNEMONIC, "Abcd1234!@#$", &test_params(), false).unwrap()
    }

    #[test]
    fn test_create_uses_default_paths() {
        let record = record();
        assert_eq!(record.version, 1);
        assert_eq!(record.hd_path, DEFAULT_HD_PATH);
        assert_eq!(record.derivation_path(), DEFAULT_DERIVATION_PATH);
        assert!(!record.testnet);
    }

    #[test]
    fn test_pretty_json_layout() {
        let json = record().to_json_pretty().unwrap();
        assert!(json.starts_with("{\n  \"version\": 1,\n  \"encrypted_mnemonic\": {\n    \"version\": 1,"));
        let hd = json.find("\"hd_path\"").unwrap();
        let dp = json.find("\"derivation_path\"").unwrap();
        let tn = json.find("\"testnet\": false").unwrap();
        assert!(hd < dp && dp < tn);
    }

    #[test]
    fn test_json_roundtrip_and_decrypt() {
        let original = record();
        let json = original.to_json_pretty().unwrap();
        let parsed = WalletRecord::from_slice(json.as_bytes()).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(*parsed.decrypt_mnemonic("Abcd1234!@#$").unwrap(), MNEMONIC);
    }

    #[test]
    fn test_wrong_password() {
        let err = record().decrypt_mnemonic("wrong").unwrap_err();
        assert!(matches!(err, Error::Decryption));
    }

    #[test]
    fn test_path_fallback() {
        let mut record = record();
        record.derivation_path = "m/44'/60'/0'/0/7".into();
        assert_eq!(record.derivation_path(), "m/44'/60'/0'/0/7");

        record.derivation_path.clear();
        assert_eq!(record.derivation_path(), DEFAULT_HD_PATH);

        record.hd_path.clear();
        assert_eq!(record.derivation_path(), DEFAULT_DERIVATION_PATH);
    }

    #[test]
    fn test_missing_paths_default_to_empty() {
        let envelope = record().encrypted_mnemonic.to_json().unwrap();
        let json = format!("{{\"version\":1,\"encrypted_mnemonic\":{envelope}}}");
        let parsed = WalletRecord::from_json(&json).unwrap();
        assert_eq!(parsed.derivation_path(), DEFAULT_DERIVATION_PATH);
        assert!(!parsed.testnet);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut record = record();
        record.version = 9;
        let json = record.to_json_pretty().unwrap();
        assert!(matches!(
            WalletRecord::from_json(&json),
            Err(Error::UnsupportedEnvelope(_))
        ));
    }

    #[test]
    fn test_change_password_keeps_paths() {
        let mut original = record();
        original.derivation_path = "m/44'/60'/0'/0/3".into();
        original.testnet = true;

        let changed = original
            .change_password("Abcd1234!@#$", "Zyxw9876$#@!", &test_params())
            .unwrap();
        assert_eq!(changed.derivation_path(), "m/44'/60'/0'/0/3");
        assert!(changed.testnet);
        assert!(changed.decrypt_mnemonic("Abcd1234!@#$").is_err());
        assert_eq!(*changed.decrypt_mnemonic("Zyxw9876$#@!").unwrap(), MNEMONIC);
    }

    #[test]
    fn test_reseal_keeps_paths() {
        let mut original = record();
        original.derivation_path = "m/44'/60'/0'/0/5".into();
        original.testnet = true;

        let mnemonic = original.decrypt_mnemonic("Abcd1234!@#$").unwrap();
        let resealed = original
            .reseal(&mnemonic, "Zyxw9876$#@!", &test_params())
            .unwrap();

        assert_ne!(resealed.encrypted_mnemonic, original.encrypted_mnemonic);
        assert_eq!(resealed.derivation_path(), "m/44'/60'/0'/0/5");
        assert_eq!(resealed.hd_path, original.hd_path);
        assert!(resealed.testnet);
        assert!(matches!(
            resealed.decrypt_mnemonic("Abcd1234!@#$"),
            Err(Error::Decryption)
        ));
        assert_eq!(*resealed.decrypt_mnemonic("Zyxw9876$#@!").unwrap(), MNEMONIC);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(WalletRecord::from_slice(&[0xff, 0x00]).is_err());
        assert!(WalletRecord::from_json("{}").is_err());
    }
}
