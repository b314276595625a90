//! Core secret handling for the ethvault key-management CLI.
//!
//! This crate owns everything that touches the mnemonic before any chain
//! specific code sees it:
//!
//! - [`Wallet`]: a BIP39 mnemonic and the seed derived from it
//! - [`EncryptedEnvelope`]: Argon2id + AES-256-GCM encryption at rest
//! - [`WalletRecord`]: the persisted wallet file wrapping the envelope
//!
//! # Example
//!
//! ```
//! use ethvault_core::{EncryptedEnvelope, KdfParams, Wallet};
//!
//! let wallet = Wallet::generate("")?;
//!
//! // Light parameters keep the example fast; real wallets use the defaults.
//! let params = KdfParams { memory_kib: 256, iterations: 1, parallelism: 1, key_length: 32 };
//! let envelope = EncryptedEnvelope::encrypt_with_params(
//!     wallet.mnemonic().as_bytes(),
//!     "Abcd1234!@#$",
//!     &params,
//! )?;
//!
//! let plaintext = envelope.decrypt("Abcd1234!@#$")?;
//! assert_eq!(plaintext.as_slice(), wallet.mnemonic().as_bytes());
//! # Ok::<(), ethvault_core::Error>(())
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

pub mod envelope;
mod error;
pub mod kdf;
pub mod mnemonic;
mod wallet;
pub mod wallet_file;

pub use envelope::EncryptedEnvelope;
pub use error::{Error, ErrorKind, Result};
pub use kdf::KdfParams;
pub use mnemonic::generate_mnemonic;
pub use wallet::Wallet;
pub use wallet_file::WalletRecord;
