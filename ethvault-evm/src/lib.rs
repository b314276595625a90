//! Ethereum keys, addresses and signatures for ethvault.
//!
//! Takes a [`ethvault_core::Wallet`] seed to a secp256k1 key and EIP-55
//! address, and signs transactions and EIP-191 messages with it.
//!
//! # Example
//!
//! ```
//! use ethvault_evm::{derive_identity, recover_message_signer, sign_message};
//!
//! let identity = derive_identity(
//!     "test test test test test test test test test test test junk",
//!     "",
//!     "m/44'/60'/0'/0/0",
//! )?;
//! assert_eq!(identity.address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
//!
//! let signature = sign_message(b"hello", &identity.private_key)?;
//! assert_eq!(recover_message_signer(b"hello", &signature)?, identity.address);
//! # Ok::<(), ethvault_evm::Error>(())
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
    clippy::doc_markdown,
    clippy::cast_possible_truncation
)]

pub mod address;
mod deriver;
pub mod eip191;
mod error;
mod private_key;
pub mod rlp;
pub mod transaction;
mod vanity;

pub use address::to_checksum_address;
pub use deriver::{derive_identity, parse_path, DerivedIdentity, Deriver};
pub use eip191::{hash_message, message_bytes, recover_message_signer, sign_message};
pub use error::Error;
pub use private_key::PrivateKey;
pub use transaction::{sign_transaction, SignedTransaction, TxType, UnsignedTransaction};
pub use vanity::{VanityMatch, VanitySearch};

/// A convenient Result type alias for ethvault-evm operations.
pub type Result<T> = core::result::Result<T, Error>;
