//! Vanity address search.
//!
//! Each attempt draws a fresh 24-word mnemonic, derives the first account
//! with an empty BIP39 passphrase and tests the checksummed address against
//! a regular expression. The empty passphrase makes a found address
//! reproducible from the mnemonic alone; encrypting the mnemonic afterwards
//! does not change it.

use std::sync::atomic::{AtomicBool, Ordering};

use ethvault_core::generate_mnemonic;
use ethvault_core::wallet_file::DEFAULT_DERIVATION_PATH;
use regex::Regex;
use zeroize::Zeroizing;

use crate::deriver::derive_identity;
use crate::{Error, Result};

/// How often progress is logged at debug level.
const LOG_EVERY: u64 = 10_000;

/// A compiled vanity search.
#[derive(Debug, Clone)]
pub struct VanitySearch {
    pattern: Regex,
}

/// A mnemonic whose default address matched the pattern.
#[derive(Debug)]
pub struct VanityMatch {
    /// The winning 24-word mnemonic.
    pub mnemonic: Zeroizing<String>,
    /// Its checksummed address at `m/44'/60'/0'/0/0`.
    pub address: String,
    /// Number of candidates tried, including the match.
    pub attempts: u64,
}

impl VanitySearch {
    /// Compile `pattern` for matching against `0x`-prefixed checksummed
    /// addresses.
    ///
    /// Matching is a regex search, so `"dead"` matches anywhere; anchor with
    /// `^0x` to pin a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// Source text of the pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Test an address against the pattern.
    pub fn is_match(&self, address: &str) -> bool {
        self.pattern.is_match(address)
    }

    /// Search until an address matches or `cancel` is set.
    ///
    /// `on_attempt` is called with the attempt number and candidate address
    /// after every derivation. `cancel` is checked before each attempt, so a
    /// search cancelled from inside `on_attempt` stops before the next one.
    ///
    /// There is no attempt limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` was set, or the entropy or
    /// derivation error that stopped the search.
    pub fn run<F>(&self, cancel: &AtomicBool, mut on_attempt: F) -> Result<VanityMatch>
    where
        F: FnMut(u64, &str),
    {
        tracing::debug!(pattern = self.pattern(), "starting vanity search");

        let mut attempts: u64 = 0;
        loop {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!(attempts, "vanity search cancelled");
                return Err(Error::Cancelled);
            }
            attempts += 1;

            let mnemonic = generate_mnemonic()?;
            let identity = derive_identity(&mnemonic, "", DEFAULT_DERIVATION_PATH)?;
            on_attempt(attempts, &identity.address);

            if attempts % LOG_EVERY == 0 {
                tracing::debug!(attempts, "vanity search progress");
            }

            if self.is_match(&identity.address) {
                tracing::debug!(attempts, address = %identity.address, "vanity match found");
                return Ok(VanityMatch {
                    mnemonic,
                    address: identity.address,
                    attempts,
                });
            }
        }
    }
}
