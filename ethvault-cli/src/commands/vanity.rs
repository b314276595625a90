//! `ethvault vanity`.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use ethvault_core::WalletRecord;
use ethvault_evm::VanitySearch;

use super::create::{print_created, print_warnings};
use super::{CmdResult, Context, WalletArgs};
use crate::prompt;

/// Search for a wallet whose address matches a regular expression.
#[derive(Args)]
pub struct VanityCommand {
    /// Regular expression tested against the checksummed `0x` address,
    /// e.g. `^0x(?i)cafe`.
    #[arg(short, long)]
    pattern: String,

    #[command(flatten)]
    wallet: WalletArgs,

    /// Overwrite an existing wallet at the same location.
    #[arg(long)]
    force: bool,

    /// Save the match without asking.
    #[arg(short, long)]
    yes: bool,

    /// Mark the wallet as intended for test networks.
    #[arg(long)]
    testnet: bool,

    /// Print the mnemonic of the match.
    #[arg(long)]
    show_mnemonic: bool,

    /// Display a QR code for the address.
    #[arg(long)]
    qr: bool,
}

impl VanityCommand {
    /// Execute the vanity command.
    pub fn execute(self, ctx: &Context) -> CmdResult {
        let search = VanitySearch::new(&self.pattern)?;
        if !self.force && self.wallet.exists(ctx)? {
            return Err(format!(
                "a wallet already exists at {} (use --force to overwrite)",
                self.wallet.hint()
            )
            .into());
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            // A second interrupt, or one after the search, exits at once.
            if flag.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
        })?;

        eprintln!(
            "Searching for an address matching {}. Press Ctrl+C to cancel.",
            search.pattern().bold()
        );
        let mut stderr = std::io::stderr();
        let found = search.run(&cancel, |n, address| {
            let _ = write!(stderr, "\rTrying address {n}: {address}");
            let _ = stderr.flush();
        });
        eprintln!();
        let found = found?;
        cancel.store(true, Ordering::SeqCst);

        println!();
        println!(
            "      {}      {}",
            "Found".cyan().bold(),
            found.address.green()
        );
        println!(
            "      {}     {}",
            "Attempts".cyan().bold(),
            found.attempts.to_string().dimmed()
        );
        if self.show_mnemonic {
            println!("      {}     {}", "Mnemonic".cyan().bold(), found.mnemonic.as_str());
        }
        println!();

        if !self.yes && !prompt::confirm("Save this wallet?")? {
            println!("Wallet discarded.");
            return Ok(());
        }

        let password = prompt::new_password()?;
        eprintln!("{}", "Encrypting wallet, this may take a few seconds...".dimmed());
        let record =
            WalletRecord::create(&found.mnemonic, &password, &ctx.kdf_params(), self.testnet)?;
        let saved = self.wallet.write(ctx, &record, self.force)?;

        print_created(&found.address, record.derivation_path(), false, self.testnet);
        println!("      {}        {}", "Saved".cyan().bold(), saved);
        println!();
        println!(
            "      {}",
            "No BIP39 passphrase is used, so the mnemonic alone restores this address.".dimmed()
        );
        print_warnings(false);

        if self.qr {
            crate::qr::render_to_terminal(&found.address);
        }
        Ok(())
    }
}
