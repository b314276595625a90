//! `ethvault create`.

use clap::Args;
use colored::Colorize;
use ethvault_core::{Wallet, WalletRecord};
use ethvault_evm::Deriver;

use super::{CmdResult, Context, WalletArgs};
use crate::prompt::{self, PassphraseUse};

/// Create a wallet with a new random mnemonic.
#[derive(Args)]
pub struct CreateCommand {
    #[command(flatten)]
    wallet: WalletArgs,

    /// Overwrite an existing wallet at the same location.
    #[arg(long)]
    force: bool,

    /// Use no BIP39 passphrase, without asking.
    #[arg(long)]
    no_passphrase: bool,

    /// Mark the wallet as intended for test networks.
    #[arg(long)]
    testnet: bool,

    /// Display a QR code for the address.
    #[arg(long)]
    qr: bool,
}

impl CreateCommand {
    /// Execute the create command.
    pub fn execute(self, ctx: &Context) -> CmdResult {
        if !self.force && self.wallet.exists(ctx)? {
            return Err(format!(
                "a wallet already exists at {} (use --force to overwrite)",
                self.wallet.hint()
            )
            .into());
        }

        let password = prompt::new_password()?;
        let passphrase = prompt::passphrase(PassphraseUse::Create, self.no_passphrase)?;

        let wallet = Wallet::generate(&passphrase)?;
        eprintln!("{}", "Encrypting wallet, this may take a few seconds...".dimmed());
        let record = WalletRecord::create(
            wallet.mnemonic(),
            &password,
            &ctx.kdf_params(),
            self.testnet,
        )?;
        let identity = Deriver::new(&wallet).derive_at_path(record.derivation_path())?;
        let saved = self.wallet.write(ctx, &record, self.force)?;

        print_created(&identity.address, &identity.path, wallet.has_passphrase(), self.testnet);
        println!("      {}        {}", "Saved".cyan().bold(), saved);
        println!();
        println!(
            "      Check it with: {}",
            format!("ethvault get {}", self.wallet.hint()).bold()
        );
        print_warnings(wallet.has_passphrase());

        if self.qr {
            crate::qr::render_to_terminal(&identity.address);
        }
        Ok(())
    }
}

#[rustfmt::skip]
pub(super) fn print_created(address: &str, path: &str, has_passphrase: bool, testnet: bool) {
    println!();
    println!("      {}      {}", "Address".cyan().bold(), address.green());
    println!("      {}         {}", "Path".cyan().bold(), path);
    if has_passphrase {
        println!("      {}   {}", "Passphrase".cyan().bold(), "(set, not stored)".dimmed());
    }
    if testnet {
        println!("      {}      {}", "Network".cyan().bold(), "testnet".dimmed());
    }
}

pub(super) fn print_warnings(has_passphrase: bool) {
    println!();
    println!(
        "      {}",
        "Keep your password safe. The wallet file cannot be decrypted without it.".yellow()
    );
    if has_passphrase {
        println!(
            "      {}",
            "Your BIP39 passphrase is not saved. Without it this address cannot be recovered."
                .yellow()
        );
    }
    println!();
}
