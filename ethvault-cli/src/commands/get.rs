//! `ethvault get`.

use clap::Args;
use colored::Colorize;

use super::{unlock, CmdResult, Context, WalletArgs};

/// Show a wallet's address and, on request, its secrets.
#[derive(Args)]
pub struct GetCommand {
    #[command(flatten)]
    wallet: WalletArgs,

    /// Print the decrypted mnemonic.
    #[arg(long, alias = "show-mnemonics")]
    show_mnemonic: bool,

    /// Print the private key of the address.
    #[arg(long)]
    show_private_key: bool,

    /// Use no BIP39 passphrase, without asking.
    #[arg(long)]
    no_passphrase: bool,

    /// Display a QR code for the address.
    #[arg(long)]
    qr: bool,
}

impl GetCommand {
    /// Execute the get command.
    #[rustfmt::skip]
    pub fn execute(self, ctx: &Context) -> CmdResult {
        let record = self.wallet.read(ctx)?;
        let unlocked = unlock(&record, self.no_passphrase)?;
        let identity = &unlocked.identity;

        println!();
        println!("      {}      {}", "Address".cyan().bold(), identity.address.green());
        println!("      {}         {}", "Path".cyan().bold(), identity.path);
        if record.testnet {
            println!("      {}      {}", "Network".cyan().bold(), "testnet".dimmed());
        }
        if self.show_mnemonic {
            println!("      {}     {}", "Mnemonic".cyan().bold(), unlocked.mnemonic.as_str());
        }
        if self.show_private_key {
            println!("      {}  0x{}", "Private Key".cyan().bold(), identity.private_key.to_hex().as_str());
        }
        if self.show_mnemonic || self.show_private_key {
            println!();
            println!("      {}", "Anyone who sees these secrets controls the funds.".yellow());
        }
        if self.qr {
            crate::qr::render_to_terminal(&identity.address);
        }
        println!();
        Ok(())
    }
}
