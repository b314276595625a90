//! `ethvault passwd`.

use clap::Args;
use colored::Colorize;

use super::{CmdResult, Context, WalletArgs};
use crate::prompt;

/// Re-encrypt a wallet under a new password.
///
/// The mnemonic, paths and address are unchanged; only the envelope is
/// replaced, with a fresh salt and nonce.
#[derive(Args)]
pub struct PasswdCommand {
    #[command(flatten)]
    wallet: WalletArgs,
}

impl PasswdCommand {
    /// Execute the passwd command.
    pub fn execute(self, ctx: &Context) -> CmdResult {
        let record = self.wallet.read(ctx)?;
        let old = prompt::secret("Current password: ")?;
        // Fail on a wrong password before asking for the new one.
        let mnemonic = record.decrypt_mnemonic(&old)?;

        let new = prompt::new_password()?;
        eprintln!("{}", "Re-encrypting wallet, this may take a few seconds...".dimmed());
        let updated = record.reseal(&mnemonic, &new, &ctx.kdf_params())?;
        let saved = self.wallet.write(ctx, &updated, true)?;

        println!();
        println!("      {}", "Password changed.".green());
        println!("      {}", saved.dimmed());
        println!();
        Ok(())
    }
}
