//! `ethvault list`.

use std::path::Path;

use clap::Args;
use colored::Colorize;

use super::{CmdResult, Context};
use crate::storage::{list_wallet_names, Provider};

/// List wallets in the configured storage.
#[derive(Args)]
pub struct ListCommand {
    /// Directory to list instead of the configured wallet directory.
    #[arg(short, long)]
    dir: Option<String>,

    /// Storage provider to list instead of the configured one.
    #[arg(short, long)]
    provider: Option<String>,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, ctx: &Context) -> CmdResult {
        let tag = self.provider.as_deref().unwrap_or(&ctx.config.storage_provider);
        let storage = Provider::from_tag(tag)?.open(Path::new(&ctx.config.storage_path));
        let dir = self.dir.as_deref().unwrap_or("");
        let names = list_wallet_names(storage.as_ref(), dir)?;

        if names.is_empty() {
            println!("No wallets found");
            return Ok(());
        }

        let location = if dir.is_empty() { ctx.config.storage_path.as_str() } else { dir };
        println!();
        println!("      {}  {}", "Wallets in".cyan().bold(), location.dimmed());
        println!();
        for name in &names {
            println!("      {}", name.green());
        }
        println!();
        Ok(())
    }
}
