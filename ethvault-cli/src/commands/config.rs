//! `ethvault config`.

use clap::{Args, Subcommand};
use colored::Colorize;

use super::{CmdResult, Context};
use crate::config::{Config, CONFIG_FILE};

/// Show or change settings.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective settings.
    Show,

    /// Change one setting.
    Set {
        /// `storage_provider`, `storage_path`, `kdf.memory_kib`,
        /// `kdf.iterations` or `kdf.parallelism`.
        key: String,

        /// New value.
        value: String,
    },

    /// Restore the default settings.
    Reset,
}

impl ConfigCommand {
    /// Execute the config command.
    #[rustfmt::skip]
    pub fn execute(self, ctx: &Context) -> CmdResult {
        match self.command {
            ConfigSubcommand::Show => {
                let kdf = ctx.kdf_params();
                println!();
                println!("      {}  {}", "Config file".cyan().bold(), ctx.app_dir.join(CONFIG_FILE).display());
                println!("      {}     {}", "Provider".cyan().bold(), ctx.config.storage_provider);
                println!("      {}      {}", "Storage".cyan().bold(), ctx.config.storage_path);
                println!(
                    "      {}     {} KiB, {} passes, {} lanes{}",
                    "Argon2id".cyan().bold(),
                    kdf.memory_kib,
                    kdf.iterations,
                    kdf.parallelism,
                    if ctx.config.kdf.is_none() { " (default)".dimmed() } else { "".normal() },
                );
                println!();
            }
            ConfigSubcommand::Set { key, value } => {
                let mut config = ctx.config.clone();
                config.set(&key, &value)?;
                let path = config.save(&ctx.app_dir)?;
                println!("Set {key} in {}", path.display());
            }
            ConfigSubcommand::Reset => {
                let path = Config::default_for(&ctx.app_dir).save(&ctx.app_dir)?;
                println!("Restored defaults in {}", path.display());
            }
        }
        Ok(())
    }
}
