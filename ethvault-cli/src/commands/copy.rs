//! `ethvault copy`.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use super::{CmdResult, Context, WalletArgs};

/// Copy a wallet file to another location.
///
/// The record is parsed before it is written, so only valid wallet files are
/// copied. With a `--file` source and no destination, the file is imported
/// into the configured storage under its own base name.
#[derive(Args)]
pub struct CopyCommand {
    #[command(flatten)]
    from: WalletArgs,

    /// Destination wallet name in the configured storage.
    #[arg(long, conflicts_with = "to_file")]
    to_name: Option<String>,

    /// Destination file path.
    #[arg(long)]
    to_file: Option<PathBuf>,

    /// Overwrite an existing wallet at the destination.
    #[arg(long)]
    force: bool,
}

impl CopyCommand {
    /// Execute the copy command.
    pub fn execute(&self, ctx: &Context) -> CmdResult {
        let to = self.destination()?;
        let record = self.from.read(ctx)?;
        let saved = to.write(ctx, &record, self.force)?;

        println!();
        println!("      {}  {}", "Copied".cyan().bold(), saved);
        println!();
        Ok(())
    }

    fn destination(&self) -> CmdResult<WalletArgs> {
        if self.to_name.is_some() || self.to_file.is_some() {
            return Ok(WalletArgs {
                name: self.to_name.clone(),
                file: self.to_file.clone(),
            });
        }
        let stem = self
            .from
            .file
            .as_deref()
            .and_then(|f| f.file_stem())
            .ok_or("specify a destination with --to-name or --to-file")?;
        Ok(WalletArgs {
            name: Some(stem.to_string_lossy().into_owned()),
            file: None,
        })
    }
}
