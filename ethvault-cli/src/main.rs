//! Ethvault - a self-custody Ethereum wallet CLI.
//!
//! Generates BIP39 mnemonics, keeps them encrypted with Argon2id and
//! AES-256-GCM, and derives keys on demand to sign messages and transactions.

mod commands;
mod config;
mod prompt;
mod qr;
mod storage;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use commands::{Cli, Context};
use ethvault_core::ErrorKind;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, code) = describe(e.as_ref());
            eprintln!("Error: {message}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let app_dir = config::app_dir(cli.home.as_deref())?;
    let config = config::Config::load(&app_dir)?;
    tracing::debug!(app_dir = %app_dir.display(), provider = %config.storage_provider, "loaded config");

    let ctx = Context { app_dir, config };
    cli.command.execute(&ctx)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Error category of a library error, if `err` is one.
fn kind_of(err: &(dyn Error + 'static)) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<ethvault_core::Error>() {
        return Some(e.kind());
    }
    err.downcast_ref::<ethvault_evm::Error>().map(ethvault_evm::Error::kind)
}

/// User-facing message and exit code for a failed command.
fn describe(err: &(dyn Error + 'static)) -> (String, u8) {
    match kind_of(err) {
        Some(ErrorKind::Decryption) => ("could not decrypt, check your password".into(), 1),
        Some(ErrorKind::Cancelled) => ("cancelled".into(), 130),
        _ => (err.to_string(), 1),
    }
}
