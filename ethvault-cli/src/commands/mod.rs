//! CLI command definitions and handlers.

mod config;
mod copy;
mod create;
mod get;
mod list;
mod passwd;
mod sign;
mod vanity;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ethvault_core::{KdfParams, WalletRecord};
use ethvault_evm::{derive_identity, parse_path, DerivedIdentity};
use zeroize::Zeroizing;

pub use config::ConfigCommand;
pub use copy::CopyCommand;
pub use create::CreateCommand;
pub use get::GetCommand;
pub use list::ListCommand;
pub use passwd::PasswdCommand;
pub use sign::{SignMessageCommand, SignTxCommand, VerifyMessageCommand};
pub use vanity::VanityCommand;

use crate::config::Config;
use crate::prompt::{self, PassphraseUse};
use crate::storage::{self, LocalStorage, Provider, Storage};

/// Boxed error used by command handlers.
pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Ethvault - a self-custody Ethereum wallet for the terminal.
#[derive(Parser)]
#[command(name = "ethvault")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding `.ethvault` (defaults to the user's home).
    #[arg(long, global = true, env = "ETHVAULT_HOME")]
    pub home: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a wallet with a new random mnemonic.
    Create(CreateCommand),

    /// Search for a wallet whose address matches a pattern.
    #[command(alias = "create-special")]
    Vanity(VanityCommand),

    /// Show a wallet's address and, on request, its secrets.
    #[command(alias = "get-address")]
    Get(GetCommand),

    /// Sign a message with the EIP-191 prefix.
    SignMessage(SignMessageCommand),

    /// Check which address signed a message.
    VerifyMessage(VerifyMessageCommand),

    /// Sign an unsigned raw transaction.
    #[command(alias = "sign-raw-tx")]
    SignTx(SignTxCommand),

    /// List wallets in the configured storage.
    List(ListCommand),

    /// Copy a wallet file to another location.
    Copy(CopyCommand),

    /// Re-encrypt a wallet under a new password.
    Passwd(PasswdCommand),

    /// Show or change settings.
    Config(ConfigCommand),
}

impl Commands {
    /// Run the selected command.
    pub fn execute(self, ctx: &Context) -> CmdResult {
        match self {
            Self::Create(cmd) => cmd.execute(ctx),
            Self::Vanity(cmd) => cmd.execute(ctx),
            Self::Get(cmd) => cmd.execute(ctx),
            Self::SignMessage(cmd) => cmd.execute(ctx),
            Self::VerifyMessage(cmd) => cmd.execute(),
            Self::SignTx(cmd) => cmd.execute(ctx),
            Self::List(cmd) => cmd.execute(ctx),
            Self::Copy(cmd) => cmd.execute(ctx),
            Self::Passwd(cmd) => cmd.execute(ctx),
            Self::Config(cmd) => cmd.execute(ctx),
        }
    }
}

/// Resolved settings shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Application directory (`<home>/.ethvault`).
    pub app_dir: PathBuf,
    /// Loaded config.
    pub config: Config,
}

impl Context {
    /// Open the configured storage backend.
    pub fn storage(&self) -> CmdResult<Box<dyn Storage>> {
        let provider = Provider::from_tag(&self.config.storage_provider)?;
        Ok(provider.open(Path::new(&self.config.storage_path)))
    }

    /// KDF parameters for newly written envelopes.
    pub fn kdf_params(&self) -> KdfParams {
        self.config.kdf_params()
    }
}

/// Where a wallet lives: a name in the configured storage or a file path.
#[derive(Args, Debug, Clone)]
pub struct WalletArgs {
    /// Wallet name in the configured storage.
    #[arg(short, long, conflicts_with = "file")]
    pub name: Option<String>,

    /// Path to a wallet file.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl WalletArgs {
    /// Storage backend and identifier for this wallet.
    pub fn target(&self, ctx: &Context) -> CmdResult<(Box<dyn Storage>, String)> {
        match (&self.name, &self.file) {
            (_, Some(file)) => {
                let storage: Box<dyn Storage> = Box::new(LocalStorage::new("."));
                Ok((storage, file.to_string_lossy().into_owned()))
            }
            (Some(name), None) => Ok((ctx.storage()?, wallet_id(name)?)),
            (None, None) => Err("specify a wallet with --name or --file".into()),
        }
    }

    /// Read and parse the wallet record.
    pub fn read(&self, ctx: &Context) -> CmdResult<WalletRecord> {
        let (storage, id) = self.target(ctx)?;
        let data = storage.get(&id)?;
        Ok(WalletRecord::from_slice(&data)?)
    }

    /// Whether a wallet already exists at this location.
    pub fn exists(&self, ctx: &Context) -> CmdResult<bool> {
        let (storage, id) = self.target(ctx)?;
        match storage.get(&id) {
            Ok(_) => Ok(true),
            Err(storage::Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Serialize and store a wallet record.
    pub fn write(
        &self,
        ctx: &Context,
        record: &WalletRecord,
        overwrite: bool,
    ) -> CmdResult<String> {
        let (storage, id) = self.target(ctx)?;
        let json = record.to_json_pretty()?;
        Ok(storage.put(json.as_bytes(), &id, overwrite)?)
    }

    /// How to refer to this wallet in follow-up commands.
    pub fn hint(&self) -> String {
        match (&self.name, &self.file) {
            (_, Some(file)) => format!("--file {}", file.display()),
            (Some(name), None) => format!("--name {name}"),
            (None, None) => String::new(),
        }
    }
}

/// Storage identifier for a wallet name.
pub fn wallet_id(name: &str) -> CmdResult<String> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(format!("invalid wallet name: {name:?}").into());
    }
    let stem = name.strip_suffix(".json").unwrap_or(name);
    Ok(format!("{stem}.json"))
}

/// Decrypt the mnemonic in `record`, asking for the password and passphrase,
/// and derive the wallet's signing identity.
pub fn unlock(record: &WalletRecord, no_passphrase: bool) -> CmdResult<Unlocked> {
    // A bad path fails here, before any prompt or key stretching.
    parse_path(record.derivation_path())?;

    let password = prompt::existing_password()?;
    let mnemonic = record.decrypt_mnemonic(&password)?;
    let passphrase = prompt::passphrase(PassphraseUse::Unlock, no_passphrase)?;
    let identity = derive_identity(&mnemonic, &passphrase, record.derivation_path())?;
    Ok(Unlocked { mnemonic, identity })
}

/// Secrets recovered from a wallet record.
pub struct Unlocked {
    /// Decrypted mnemonic.
    pub mnemonic: Zeroizing<String>,
    /// Key and address at the record's derivation path.
    pub identity: DerivedIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_id() {
        assert_eq!(wallet_id("main").unwrap(), "main.json");
        assert_eq!(wallet_id("main.json").unwrap(), "main.json");
        assert_eq!(wallet_id(" cold ").unwrap(), "cold.json");
    }

    #[test]
    fn test_wallet_id_rejects_paths() {
        for bad in ["", "  ", "a/b", "..\\x", ".hidden"] {
            assert!(wallet_id(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_wallet_args_conflict() {
        let res = Cli::try_parse_from(["ethvault", "get", "--name", "a", "--file", "b.json"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ethvault", "list", "-vv", "--home", "/tmp/h"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.home.as_deref(), Some(Path::new("/tmp/h")));
    }

    #[test]
    fn test_name_and_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            app_dir: dir.path().to_path_buf(),
            config: Config::default_for(dir.path()),
        };
        let params = ethvault_core::KdfParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
            key_length: 32,
        };
        let record = WalletRecord::create("abandon", "pw", &params, false).unwrap();

        let by_name = WalletArgs {
            name: Some("w1".into()),
            file: None,
        };
        by_name.write(&ctx, &record, false).unwrap();
        assert_eq!(by_name.read(&ctx).unwrap(), record);
        assert!(by_name.write(&ctx, &record, false).is_err());

        let path = dir.path().join("elsewhere").join("w2.json");
        let by_file = WalletArgs {
            name: None,
            file: Some(path.clone()),
        };
        by_file.write(&ctx, &record, false).unwrap();
        assert!(path.is_file());
        assert_eq!(by_file.read(&ctx).unwrap(), record);
    }

    #[test]
    fn test_unlock_rejects_bad_path_before_prompting() {
        let params = ethvault_core::KdfParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
            key_length: 32,
        };
        let mut record = WalletRecord::create("abandon", "pw", &params, false).unwrap();
        record.derivation_path = "not/a/path".into();

        // Reaching the password prompt would fail differently without a tty.
        let Err(err) = unlock(&record, true) else {
            panic!("bad path accepted");
        };
        let err = err.downcast_ref::<ethvault_evm::Error>().unwrap();
        assert!(matches!(err, ethvault_evm::Error::InvalidPath(_)), "{err}");
    }

    #[test]
    fn test_remote_provider_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default_for(dir.path());
        config.storage_provider = "s3".into();
        let ctx = Context {
            app_dir: dir.path().to_path_buf(),
            config,
        };
        let err = ctx.storage().err().unwrap();
        assert_eq!(err.to_string(), "unsupported storage provider: s3");
    }
}
