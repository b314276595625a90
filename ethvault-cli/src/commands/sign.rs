//! `ethvault sign-message`, `verify-message` and `sign-tx`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use ethvault_evm::{
    message_bytes, recover_message_signer, sign_message, sign_transaction, SignedTransaction,
    TxType, UnsignedTransaction,
};

use super::{unlock, CmdResult, Context, WalletArgs};

/// Message given inline or in a file.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct MessageSource {
    /// Message to sign.
    #[arg(short, long)]
    data: Option<String>,

    /// File containing the message.
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl MessageSource {
    fn bytes(&self, is_hex: bool) -> CmdResult<Vec<u8>> {
        let input = match (&self.data, &self.data_file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) => read_input_file(path)?,
            (None, None) => return Err("specify --data or --data-file".into()),
        };
        let input = if is_hex { input.trim() } else { input.as_str() };
        Ok(message_bytes(input, is_hex)?)
    }
}

fn read_input_file(path: &Path) -> CmdResult<String> {
    fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()).into())
}

/// Sign a message with the EIP-191 personal message prefix.
#[derive(Args)]
pub struct SignMessageCommand {
    #[command(flatten)]
    wallet: WalletArgs,

    #[command(flatten)]
    message: MessageSource,

    /// Treat the message as `0x`-prefixed hex bytes.
    #[arg(short = 'x', long)]
    hex: bool,

    /// Use no BIP39 passphrase, without asking.
    #[arg(long)]
    no_passphrase: bool,
}

impl SignMessageCommand {
    /// Execute the sign-message command.
    #[rustfmt::skip]
    pub fn execute(self, ctx: &Context) -> CmdResult {
        let message = self.message.bytes(self.hex)?;
        let record = self.wallet.read(ctx)?;
        let unlocked = unlock(&record, self.no_passphrase)?;
        let signature = sign_message(&message, &unlocked.identity.private_key)?;

        println!();
        println!("      {}         {}", "Message".cyan().bold(), display_message(&message, self.hex));
        println!("      {}  {}", "Signer Address".cyan().bold(), unlocked.identity.address.green());
        println!("      {}       0x{}", "Signature".cyan().bold(), hex::encode(signature));
        println!();
        Ok(())
    }
}

/// Recover the signer of an EIP-191 message signature.
#[derive(Args)]
pub struct VerifyMessageCommand {
    #[command(flatten)]
    message: MessageSource,

    /// Treat the message as `0x`-prefixed hex bytes.
    #[arg(short = 'x', long)]
    hex: bool,

    /// 65-byte signature as hex.
    #[arg(short, long)]
    signature: String,

    /// Expected signer; the command fails if the signature is from another
    /// address.
    #[arg(short, long)]
    address: Option<String>,
}

impl VerifyMessageCommand {
    /// Execute the verify-message command.
    pub fn execute(self) -> CmdResult {
        let message = self.message.bytes(self.hex)?;
        let signature = parse_signature(&self.signature)?;
        let signer = recover_message_signer(&message, &signature)?;

        println!();
        println!("      {}  {}", "Signer Address".cyan().bold(), signer.green());
        println!();

        if let Some(expected) = self.address {
            if !signer.eq_ignore_ascii_case(expected.trim()) {
                return Err(format!("signature was made by {signer}, not {expected}").into());
            }
            println!("      {}", "Signature is valid.".green());
            println!();
        }
        Ok(())
    }
}

/// Sign an unsigned raw transaction (legacy EIP-155, EIP-2930 or EIP-1559).
#[derive(Args)]
pub struct SignTxCommand {
    #[command(flatten)]
    wallet: WalletArgs,

    /// Unsigned transaction as hex.
    #[arg(long, conflicts_with = "raw_tx_file", required_unless_present = "raw_tx_file")]
    raw_tx: Option<String>,

    /// File containing the unsigned transaction as hex.
    #[arg(long)]
    raw_tx_file: Option<PathBuf>,

    /// Use no BIP39 passphrase, without asking.
    #[arg(long)]
    no_passphrase: bool,
}

impl SignTxCommand {
    /// Execute the sign-tx command.
    #[rustfmt::skip]
    pub fn execute(self, ctx: &Context) -> CmdResult {
        let raw = match (&self.raw_tx, &self.raw_tx_file) {
            (Some(input), _) => decode_hex(input)?,
            (None, Some(path)) => decode_hex(&read_input_file(path)?)?,
            (None, None) => return Err("specify --raw-tx or --raw-tx-file".into()),
        };
        // Reject malformed input before asking for the password.
        let tx = UnsignedTransaction::decode(&raw)?;

        let record = self.wallet.read(ctx)?;
        let unlocked = unlock(&record, self.no_passphrase)?;
        let signed = sign_transaction(&raw, &unlocked.identity.private_key)?;

        let check = SignedTransaction::decode(&signed)?;
        if check.recover_sender()? != unlocked.identity.address {
            return Err("signed transaction does not recover to the wallet address".into());
        }

        println!();
        println!("      {}              {}", "Type".cyan().bold(), tx_type_name(tx.tx_type()));
        println!("      {}          {}", "Chain ID".cyan().bold(), tx.chain_id());
        println!("      {}              {}", "From".cyan().bold(), unlocked.identity.address.green());
        println!("      {}  0x{}", "Signed Transaction".cyan().bold(), hex::encode(&signed));
        println!("      {}  0x{}", "Transaction Hash".cyan().bold(), hex::encode(check.hash()));
        println!();
        Ok(())
    }
}

fn tx_type_name(tx_type: TxType) -> &'static str {
    match tx_type {
        TxType::Legacy => "legacy (EIP-155)",
        TxType::AccessList => "access list (EIP-2930)",
        TxType::DynamicFee => "dynamic fee (EIP-1559)",
    }
}

fn decode_hex(input: &str) -> CmdResult<Vec<u8>> {
    let input = input.trim();
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.is_empty() {
        return Err("transaction hex is empty".into());
    }
    hex::decode(digits).map_err(|e| format!("invalid transaction hex: {e}").into())
}

fn parse_signature(input: &str) -> CmdResult<[u8; 65]> {
    let input = input.trim();
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(digits).map_err(|e| format!("invalid signature hex: {e}"))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("signature must be 65 bytes, got {}", b.len()).into())
}

fn display_message(message: &[u8], is_hex: bool) -> String {
    if is_hex {
        return format!("0x{}", hex::encode(message));
    }
    String::from_utf8_lossy(message).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex(" 0a0b\n").unwrap(), vec![10, 11]);
        assert!(decode_hex("0x").is_err());
        assert!(decode_hex("xyz").is_err());
    }

    #[test]
    fn test_parse_signature() {
        let sig = format!("0x{}", "11".repeat(65));
        assert_eq!(parse_signature(&sig).unwrap(), [0x11; 65]);
        assert!(parse_signature(&"11".repeat(64)).is_err());
        assert!(parse_signature("0xzz").is_err());
    }

    #[test]
    fn test_message_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msg.txt");
        fs::write(&path, "0x68656c6c6f\n").unwrap();

        let source = MessageSource {
            data: None,
            data_file: Some(path),
        };
        assert_eq!(source.bytes(true).unwrap(), b"hello");
        assert_eq!(source.bytes(false).unwrap(), b"0x68656c6c6f\n");
    }

    #[test]
    fn test_hex_message_needs_prefix() {
        let source = MessageSource {
            data: Some("68656c6c6f".into()),
            data_file: None,
        };
        assert!(source.bytes(true).is_err());
    }

    #[test]
    fn test_display_message() {
        assert_eq!(display_message(b"hi", false), "hi");
        assert_eq!(display_message(b"hi", true), "0x6869");
    }

    #[test]
    fn test_verify_against_known_signature() {
        let cmd = VerifyMessageCommand {
            message: MessageSource {
                data: Some("Some data".into()),
                data_file: None,
            },
            hex: false,
            signature: "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c".into(),
            address: Some("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23".into()),
        };
        cmd.execute().unwrap();
    }

    #[test]
    fn test_verify_wrong_signer_fails() {
        let cmd = VerifyMessageCommand {
            message: MessageSource {
                data: Some("Other data".into()),
                data_file: None,
            },
            hex: false,
            signature: "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c".into(),
            address: Some("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23".into()),
        };
        assert!(cmd.execute().is_err());
    }
}
