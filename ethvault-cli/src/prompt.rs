//! Terminal prompts for passwords, passphrases and confirmations.

use std::io::{self, BufRead, Write};

use zeroize::Zeroizing;

/// Characters that count as special in a password.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()-_+={}[]|:;\"'<>,.?/\\`~";

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

type PromptResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Whether `password` is long enough and mixes upper case, lower case,
/// digits and special characters.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(char::is_uppercase)
        && password.chars().any(char::is_lowercase)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIAL_CHARS.contains(c))
}

/// Interpret a yes/no answer. Anything other than `y`/`yes` is no.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on stderr and read the answer from stdin.
///
/// # Errors
///
/// Fails if stdin cannot be read.
pub fn confirm(question: &str) -> PromptResult<bool> {
    eprint!("{question} (y/n): ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

/// Read a secret without echo.
///
/// # Errors
///
/// Fails if the terminal cannot be read.
pub fn secret(prompt: &str) -> PromptResult<Zeroizing<String>> {
    Ok(Zeroizing::new(rpassword::prompt_password(prompt)?))
}

/// Read the password that unlocks an existing wallet.
///
/// # Errors
///
/// Fails if the terminal cannot be read or the password is empty.
pub fn existing_password() -> PromptResult<Zeroizing<String>> {
    let password = secret("Enter password: ")?;
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    Ok(password)
}

/// Read a new password twice and check its strength.
///
/// # Errors
///
/// Fails if the entries differ or the password is weak.
pub fn new_password() -> PromptResult<Zeroizing<String>> {
    let password = secret("Enter new password: ")?;
    if !is_strong_password(&password) {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters and contain upper case, \
             lower case, digit and special characters"
        )
        .into());
    }
    let again = secret("Confirm password: ")?;
    if *password != *again {
        return Err("passwords do not match".into());
    }
    Ok(password)
}

/// When a passphrase is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseUse {
    /// Creating a wallet: a non-empty passphrase is entered twice.
    Create,
    /// Unlocking a wallet: a non-empty passphrase is entered once.
    Unlock,
}

/// Obtain the BIP39 passphrase.
///
/// With `skip` the empty passphrase is used without asking. Otherwise the
/// user is asked whether one applies; a "yes" must be followed by a
/// non-empty value.
///
/// # Errors
///
/// Fails on read errors, an empty passphrase after answering yes, or
/// mismatched entries when creating.
pub fn passphrase(usage: PassphraseUse, skip: bool) -> PromptResult<Zeroizing<String>> {
    if skip {
        return Ok(Zeroizing::new(String::new()));
    }

    let question = match usage {
        PassphraseUse::Create => "Protect the mnemonic with a BIP39 passphrase?",
        PassphraseUse::Unlock => "Did you use a BIP39 passphrase?",
    };
    if !confirm(question)? {
        return Ok(Zeroizing::new(String::new()));
    }

    let value = secret("Enter BIP39 passphrase: ")?;
    if value.is_empty() {
        return Err("passphrase must not be empty (use --no-passphrase for none)".into());
    }
    if usage == PassphraseUse::Create {
        let again = secret("Confirm BIP39 passphrase: ")?;
        if *value != *again {
            return Err("passphrases do not match".into());
        }
    }
    Ok(value)
}
