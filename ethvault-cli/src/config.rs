//! Persistent CLI settings.

use core::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ethvault_core::KdfParams;
use serde::{Deserialize, Serialize};

/// Directory under the home directory that holds config and wallets.
pub const APP_DIR: &str = ".ethvault";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Default wallet directory inside [`APP_DIR`].
pub const WALLETS_DIR: &str = "wallets";

/// Config errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// No home directory could be determined.
    NoHome,
    /// Reading or writing the config file failed.
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Config file is not valid JSON for [`Config`].
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// Unknown key or bad value given to `config set`.
    InvalidSetting(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHome => write!(f, "could not determine home directory, use --home"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid config file {}: {source}", path.display())
            }
            Self::InvalidSetting(msg) => write!(f, "invalid setting: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Config result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Settings stored in `<home>/.ethvault/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage backend tag.
    pub storage_provider: String,
    /// Directory (or provider-specific location) wallets are kept in.
    pub storage_path: String,
    /// Argon2id cost override for newly encrypted wallets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

impl Config {
    /// Defaults for an application directory.
    pub fn default_for(app_dir: &Path) -> Self {
        Self {
            storage_provider: "local".to_string(),
            storage_path: app_dir.join(WALLETS_DIR).to_string_lossy().into_owned(),
            kdf: None,
        }
    }

    /// Load the config from `app_dir`, falling back to defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Parse`] if an existing file cannot
    /// be read.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(CONFIG_FILE);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default_for(app_dir));
            }
            Err(source) => return Err(Error::Io { path, source }),
        };
        serde_json::from_str(&data).map_err(|source| Error::Parse { path, source })
    }

    /// Write the config to `app_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on filesystem failure.
    pub fn save(&self, app_dir: &Path) -> Result<PathBuf> {
        let path = app_dir.join(CONFIG_FILE);
        let io_err = |source| Error::Io {
            path: path.clone(),
            source,
        };

        create_private_dir(app_dir).map_err(io_err)?;
        let mut json = serde_json::to_string_pretty(self).map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })?;
        json.push('\n');
        write_private(&path, json.as_bytes()).map_err(io_err)?;
        Ok(path)
    }

    /// Effective KDF parameters for new wallets.
    pub fn kdf_params(&self) -> KdfParams {
        self.kdf.unwrap_or_default()
    }

    /// Update one setting by name.
    ///
    /// Keys are `storage_provider`, `storage_path`, `kdf.memory_kib`,
    /// `kdf.iterations` and `kdf.parallelism`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] for an unknown key, an unparsable
    /// number or KDF values that fail validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage_provider" => self.storage_provider = value.trim().to_ascii_lowercase(),
            "storage_path" => self.storage_path = value.to_string(),
            "kdf.memory_kib" | "kdf.iterations" | "kdf.parallelism" => {
                let n: u32 = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::InvalidSetting(format!("{key} must be a number")))?;
                let mut kdf = self.kdf_params();
                match key {
                    "kdf.memory_kib" => kdf.memory_kib = n,
                    "kdf.iterations" => kdf.iterations = n,
                    _ => kdf.parallelism = n,
                }
                kdf.validate()
                    .map_err(|e| Error::InvalidSetting(e.to_string()))?;
                self.kdf = Some(kdf);
            }
            _ => return Err(Error::InvalidSetting(format!("unknown key {key}"))),
        }
        Ok(())
    }
}

/// Resolve the application directory from an explicit home or the user's
/// home directory.
///
/// # Errors
///
/// Returns [`Error::NoHome`] if neither is available.
pub fn app_dir(home: Option<&Path>) -> Result<PathBuf> {
    let home = match home {
        Some(home) => home.to_path_buf(),
        None => dirs::home_dir().ok_or(Error::NoHome)?,
    };
    Ok(home.join(APP_DIR))
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    fs::write(path, data)
}
