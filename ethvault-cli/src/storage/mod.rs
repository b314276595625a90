//! Wallet file storage backends.
//!
//! Only the local filesystem is implemented. Remote providers are recognised
//! by name so that a config pointing at one fails with a clear message
//! instead of silently writing somewhere else.

mod local;

use core::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub use local::LocalStorage;

/// Provider tags that name a remote backend this build cannot talk to.
pub const REMOTE_PROVIDERS: &[&str] = &["google", "dropbox", "s3", "box", "keychain"];

/// Storage errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Filesystem failure on `path`.
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Target exists and overwriting was not requested.
    AlreadyExists(PathBuf),
    /// No wallet at the given location.
    NotFound(PathBuf),
    /// Recognised provider without a backend in this build.
    UnsupportedProvider(String),
    /// Tag is neither `local` nor a known provider.
    UnknownProvider(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::AlreadyExists(path) => write!(
                f,
                "{} already exists (use --force to overwrite)",
                path.display()
            ),
            Self::NotFound(path) => write!(f, "no wallet found at {}", path.display()),
            Self::UnsupportedProvider(tag) => {
                write!(f, "unsupported storage provider: {tag}")
            }
            Self::UnknownProvider(tag) => write!(f, "unknown storage provider: {tag}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Storage result type.
pub type Result<T> = core::result::Result<T, Error>;

/// A place wallet files can be written to and read from.
pub trait Storage {
    /// Store `data` under `id` and describe where it went.
    ///
    /// Fails with [`Error::AlreadyExists`] if `id` is taken and `overwrite`
    /// is false.
    fn put(&self, data: &[u8], id: &str, overwrite: bool) -> Result<String>;

    /// Fetch the bytes stored under `id`.
    fn get(&self, id: &str) -> Result<Vec<u8>>;

    /// Identifiers of wallet files under `dir`.
    fn list(&self, dir: &str) -> Result<Vec<String>>;
}

/// Storage backend selected by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Local filesystem.
    Local,
}

impl Provider {
    /// Resolve a provider tag.
    ///
    /// # Errors
    ///
    /// Remote provider tags give [`Error::UnsupportedProvider`], anything
    /// else unrecognised gives [`Error::UnknownProvider`].
    pub fn from_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        if tag == "local" {
            return Ok(Self::Local);
        }
        if REMOTE_PROVIDERS.contains(&tag.as_str()) {
            return Err(Error::UnsupportedProvider(tag));
        }
        Err(Error::UnknownProvider(tag))
    }

    /// Open this backend rooted at `root`.
    pub fn open(self, root: &Path) -> Box<dyn Storage> {
        match self {
            Self::Local => Box::new(LocalStorage::new(root)),
        }
    }
}

/// List wallet names, without directories or extensions, in `dir`.
///
/// # Errors
///
/// Propagates listing failures from the backend.
pub fn list_wallet_names(storage: &dyn Storage, dir: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = storage
        .list(dir)?
        .iter()
        .filter_map(|id| Path::new(id).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_tag() {
        assert_eq!(Provider::from_tag("local").unwrap(), Provider::Local);
        assert_eq!(Provider::from_tag(" Local ").unwrap(), Provider::Local);
    }

    #[test]
    fn test_remote_tags_unsupported() {
        for tag in REMOTE_PROVIDERS {
            assert!(matches!(
                Provider::from_tag(tag),
                Err(Error::UnsupportedProvider(_))
            ));
        }
    }

    #[test]
    fn test_unknown_tag() {
        let err = Provider::from_tag("ftp").unwrap_err();
        assert_eq!(err.to_string(), "unknown storage provider: ftp");
    }

    #[test]
    fn test_list_wallet_names_strips_dirs_and_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Provider::Local.open(dir.path());
        storage.put(b"{}", "beta.json", false).unwrap();
        storage.put(b"{}", "alpha.JSON", false).unwrap();
        storage.put(b"{}", "notes.txt", false).unwrap();

        let names = list_wallet_names(storage.as_ref(), "").unwrap();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
