//! Local filesystem backend.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{Error, Result, Storage};

/// Wallet files on the local filesystem.
///
/// Relative identifiers resolve against the root directory; absolute ones
/// are used as given.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a backend rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn make_private(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn make_private(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

impl Storage for LocalStorage {
    /// Data lands in a private temp file next to the target and is renamed
    /// into place. The target is never truncated.
    fn put(&self, data: &[u8], id: &str, overwrite: bool) -> Result<String> {
        let path = self.resolve(id);
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(io_err(parent))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".ethvault-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(io_err(parent))?;
        make_private(tmp.as_file()).map_err(io_err(tmp.path()))?;
        tmp.write_all(data).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;

        let persisted = if overwrite {
            tmp.persist(&path)
        } else {
            tmp.persist_noclobber(&path)
        };
        if let Err(e) = persisted {
            if !overwrite && e.error.kind() == io::ErrorKind::AlreadyExists {
                return Err(Error::AlreadyExists(path));
            }
            return Err(Error::Io {
                path,
                source: e.error,
            });
        }
        sync_dir(parent).map_err(io_err(parent))?;

        tracing::debug!(
            path = %path.display(),
            bytes = data.len(),
            overwrite,
            "wallet file written"
        );
        Ok(format!("File saved to local file system: {}", path.display()))
    }

    fn get(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.resolve(id);
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(path)),
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    fn list(&self, dir: &str) -> Result<Vec<String>> {
        let dir = self.resolve(dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(Error::Io { path: dir, source }),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_err(&dir))?.path();
            if path.is_dir() {
                continue;
            }
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json {
                ids.push(path.to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let msg = storage.put(b"payload", "w.json", false).unwrap();
        assert!(msg.starts_with("File saved to local file system: "));
        assert!(msg.ends_with("w.json"));
        assert_eq!(storage.get("w.json").unwrap(), b"payload");
    }

    #[test]
    fn test_put_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("a"));
        storage.put(b"x", "b/c/w.json", false).unwrap();
        assert!(dir.path().join("a/b/c/w.json").is_file());
    }

    #[test]
    fn test_put_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.put(b"first", "w.json", false).unwrap();

        let err = storage.put(b"second", "w.json", false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert_eq!(storage.get("w.json").unwrap(), b"first");

        storage.put(b"second", "w.json", true).unwrap();
        assert_eq!(storage.get("w.json").unwrap(), b"second");
    }

    #[test]
    fn test_absolute_id_ignores_root() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(root.path());
        let target = other.path().join("abs.json");

        storage.put(b"x", &target.to_string_lossy(), false).unwrap();
        assert!(target.is_file());
        assert!(!root.path().join("abs.json").exists());
    }

    #[test]
    fn test_get_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(matches!(storage.get("nope.json"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("missing"));
        assert!(storage.list("").unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_dirs_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.put(b"{}", "a.json", false).unwrap();
        storage.put(b"{}", "b.Json", false).unwrap();
        storage.put(b"{}", "c.txt", false).unwrap();
        fs::create_dir(dir.path().join("d.json")).unwrap();

        let ids = storage.list("").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids[0].ends_with("a.json"));
        assert!(ids[1].ends_with("b.Json"));
    }

    #[cfg(unix)]
    #[test]
    fn test_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let mode = || {
            fs::metadata(dir.path().join("w.json"))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };

        storage.put(b"x", "w.json", false).unwrap();
        assert_eq!(mode(), 0o600);
        storage.put(b"y", "w.json", true).unwrap();
        assert_eq!(mode(), 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_replaces_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.put(b"old wallet", "w.json", false).unwrap();

        // A second name for the old inode sees any in-place write.
        let link = dir.path().join("old.link");
        fs::hard_link(dir.path().join("w.json"), &link).unwrap();

        storage.put(b"new wallet", "w.json", true).unwrap();
        assert_eq!(storage.get("w.json").unwrap(), b"new wallet");
        assert_eq!(fs::read(&link).unwrap(), b"old wallet");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.put(b"first", "w.json", false).unwrap();
        assert!(storage.put(b"second", "w.json", false).is_err());
        storage.put(b"third", "w.json", true).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["w.json"]);
        assert_eq!(storage.get("w.json").unwrap(), b"third");
    }
}
