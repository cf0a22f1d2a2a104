#![deny(missing_docs)]

//! Persistent byte store for bases, operator matrices and ranks.
//!
//! Keys are relative slash-separated paths derived deterministically from the
//! family tag and the space/operator parameters. The contract consumers rely
//! on: `put` is atomic (temp sibling + rename), `get` distinguishes a missing
//! key from an empty value, and at most one writer touches a key at a time
//! (enforced by the scheduler, never by in-process locks).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use gch_core::{ErrorInfo, GchError};
use walkdir::WalkDir;

/// Key/value byte store contract used by every build step.
pub trait Store: Send + Sync {
    /// Returns true when the key holds a value.
    fn exists(&self, key: &str) -> bool;

    /// Writes a value atomically.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), GchError>;

    /// Reads a value; a missing key is a `NotBuilt` error, never an empty
    /// value.
    fn get(&self, key: &str) -> Result<Vec<u8>, GchError>;

    /// Removes a value. Removing a missing key is a no-op.
    fn delete(&self, key: &str) -> Result<(), GchError>;

    /// Lists all keys currently held, in sorted order.
    fn keys(&self) -> Result<Vec<String>, GchError>;
}

/// Filesystem-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn io_error(code: &str, path: &Path, err: impl ToString) -> GchError {
        GchError::Store(
            ErrorInfo::new(code, err.to_string())
                .with_context("path", path.display().to_string()),
        )
    }
}

impl Store for FsStore {
    fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), GchError> {
        let path = self.path_for(key);
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(|err| Self::io_error("store-mkdir", parent, err))?;
        // Write to a temporary sibling and rename so readers never observe a
        // partial value, including across a cancelled build.
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = path.with_file_name(format!("{file_name}.tmp.{}", std::process::id()));
        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            Ok(())
        })();
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp);
            return Err(Self::io_error("store-write", &path, err));
        }
        fs::rename(&tmp, &path).map_err(|err| {
            let _ = fs::remove_file(&tmp);
            Self::io_error("store-rename", &path, err)
        })
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, GchError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(GchError::NotBuilt(
                ErrorInfo::new("store-missing", "key not found in store")
                    .with_context("key", key)
                    .with_hint("build the corresponding artefact first"),
            ));
        }
        fs::read(&path).map_err(|err| Self::io_error("store-read", &path, err))
    }

    fn delete(&self, key: &str) -> Result<(), GchError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error("store-delete", &path, err)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, GchError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry =
                entry.map_err(|err| Self::io_error("store-walk", &self.root, err))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|err| Self::io_error("store-walk", entry.path(), err))?;
            keys.push(rel.to_string_lossy().replace('\\', "/"));
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put("ordinary/evenedge/gra4_3.g6", b"1\nCx\n").unwrap();
        assert!(store.exists("ordinary/evenedge/gra4_3.g6"));
        let bytes = store.get("ordinary/evenedge/gra4_3.g6").unwrap();
        assert_eq!(bytes, b"1\nCx\n");
    }

    #[test]
    fn missing_key_is_not_built() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let err = store.get("nothing/here.txt").unwrap_err();
        assert!(err.is_not_built());
    }

    #[test]
    fn empty_value_differs_from_missing() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put("empty.txt", b"").unwrap();
        assert_eq!(store.get("empty.txt").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put("a/b.txt", b"x").unwrap();
        store.delete("a/b.txt").unwrap();
        store.delete("a/b.txt").unwrap();
        assert!(!store.exists("a/b.txt"));
    }

    #[test]
    fn keys_are_sorted_relative_paths() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put("b/two.txt", b"2").unwrap();
        store.put("a/one.txt", b"1").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a/one.txt", "b/two.txt"]);
    }

    #[test]
    fn overwrite_replaces_whole_value() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        store.put("k.txt", b"a long first value").unwrap();
        store.put("k.txt", b"short").unwrap();
        assert_eq!(store.get("k.txt").unwrap(), b"short");
    }
}
