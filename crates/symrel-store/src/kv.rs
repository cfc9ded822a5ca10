//! Key-value store collaborator.
//!
//! Plays the role a browser's local store played for the original
//! workbench: opaque bytes under a fixed key, surviving between runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StoreError};

/// Narrow key-value interface consumed by the instruction core.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Disk-backed store: one file per key under a root directory.
///
/// Keys are sanitized into file names (path separators and dots become
/// underscores) so a key can never escape the root.
#[derive(Debug)]
pub struct DirKvStore {
    root: PathBuf,
}

impl DirKvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(file_name)
    }
}

impl KeyValueStore for DirKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::io("read", path, error)),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| StoreError::io("create directory", &self.root, e))?;
        let path = self.key_path(key);
        fs::write(&path, bytes).map_err(|e| StoreError::io("write", path.clone(), e))?;
        tracing::debug!(key, path = %path.display(), "persisted key");
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<std::collections::BTreeMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, std::collections::BTreeMap<String, Vec<u8>>>> {
        self.entries.lock().map_err(|_| {
            StoreError::io("lock", Path::new(""), io::Error::other("store lock poisoned"))
        })
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
