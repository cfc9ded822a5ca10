//! File store collaborator.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StoreError};

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry returned by [`FileStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Narrow file access interface consumed by the instruction core.
///
/// `read` distinguishes "file absent" (`Ok(None)`) from a read failure;
/// callers that require the file to exist turn `None` into
/// [`StoreError::FileNotFound`].
pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>>;
}

/// Real filesystem implementation.
///
/// Writes go through a temp file plus rename so a crash mid-write never
/// leaves a truncated snapshot behind.
#[derive(Debug, Default)]
pub struct DiskFileStore;

impl FileStore for DiskFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::io("read", path, error)),
        }
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
        }

        let temp_path = temp_sibling(path);
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| StoreError::io("create", temp_path.clone(), e))?;
        file.write_all(bytes)
            .map_err(|e| StoreError::io("write", temp_path.clone(), e))?;
        file.sync_all()
            .map_err(|e| StoreError::io("sync", temp_path.clone(), e))?;
        fs::rename(&temp_path, path).map_err(|e| StoreError::io("rename", path, e))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let read_dir = fs::read_dir(dir).map_err(|e| StoreError::io("list", dir, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::io("list", dir, e))?;
            let path = entry.path();
            let kind = if path.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// In-memory file store for tests.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<std::collections::BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, std::collections::BTreeMap<PathBuf, Vec<u8>>>> {
        self.files
            .lock()
            .map_err(|_| StoreError::io("lock", PathBuf::new(), io::Error::other("store lock poisoned")))
    }
}

impl FileStore for MemoryFileStore {
    fn exists(&self, path: &Path) -> bool {
        self.lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(path).cloned())
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.lock()?.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let files = self.lock()?;
        let mut entries = Vec::new();
        for path in files.keys() {
            if path.parent() == Some(dir) {
                entries.push(DirEntry {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: path.clone(),
                    kind: EntryKind::File,
                });
            }
        }
        Ok(entries)
    }
}
