//! Storage collaborators for the Symbol Relation Workbench.
//!
//! The instruction core never touches the filesystem directly; it talks
//! to two narrow trait interfaces:
//!
//! - [`KeyValueStore`] — session persistence under a fixed key
//! - [`FileStore`] — explicit save/import/export paths
//!
//! Disk-backed implementations live here alongside in-memory variants
//! used by tests. [`snapshot`] handles (de)serialization of the persisted
//! JSON snapshot format.

pub mod error;
pub mod file;
pub mod kv;
pub mod snapshot;

pub use error::{Result, StoreError};
pub use file::{DirEntry, DiskFileStore, EntryKind, FileStore, MemoryFileStore};
pub use kv::{DirKvStore, KeyValueStore, MemoryKvStore};
pub use snapshot::{parse_state, serialize_state};
