//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failure against a storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} {dest}: {source}", dest = .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File absent where one was required.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Persisted bytes do not parse as a snapshot.
    #[error("invalid snapshot format: {reason}")]
    InvalidFormat { reason: String },

    /// Snapshot serialization failure.
    #[error("failed to serialize state: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
