//! Error types for the roster core

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations
pub type RosterResult<T> = Result<T, RosterError>;

/// Errors that can occur while storing, loading or correlating snapshots
#[derive(Error, Debug)]
pub enum RosterError {
    /// Directory or file access failed
    #[error("File system error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot the caller depends on has not been fetched yet
    #[error("Snapshot not found: {0} (run a fetch first)")]
    SnapshotMissing(PathBuf),

    /// Snapshot content could not be (de)serialized
    #[error("Failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RosterError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
