//! Import/export errors
//!
//! Icon decoding problems never show up here: the codec reports them as
//! a missing icon instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Errors that abort an export or import
#[derive(Error, Debug)]
pub enum TransferError {
    /// Snapshot text is not valid JSON or does not have the snapshot shape
    #[error("Invalid snapshot document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Snapshot was written by an incompatible version
    #[error("Unsupported snapshot version {found} (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The store rejected a read or write
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or writing the snapshot file failed
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TransferError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for import/export operations
pub type TransferResult<T> = Result<T, TransferError>;
