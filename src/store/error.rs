//! Storage error types.
//!
//! Every engine operation absorbs these errors and keeps working on its
//! in-memory state; only explicit saves hand them back to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the persisted record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state file could not be read.
    #[error("No se pudo leer el estado en {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The state file could not be written.
    #[error("No se pudo guardar el estado en {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record could not be serialized.
    #[error("No se pudo serializar el estado: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error came from the filesystem.
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
