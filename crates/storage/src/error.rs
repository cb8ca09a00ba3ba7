use std::io;

use thiserror::Error;

/// Errors raised while writing or reading stored artifacts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The client-supplied name is unusable as a file name.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
}

impl StorageError {
    /// True when the caller supplied bad input, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StorageError::InvalidName(_))
    }
}
