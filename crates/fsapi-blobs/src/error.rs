use std::path::PathBuf;

use fsapi_types::{BlobId, TypeError};

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The payload file for this blob does not exist.
    #[error("blob not found: {0}")]
    NotFound(BlobId),

    /// The metadata sidecar for this blob does not exist.
    #[error("metadata not found for blob {0}")]
    MetadataNotFound(BlobId),

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sidecar could not be encoded or decoded.
    #[error("metadata error: {0}")]
    Metadata(#[from] TypeError),

    /// An in-process lock was poisoned by a panicking writer.
    #[error("blob store lock poisoned: {0}")]
    Poisoned(String),
}

impl BlobError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type BlobResult<T> = Result<T, BlobError>;
