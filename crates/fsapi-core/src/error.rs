use fsapi_blobs::BlobError;
use fsapi_index::IndexError;
use thiserror::Error;

/// Errors surfaced by coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A required setting is absent. Operator-fixable.
    #[error("{0} is not set")]
    ConfigurationMissing(&'static str),

    /// The request itself is unacceptable, e.g. an empty payload.
    #[error("{0}")]
    InvalidInput(String),

    /// No live object at this path.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("key index failure: {0}")]
    Index(#[from] IndexError),

    #[error("blob store failure: {0}")]
    Blob(#[from] BlobError),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
