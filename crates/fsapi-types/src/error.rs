/// Errors from parsing or decoding foundation types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("invalid blob id {value:?}: {reason}")]
    InvalidBlobId { value: String, reason: String },

    #[error("invalid metadata document: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
}
