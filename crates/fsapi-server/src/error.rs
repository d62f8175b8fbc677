use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fsapi_core::CoordinatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Storage(#[from] CoordinatorError),

    #[error("key index error: {0}")]
    Index(#[from] fsapi_index::IndexError),

    #[error("blob store error: {0}")]
    Blob(#[from] fsapi_blobs::BlobError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Storage(CoordinatorError::ConfigurationMissing(_))
            | Self::Storage(CoordinatorError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(CoordinatorError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (CoordinatorError::ConfigurationMissing("X"), StatusCode::BAD_REQUEST),
            (CoordinatorError::InvalidInput("empty".into()), StatusCode::BAD_REQUEST),
            (CoordinatorError::NotFound("p".into()), StatusCode::NOT_FOUND),
            (
                CoordinatorError::Index(fsapi_index::IndexError::MissingConnectionString),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ServerError::from(err).status(), expected);
        }
        assert_eq!(
            ServerError::Config("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
