//! Error types for key index operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// No connection string was configured for the index.
    #[error("key index connection string is not set")]
    MissingConnectionString,

    /// The remote store rejected a command or the connection failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// An in-process lock was poisoned by a panicking writer.
    #[error("index lock poisoned: {0}")]
    Poisoned(String),
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;
