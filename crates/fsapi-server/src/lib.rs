//! HTTP server for the file store.
//!
//! Exposes the storage coordinator under `/storage/files` and the inline
//! file service under `/files`, both addressed by a `path` query parameter.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::FsapiServer;
pub use state::AppState;
