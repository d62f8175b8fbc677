//! Blob storage for the file store.
//!
//! Every stored object is a pair of files named by its [`BlobId`]:
//!
//! ```text
//! {root}/{id}             raw payload bytes
//! {root}/{id}.info.json   StorageFileInfo sidecar
//! ```
//!
//! The store knows nothing about paths or the key index. It only writes,
//! reads and removes blob pairs.
//!
//! [`BlobId`]: fsapi_types::BlobId

pub mod error;
pub mod local;
pub mod memory;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{BlobEntry, BlobStore, RemovedFiles};
