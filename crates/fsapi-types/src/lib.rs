//! Foundation types shared by every layer of the file store.
//!
//! - [`BlobId`] -- opaque, randomly generated token naming a payload and its
//!   metadata sidecar on the blob store.
//! - [`StorageFileInfo`] -- the JSON document written next to every payload.

pub mod blob_id;
pub mod error;
pub mod info;

pub use blob_id::BlobId;
pub use error::TypeError;
pub use info::StorageFileInfo;
