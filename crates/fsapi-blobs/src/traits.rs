use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use fsapi_types::{BlobId, StorageFileInfo};

use crate::error::BlobResult;

/// A blob found by [`BlobStore::list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobEntry {
    pub id: BlobId,
    /// Last modification time of the payload.
    pub modified: SystemTime,
}

/// Which files [`BlobStore::delete`] actually removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemovedFiles {
    pub payload: bool,
    pub metadata: bool,
}

impl RemovedFiles {
    pub fn any(&self) -> bool {
        self.payload || self.metadata
    }
}

/// Storage for blob payloads and their metadata sidecars.
///
/// Writes overwrite. Deletes are idempotent: a missing payload or sidecar
/// is not an error. Only [`read`](Self::read) and
/// [`read_metadata`](Self::read_metadata) report absence as an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create or overwrite the payload of `id`.
    async fn write(&self, id: &BlobId, data: Bytes) -> BlobResult<()>;

    /// Read the payload of `id`, failing with `NotFound` if absent.
    async fn read(&self, id: &BlobId) -> BlobResult<Bytes>;

    /// Whether the payload of `id` exists.
    async fn exists(&self, id: &BlobId) -> BlobResult<bool>;

    /// Create or overwrite the metadata sidecar of `id`.
    async fn write_metadata(&self, id: &BlobId, info: &StorageFileInfo) -> BlobResult<()>;

    /// Read the metadata sidecar of `id`, failing with `MetadataNotFound` if absent.
    async fn read_metadata(&self, id: &BlobId) -> BlobResult<StorageFileInfo>;

    /// Remove both files of `id`.
    async fn delete(&self, id: &BlobId) -> BlobResult<RemovedFiles>;

    /// Every blob whose payload is present, in no particular order.
    async fn list(&self) -> BlobResult<Vec<BlobEntry>>;

    /// Remove leftovers of interrupted writes that are at least `min_age`
    /// old. Returns how many were removed.
    async fn remove_stale_partials(&self, _min_age: Duration) -> BlobResult<usize> {
        Ok(0)
    }
}
