use std::sync::Arc;

use bytes::Bytes;
use fsapi_blobs::{BlobError, BlobStore};
use fsapi_index::KeyIndex;
use fsapi_types::{BlobId, StorageFileInfo};
use tracing::{debug, error, info, warn};

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::report::{DeleteFailure, DeleteReport};

/// Name of the setting that configures the blob store root.
pub const STORAGE_LOCATION: &str = "STORAGE_LOCATION";

/// Coordinates the key index and the blob store for path-addressed objects.
///
/// Both handles are fixed at construction and shared read-only, so a single
/// coordinator can serve any number of concurrent requests. The blob store is
/// optional: when it is absent every operation that touches blobs fails with
/// [`CoordinatorError::ConfigurationMissing`] before doing any I/O.
#[derive(Clone)]
pub struct StorageCoordinator {
    pub(crate) index: Arc<dyn KeyIndex>,
    pub(crate) blobs: Option<Arc<dyn BlobStore>>,
}

impl std::fmt::Debug for StorageCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCoordinator")
            .field("blobs_configured", &self.blobs.is_some())
            .finish()
    }
}

impl StorageCoordinator {
    pub fn new(index: Arc<dyn KeyIndex>, blobs: Option<Arc<dyn BlobStore>>) -> Self {
        Self { index, blobs }
    }

    pub fn index(&self) -> &Arc<dyn KeyIndex> {
        &self.index
    }

    pub fn has_blob_store(&self) -> bool {
        self.blobs.is_some()
    }

    pub(crate) fn blobs(&self) -> CoordinatorResult<&dyn BlobStore> {
        self.blobs.as_deref().ok_or_else(|| {
            error!("{STORAGE_LOCATION} is not set");
            CoordinatorError::ConfigurationMissing(STORAGE_LOCATION)
        })
    }

    /// Resolve the blob id an index entry points at.
    ///
    /// Absent, empty and malformed values all resolve to `None`.
    pub(crate) async fn resolve(&self, key: &str) -> CoordinatorResult<Option<BlobId>> {
        let Some(value) = self.index.get(key).await? else {
            return Ok(None);
        };
        if value.is_empty() {
            warn!(path = %key, "key contains empty value");
            return Ok(None);
        }
        match BlobId::parse(&value) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(path = %key, error = %e, "key does not hold a blob id");
                Ok(None)
            }
        }
    }

    /// Store `content` at `path`, returning the id of the new blob.
    ///
    /// Payload and sidecar are written before the index entry. A failure at
    /// any step before the index write leaves an unreferenced blob and the
    /// previous value of `path` intact. Any blob `path` pointed at before is
    /// orphaned, not deleted.
    pub async fn put(&self, path: &str, content: Bytes) -> CoordinatorResult<BlobId> {
        let blobs = self.blobs()?;
        if content.is_empty() {
            error!(path = %path, "empty file content is invalid");
            return Err(CoordinatorError::InvalidInput(
                "empty file content is invalid".into(),
            ));
        }

        let id = BlobId::generate();
        let size = content.len() as u64;
        blobs.write(&id, content).await?;
        blobs
            .write_metadata(&id, &StorageFileInfo::new(path, size))
            .await?;
        self.index.set(path, id.as_str()).await?;

        info!(path = %path, blob_id = %id, size, "stored object");
        Ok(id)
    }

    /// Fetch the payload stored at `path`.
    ///
    /// An index entry whose blob is gone is reported as `NotFound` and left
    /// in place.
    pub async fn get(&self, path: &str) -> CoordinatorResult<Bytes> {
        let blobs = self.blobs()?;
        let Some(id) = self.resolve(path).await? else {
            return Err(CoordinatorError::NotFound(path.to_string()));
        };
        match blobs.read(&id).await {
            Ok(data) => Ok(data),
            Err(BlobError::NotFound(_)) => {
                warn!(path = %path, blob_id = %id, "missing file");
                Err(CoordinatorError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read the metadata sidecar of the object at `path`.
    pub async fn info(&self, path: &str) -> CoordinatorResult<StorageFileInfo> {
        let blobs = self.blobs()?;
        let Some(id) = self.resolve(path).await? else {
            return Err(CoordinatorError::NotFound(path.to_string()));
        };
        match blobs.read_metadata(&id).await {
            Ok(info) => Ok(info),
            Err(BlobError::MetadataNotFound(_)) => {
                warn!(path = %path, blob_id = %id, "missing file info");
                Err(CoordinatorError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every index key starting with `prefix`, in no particular order.
    ///
    /// Only the index is consulted; listed keys may point at missing blobs.
    pub async fn list(&self, prefix: &str) -> CoordinatorResult<Vec<String>> {
        let keys = self.index.list_by_prefix(prefix).await?;
        info!(keys = keys.len(), path = %prefix, "found keys for path");
        Ok(keys)
    }

    /// Delete every object whose path starts with `prefix`.
    ///
    /// Matching keys are collected first, then each is cleaned up on its
    /// own: blob files are removed when the key points at a blob, and the
    /// index entry is removed regardless. A failure on one key is recorded
    /// in the report and does not stop the others. Nothing is rolled back.
    pub async fn delete_by_prefix(&self, prefix: &str) -> CoordinatorResult<DeleteReport> {
        let blobs = self.blobs()?;
        let keys = self.index.list_by_prefix(prefix).await?;
        info!(keys = keys.len(), path = %prefix, "found keys for path to delete");

        let mut report = DeleteReport::default();
        for key in keys {
            match self.delete_entry(blobs, &key).await {
                Ok(()) => report.removed.push(key),
                Err(e) => {
                    warn!(path = %key, error = %e, "failed to delete key");
                    report.failures.push(DeleteFailure {
                        key,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    async fn delete_entry(&self, blobs: &dyn BlobStore, key: &str) -> CoordinatorResult<()> {
        // A blob that cannot be removed, or a pointer that cannot be read,
        // leaves an orphan; the index entry still goes so the path stops
        // resolving.
        let blob_result = match self.resolve(key).await {
            Ok(Some(id)) => match blobs.delete(&id).await {
                Ok(removed) => {
                    if removed.payload {
                        info!(blob_id = %id, "deleting file");
                    }
                    if removed.metadata {
                        info!(blob_id = %id, "deleting file info");
                    }
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        let existed = self.index.delete(key).await?;
        debug!(path = %key, existed, "deleting key");
        blob_result
    }
}
