//! In-memory blob store for tests and embedding.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use fsapi_types::{BlobId, StorageFileInfo};

use crate::error::{BlobError, BlobResult};
use crate::traits::{BlobEntry, BlobStore, RemovedFiles};

#[derive(Debug, Default)]
struct Inner {
    payloads: HashMap<BlobId, (Bytes, SystemTime)>,
    metadata: HashMap<BlobId, StorageFileInfo>,
}

/// `HashMap`-based [`BlobStore`]. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    inner: RwLock<Inner>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads currently stored.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .payloads
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a payload with an explicit modification time.
    pub fn insert_with_mtime(&self, id: &BlobId, data: Bytes, modified: SystemTime) -> BlobResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.payloads.insert(id.clone(), (data, modified));
        Ok(())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> BlobError {
    BlobError::Poisoned(e.to_string())
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn write(&self, id: &BlobId, data: Bytes) -> BlobResult<()> {
        self.insert_with_mtime(id, data, SystemTime::now())
    }

    async fn read(&self, id: &BlobId) -> BlobResult<Bytes> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .payloads
            .get(id)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| BlobError::NotFound(id.clone()))
    }

    async fn exists(&self, id: &BlobId) -> BlobResult<bool> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.payloads.contains_key(id))
    }

    async fn write_metadata(&self, id: &BlobId, info: &StorageFileInfo) -> BlobResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.metadata.insert(id.clone(), info.clone());
        Ok(())
    }

    async fn read_metadata(&self, id: &BlobId) -> BlobResult<StorageFileInfo> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .metadata
            .get(id)
            .cloned()
            .ok_or_else(|| BlobError::MetadataNotFound(id.clone()))
    }

    async fn delete(&self, id: &BlobId) -> BlobResult<RemovedFiles> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(RemovedFiles {
            payload: inner.payloads.remove(id).is_some(),
            metadata: inner.metadata.remove(id).is_some(),
        })
    }

    async fn list(&self) -> BlobResult<Vec<BlobEntry>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .payloads
            .iter()
            .map(|(id, (_, modified))| BlobEntry {
                id: id.clone(),
                modified: *modified,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn payload_and_metadata_lifecycle() {
        let store = InMemoryBlobStore::new();
        let id = BlobId::generate();

        store.write(&id, Bytes::from_static(b"abc")).await.unwrap();
        store
            .write_metadata(&id, &StorageFileInfo::new("x", 3))
            .await
            .unwrap();
        assert_eq!(store.read(&id).await.unwrap(), Bytes::from_static(b"abc"));
        assert_eq!(store.read_metadata(&id).await.unwrap().path, "x");
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(store.delete(&id).await.unwrap().payload);
        assert!(store.is_empty());
        assert!(matches!(store.read(&id).await, Err(BlobError::NotFound(_))));
        assert!(!store.delete(&id).await.unwrap().any());
    }

    #[tokio::test]
    async fn len_survives_poisoned_lock() {
        let store = InMemoryBlobStore::new();
        store.write(&BlobId::generate(), Bytes::from_static(b"x")).await.unwrap();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.inner.write().unwrap();
            panic!("writer panicked");
        }));
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        assert!(matches!(store.list().await, Err(BlobError::Poisoned(_))));
    }
}
