//! Filesystem-backed blob store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use fsapi_types::{BlobId, StorageFileInfo};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{BlobError, BlobResult};
use crate::traits::{BlobEntry, BlobStore, RemovedFiles};

/// Suffix of in-progress writes. Such files are never listed or read.
const PARTIAL_SUFFIX: &str = ".partial";

/// Blob store rooted at a single local directory.
///
/// Payloads and sidecars are first written to a `.partial` file and renamed
/// into place, so a reader never observes a half-written file.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
}

fn partial_path(target: &Path) -> PathBuf {
    let mut partial = target.as_os_str().to_os_string();
    partial.push(PARTIAL_SUFFIX);
    PathBuf::from(partial)
}

impl LocalBlobStore {
    /// Open a store at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| BlobError::io(&root, e))?;
        info!(root = %root.display(), "opened blob store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the payload file of `id`.
    pub fn payload_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Location of the metadata sidecar of `id`.
    pub fn metadata_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(id.metadata_file_name())
    }

    async fn write_file(&self, target: PathBuf, contents: &[u8]) -> BlobResult<()> {
        let partial = partial_path(&target);
        let result = match fs::write(&partial, contents).await {
            Ok(()) => fs::rename(&partial, &target)
                .await
                .map_err(|e| BlobError::io(&target, e)),
            Err(e) => Err(BlobError::io(&partial, e)),
        };
        if result.is_err() {
            if let Err(e) = self.remove_file(partial.clone()).await {
                warn!(path = %partial.display(), error = %e, "failed to remove partial write");
            }
        }
        result
    }

    async fn remove_file(&self, path: PathBuf) -> BlobResult<bool> {
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobError::io(path, e)),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn write(&self, id: &BlobId, data: Bytes) -> BlobResult<()> {
        self.write_file(self.payload_path(id), &data).await
    }

    async fn read(&self, id: &BlobId) -> BlobResult<Bytes> {
        let path = self.payload_path(id);
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(id.clone())),
            Err(e) => Err(BlobError::io(path, e)),
        }
    }

    async fn exists(&self, id: &BlobId) -> BlobResult<bool> {
        let path = self.payload_path(id);
        fs::try_exists(&path)
            .await
            .map_err(|e| BlobError::io(path, e))
    }

    async fn write_metadata(&self, id: &BlobId, info: &StorageFileInfo) -> BlobResult<()> {
        let json = info.to_json()?;
        self.write_file(self.metadata_path(id), &json).await
    }

    async fn read_metadata(&self, id: &BlobId) -> BlobResult<StorageFileInfo> {
        let path = self.metadata_path(id);
        match fs::read(&path).await {
            Ok(json) => Ok(StorageFileInfo::from_json(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(BlobError::MetadataNotFound(id.clone()))
            }
            Err(e) => Err(BlobError::io(path, e)),
        }
    }

    async fn delete(&self, id: &BlobId) -> BlobResult<RemovedFiles> {
        let payload = self.remove_file(self.payload_path(id)).await;
        let metadata = self.remove_file(self.metadata_path(id)).await;
        Ok(RemovedFiles {
            payload: payload?,
            metadata: metadata?,
        })
    }

    async fn remove_stale_partials(&self, min_age: Duration) -> BlobResult<usize> {
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| BlobError::io(&self.root, e))?;
        let now = SystemTime::now();
        let mut removed = 0;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| BlobError::io(&self.root, e))?
        {
            let is_partial = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX));
            if !is_partial {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(BlobError::io(entry.path(), e)),
            };
            if now.duration_since(modified).unwrap_or(Duration::ZERO) < min_age {
                continue;
            }
            if self.remove_file(entry.path()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn list(&self) -> BlobResult<Vec<BlobEntry>> {
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| BlobError::io(&self.root, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| BlobError::io(&self.root, e))?
        {
            // Sidecars, partial writes and foreign files all fail to parse.
            let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| BlobId::parse(name).ok())
            else {
                continue;
            };
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Removed between read_dir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(BlobError::io(entry.path(), e)),
            };
            if !meta.is_file() {
                continue;
            }
            let modified = meta
                .modified()
                .map_err(|e| BlobError::io(entry.path(), e))?;
            entries.push(BlobEntry { id, modified });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(dir.path().join("blobs")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_root() {
        let (dir, store) = temp_store().await;
        assert!(dir.path().join("blobs").is_dir());
        assert_eq!(store.root(), dir.path().join("blobs"));
    }

    #[tokio::test]
    async fn write_then_read() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store.write(&id, Bytes::from_static(b"hello")).await.unwrap();

        assert!(store.exists(&id).await.unwrap());
        assert_eq!(store.read(&id).await.unwrap(), Bytes::from_static(b"hello"));
        assert!(store.payload_path(&id).is_file());
    }

    #[tokio::test]
    async fn write_overwrites() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store.write(&id, Bytes::from_static(b"one")).await.unwrap();
        store.write(&id, Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(store.read(&id).await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        assert!(!store.exists(&id).await.unwrap());
        let err = store.read(&id).await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn metadata_sidecar_naming() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store
            .write_metadata(&id, &StorageFileInfo::new("a/b.txt", 3))
            .await
            .unwrap();

        let path = store.root().join(format!("{id}.info.json"));
        assert_eq!(store.metadata_path(&id), path);
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["path"], "a/b.txt");

        let info = store.read_metadata(&id).await.unwrap();
        assert_eq!(info.path, "a/b.txt");
        assert_eq!(info.size, Some(3));
    }

    #[tokio::test]
    async fn read_missing_metadata() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        let err = store.read_metadata(&id).await.unwrap_err();
        assert!(matches!(err, BlobError::MetadataNotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_both_files_and_is_idempotent() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store.write(&id, Bytes::from_static(b"x")).await.unwrap();
        store
            .write_metadata(&id, &StorageFileInfo::new("p", 1))
            .await
            .unwrap();

        let removed = store.delete(&id).await.unwrap();
        assert_eq!(removed, RemovedFiles { payload: true, metadata: true });
        assert!(!store.payload_path(&id).exists());
        assert!(!store.metadata_path(&id).exists());

        let removed = store.delete(&id).await.unwrap();
        assert!(!removed.any());
    }

    #[tokio::test]
    async fn delete_with_only_payload() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store.write(&id, Bytes::from_static(b"x")).await.unwrap();
        let removed = store.delete(&id).await.unwrap();
        assert_eq!(removed, RemovedFiles { payload: true, metadata: false });
    }

    #[tokio::test]
    async fn list_skips_sidecars_and_foreign_files() {
        let (_dir, store) = temp_store().await;
        let a = BlobId::generate();
        let b = BlobId::generate();
        store.write(&a, Bytes::from_static(b"a")).await.unwrap();
        store.write(&b, Bytes::from_static(b"b")).await.unwrap();
        store
            .write_metadata(&a, &StorageFileInfo::new("a", 1))
            .await
            .unwrap();
        std::fs::write(store.root().join("README"), b"not a blob").unwrap();
        std::fs::write(store.root().join(format!("{a}.partial")), b"half").unwrap();

        let mut ids: Vec<BlobId> = store.list().await.unwrap().into_iter().map(|e| e.id).collect();
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn failed_rename_cleans_up_partial_file() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        let blocker = store.payload_path(&id);
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("occupied"), b"x").unwrap();

        assert!(store.write(&id, Bytes::from_static(b"data")).await.is_err());
        assert!(!store.root().join(format!("{id}.partial")).exists());
    }

    #[tokio::test]
    async fn stale_partials_are_reclaimed() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store.write(&id, Bytes::from_static(b"kept")).await.unwrap();
        let stale = store.root().join(format!("{}.partial", BlobId::generate()));
        std::fs::write(&stale, b"half").unwrap();

        assert_eq!(store.remove_stale_partials(Duration::from_secs(3600)).await.unwrap(), 0);
        assert!(stale.exists());

        let old = SystemTime::now() - Duration::from_secs(7200);
        std::fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(old)
            .unwrap();
        assert_eq!(store.remove_stale_partials(Duration::from_secs(3600)).await.unwrap(), 1);
        assert!(!stale.exists());
        assert!(store.payload_path(&id).is_file());
    }

    #[tokio::test]
    async fn delete_still_removes_sidecar_when_payload_removal_fails() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store
            .write_metadata(&id, &StorageFileInfo::new("p", 1))
            .await
            .unwrap();
        // A non-empty directory where the payload should be cannot be unlinked.
        let payload = store.payload_path(&id);
        std::fs::create_dir(&payload).unwrap();
        std::fs::write(payload.join("occupied"), b"x").unwrap();

        assert!(store.delete(&id).await.is_err());
        assert!(!store.metadata_path(&id).exists());
    }

    #[tokio::test]
    async fn no_partial_files_left_behind() {
        let (_dir, store) = temp_store().await;
        let id = BlobId::generate();
        store.write(&id, Bytes::from_static(b"data")).await.unwrap();
        let names: Vec<String> = std::fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![id.to_string()]);
    }
}
