use std::sync::Arc;

use fsapi_blobs::{BlobStore, LocalBlobStore};
use fsapi_core::{InlineFiles, StorageCoordinator};
use fsapi_index::{KeyIndex, RedisKeyIndex};
use tracing::warn;

use crate::config::{ServerConfig, ENV_STORAGE_LOCATION};
use crate::error::ServerResult;

/// Services shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub storage: StorageCoordinator,
    pub inline: InlineFiles,
}

impl AppState {
    pub fn new(index: Arc<dyn KeyIndex>, blobs: Option<Arc<dyn BlobStore>>) -> Self {
        Self {
            storage: StorageCoordinator::new(index.clone(), blobs),
            inline: InlineFiles::new(index),
        }
    }

    /// Connect to the configured stores.
    ///
    /// A missing or unreachable key index is fatal. A missing blob store
    /// root is only logged.
    pub async fn connect(config: &ServerConfig) -> ServerResult<Self> {
        let index = RedisKeyIndex::connect(config.require_redis_url()?).await?;
        let blobs: Option<Arc<dyn BlobStore>> = match &config.storage_location {
            Some(root) => Some(Arc::new(LocalBlobStore::open(root).await?)),
            None => {
                warn!("{ENV_STORAGE_LOCATION} is not set; storage object requests will fail");
                None
            }
        };
        Ok(Self::new(Arc::new(index), blobs))
    }
}
