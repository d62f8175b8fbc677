//! Inline file service: content stored directly as the key index value.
//!
//! There is no blob indirection and therefore nothing to keep consistent.
//! Inline files share the key namespace with stored objects, so listing or
//! deleting a prefix here also sees object paths and vice versa.

use std::sync::Arc;

use fsapi_index::KeyIndex;
use tracing::info;

use crate::error::CoordinatorResult;

#[derive(Clone)]
pub struct InlineFiles {
    index: Arc<dyn KeyIndex>,
}

impl std::fmt::Debug for InlineFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineFiles").finish_non_exhaustive()
    }
}

impl InlineFiles {
    pub fn new(index: Arc<dyn KeyIndex>) -> Self {
        Self { index }
    }

    pub async fn list(&self, prefix: &str) -> CoordinatorResult<Vec<String>> {
        let keys = self.index.list_by_prefix(prefix).await?;
        info!(keys = keys.len(), path = %prefix, "found keys for path");
        Ok(keys)
    }

    /// Store `content` as the value of `path`. Empty content is allowed.
    pub async fn put(&self, path: &str, content: &str) -> CoordinatorResult<()> {
        self.index.set(path, content).await?;
        Ok(())
    }

    /// The content at `path`, or an empty string when nothing is stored.
    pub async fn get(&self, path: &str) -> CoordinatorResult<String> {
        Ok(self.index.get(path).await?.unwrap_or_default())
    }

    /// Remove every key starting with `prefix` and return how many existed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> CoordinatorResult<usize> {
        let keys = self.index.list_by_prefix(prefix).await?;
        info!(keys = keys.len(), path = %prefix, "found keys for path to delete");
        let mut removed = 0;
        for key in keys {
            if self.index.delete(&key).await? {
                removed += 1;
            }
            info!(path = %key, "deleting");
        }
        Ok(removed)
    }
}
