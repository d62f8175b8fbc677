//! The [`KeyIndex`] trait defining the key index interface.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::error::IndexResult;

/// Lazy sequence of keys produced by [`KeyIndex::scan_prefix`].
pub type KeyStream = BoxStream<'static, IndexResult<String>>;

/// Remote key-value store used as a lookup table and as a prefix-matchable
/// key namespace.
///
/// Implementations are shared read-only across concurrent requests, so they
/// must be `Send + Sync` and hold no per-call mutable state. Writes are
/// last-writer-wins; there is no compare-and-set.
#[async_trait]
pub trait KeyIndex: Send + Sync {
    /// Point lookup. Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> IndexResult<Option<String>>;

    /// Unconditional upsert.
    async fn set(&self, key: &str, value: &str) -> IndexResult<()>;

    /// Remove a key. Returns `true` if it existed; absence is not an error.
    async fn delete(&self, key: &str) -> IndexResult<bool>;

    /// Enumerate every key whose string form starts with `prefix`.
    ///
    /// Each call starts a fresh enumeration. No ordering is guaranteed, and
    /// keys written or removed while the stream is being consumed may or may
    /// not show up.
    fn scan_prefix(&self, prefix: &str) -> KeyStream;

    /// Collect [`scan_prefix`](Self::scan_prefix) into a vector.
    async fn list_by_prefix(&self, prefix: &str) -> IndexResult<Vec<String>> {
        self.scan_prefix(prefix).try_collect().await
    }
}
