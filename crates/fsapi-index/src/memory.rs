//! In-memory key index for testing and ephemeral use.
//!
//! [`InMemoryKeyIndex`] keeps all entries in a `HashMap` behind a `RwLock`.
//! Prefix scans take a snapshot of the matching keys when the scan starts.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::error::{IndexError, IndexResult};
use crate::traits::{KeyIndex, KeyStream};

#[derive(Debug, Default)]
pub struct InMemoryKeyIndex {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> IndexError {
    IndexError::Poisoned(e.to_string())
}

#[async_trait]
impl KeyIndex for InMemoryKeyIndex {
    async fn get(&self, key: &str) -> IndexResult<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> IndexResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> IndexResult<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn scan_prefix(&self, prefix: &str) -> KeyStream {
        let snapshot: IndexResult<Vec<String>> = self
            .entries
            .read()
            .map(|entries| {
                entries
                    .keys()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .map_err(poisoned);
        match snapshot {
            Ok(keys) => stream::iter(keys.into_iter().map(Ok)).boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sorted(index: &InMemoryKeyIndex, prefix: &str) -> Vec<String> {
        let mut keys = index.list_by_prefix(prefix).await.unwrap();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn set_get_overwrite() {
        let index = InMemoryKeyIndex::new();
        assert_eq!(index.get("a").await.unwrap(), None);

        index.set("a", "1").await.unwrap();
        assert_eq!(index.get("a").await.unwrap().as_deref(), Some("1"));

        index.set("a", "2").await.unwrap();
        assert_eq!(index.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let index = InMemoryKeyIndex::new();
        index.set("a", "1").await.unwrap();
        assert!(index.delete("a").await.unwrap());
        assert!(!index.delete("a").await.unwrap());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn prefix_is_plain_string_match() {
        let index = InMemoryKeyIndex::new();
        for key in ["a/x", "a/y", "b/z", "ab", "a"] {
            index.set(key, "v").await.unwrap();
        }

        assert_eq!(sorted(&index, "a").await, vec!["a", "a/x", "a/y", "ab"]);
        assert_eq!(sorted(&index, "a/").await, vec!["a/x", "a/y"]);
        assert_eq!(sorted(&index, "b").await, vec!["b/z"]);
        assert!(sorted(&index, "c").await.is_empty());
        assert_eq!(sorted(&index, "").await.len(), 5);
    }

    #[tokio::test]
    async fn len_survives_poisoned_lock() {
        let index = InMemoryKeyIndex::new();
        index.set("k", "v").await.unwrap();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = index.entries.write().unwrap();
            panic!("writer panicked");
        }));
        assert!(index.entries.is_poisoned());
        assert_eq!(index.len(), 1);
        assert!(!index.is_empty());
        assert!(matches!(index.get("k").await, Err(IndexError::Poisoned(_))));
    }

    #[tokio::test]
    async fn glob_characters_are_literal() {
        let index = InMemoryKeyIndex::new();
        index.set("a*b", "v").await.unwrap();
        index.set("axb", "v").await.unwrap();
        assert_eq!(sorted(&index, "a*").await, vec!["a*b"]);
    }

    #[tokio::test]
    async fn scan_is_a_snapshot() {
        let index = InMemoryKeyIndex::new();
        index.set("p/1", "v").await.unwrap();
        let stream = index.scan_prefix("p/");
        index.set("p/2", "v").await.unwrap();

        use futures::TryStreamExt;
        let keys: Vec<String> = stream.try_collect().await.unwrap();
        assert_eq!(keys, vec!["p/1"]);
    }
}
