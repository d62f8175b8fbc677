//! Redis-backed key index.
//!
//! Uses a multiplexed [`ConnectionManager`] which reconnects on its own and
//! is cheap to clone, so every call clones the handle instead of locking it.

use std::collections::HashSet;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};

use crate::error::{IndexError, IndexResult};
use crate::traits::{KeyIndex, KeyStream};

/// Keys requested per `SCAN` round trip.
const DEFAULT_SCAN_BATCH: usize = 500;

#[derive(Clone)]
pub struct RedisKeyIndex {
    conn: ConnectionManager,
    scan_batch: usize,
}

impl RedisKeyIndex {
    /// Connect to the store at `url` and verify it answers `PING`.
    ///
    /// An empty `url` fails with [`IndexError::MissingConnectionString`].
    pub async fn connect(url: &str) -> IndexResult<Self> {
        if url.trim().is_empty() {
            return Err(IndexError::MissingConnectionString);
        }
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("connected to key index");
        Ok(Self {
            conn,
            scan_batch: DEFAULT_SCAN_BATCH,
        })
    }

    /// Override the `COUNT` hint used for prefix scans.
    pub fn with_scan_batch(mut self, scan_batch: usize) -> Self {
        self.scan_batch = scan_batch.max(1);
        self
    }
}

impl std::fmt::Debug for RedisKeyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKeyIndex")
            .field("scan_batch", &self.scan_batch)
            .finish()
    }
}

/// Build a `MATCH` pattern that matches exactly the keys starting with
/// `prefix`. Glob metacharacters in the prefix are escaped.
pub fn match_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('*');
    pattern
}

/// Values are read lossily: a binary value written by another client shows
/// up with replacement characters rather than failing the read.
fn decode_value(raw: Vec<u8>) -> String {
    match String::from_utf8(raw) {
        Ok(value) => value,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Keys that are not UTF-8 cannot be addressed through this index, so they
/// are skipped instead of failing the whole scan.
fn decode_keys(raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|key| match String::from_utf8(key) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(key = %String::from_utf8_lossy(e.as_bytes()), "skipping non-UTF-8 key");
                None
            }
        })
        .collect()
}

#[async_trait]
impl KeyIndex for RedisKeyIndex {
    async fn get(&self, key: &str) -> IndexResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value.map(decode_value))
    }

    async fn set(&self, key: &str, value: &str) -> IndexResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> IndexResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    fn scan_prefix(&self, prefix: &str) -> KeyStream {
        let mut conn = self.conn.clone();
        let pattern = match_pattern(prefix);
        let batch = self.scan_batch;
        let stream = try_stream! {
            // SCAN may return a key more than once across cursor steps.
            let mut seen = HashSet::new();
            let mut cursor: u64 = 0;
            loop {
                let (next, keys): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(batch)
                    .query_async(&mut conn)
                    .await
                    .map_err(IndexError::from)?;
                debug!(cursor, next, batch = keys.len(), "scan step");
                for key in decode_keys(keys) {
                    if seen.insert(key.clone()) {
                        yield key;
                    }
                }
                if next == 0 {
                    break;
                }
                cursor = next;
            }
        };
        stream.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_appends_wildcard() {
        assert_eq!(match_pattern("docs/"), "docs/*");
        assert_eq!(match_pattern(""), "*");
    }

    #[test]
    fn pattern_escapes_glob_metacharacters() {
        assert_eq!(match_pattern("a*b"), "a\\*b*");
        assert_eq!(match_pattern("x?[y]"), "x\\?\\[y\\]*");
        assert_eq!(match_pattern("c:\\dir"), "c:\\\\dir*");
    }

    #[test]
    fn scan_reply_with_binary_key_decodes() {
        use redis::Value;

        let reply = Value::Array(vec![
            Value::BulkString(b"17".to_vec()),
            Value::Array(vec![
                Value::BulkString(b"docs/a".to_vec()),
                Value::BulkString(vec![b'd', b'o', b'c', b's', b'/', 0xff, 0xfe]),
                Value::BulkString(b"docs/b".to_vec()),
            ]),
        ]);
        let (next, keys): (u64, Vec<Vec<u8>>) = redis::from_redis_value(&reply).unwrap();
        assert_eq!(next, 17);
        assert_eq!(keys.len(), 3);
        assert_eq!(decode_keys(keys), vec!["docs/a", "docs/b"]);
    }

    #[test]
    fn binary_value_decodes_lossily() {
        let reply = redis::Value::BulkString(vec![b'o', b'k', 0xff]);
        let raw: Option<Vec<u8>> = redis::from_redis_value(&reply).unwrap();
        assert_eq!(raw.map(decode_value).as_deref(), Some("ok\u{fffd}"));

        let nil: Option<Vec<u8>> = redis::from_redis_value(&redis::Value::Nil).unwrap();
        assert!(nil.is_none());
    }

    #[tokio::test]
    async fn empty_connection_string_is_rejected() {
        let err = RedisKeyIndex::connect("  ").await.unwrap_err();
        assert!(matches!(err, IndexError::MissingConnectionString));
    }

    /// Needs a live server: `REDIS_CONNECTION_STRING=redis://127.0.0.1/ cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn redis_round_trip_and_scan() {
        let url = std::env::var("REDIS_CONNECTION_STRING")
            .unwrap_or_else(|_| "redis://127.0.0.1/".into());
        let index = RedisKeyIndex::connect(&url).await.unwrap().with_scan_batch(2);

        let base = format!("fsapi-test-{}/", std::process::id());
        for name in ["x", "y", "z"] {
            index.set(&format!("{base}{name}"), name).await.unwrap();
        }
        assert_eq!(index.get(&format!("{base}x")).await.unwrap().as_deref(), Some("x"));

        let mut keys = index.list_by_prefix(&base).await.unwrap();
        keys.sort();
        assert_eq!(keys, vec![format!("{base}x"), format!("{base}y"), format!("{base}z")]);

        for key in keys {
            assert!(index.delete(&key).await.unwrap());
        }
        assert!(index.list_by_prefix(&base).await.unwrap().is_empty());
    }
}
