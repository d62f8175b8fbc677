//! Key index client for the file store.
//!
//! The key index maps a caller-chosen path to a short string value (a blob
//! identifier for stored objects, or the content itself for inline files).
//! Its key namespace doubles as the "directory tree": anything whose key
//! starts with a given string is considered to live under it.
//!
//! # Modules
//!
//! - [`error`] -- [`IndexError`] and the [`IndexResult`] alias
//! - [`traits`] -- the [`KeyIndex`] trait every backend implements
//! - [`redis_index`] -- [`RedisKeyIndex`], the production backend
//! - [`memory`] -- [`InMemoryKeyIndex`] for tests and embedding
//!
//! # Prefix semantics
//!
//! Prefix enumeration is a plain string `starts_with` test. `a` matches `a`,
//! `a/x` and also `ab`. Callers that want directory semantics must include
//! the separator in the prefix themselves.

pub mod error;
pub mod memory;
pub mod redis_index;
pub mod traits;

pub use error::{IndexError, IndexResult};
pub use memory::InMemoryKeyIndex;
pub use redis_index::RedisKeyIndex;
pub use traits::{KeyIndex, KeyStream};
