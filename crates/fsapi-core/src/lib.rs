//! Storage object coordination for the file store.
//!
//! The [`StorageCoordinator`] turns logical path operations (put, get, list,
//! delete-by-prefix) into calls against two independent stores: the key
//! index (path -> blob id) and the blob store (blob id -> payload + sidecar).
//! There is no transaction spanning both. Every operation is ordered so that
//! a crash or a failed call leaves, at worst, an orphaned blob and never an
//! index entry pointing at a blob that was never written.
//!
//! # Design Rules
//!
//! 1. Blob files are written before the index entry that references them.
//! 2. Overwriting a path orphans its previous blob; nothing is reclaimed
//!    inline. [`StorageCoordinator::sweep_orphans`] reclaims orphans offline.
//! 3. Readers treat a missing or malformed pointer as "not found".
//! 4. Bulk deletes process each key independently and keep going on error.
//! 5. No locks. Concurrent writers to the same path race; the last index
//!    write wins.
//!
//! [`InlineFiles`] is the simpler sibling service that keeps content
//! directly in the key index.

pub mod coordinator;
pub mod error;
pub mod inline;
pub mod report;
pub mod sweep;

pub use coordinator::{StorageCoordinator, STORAGE_LOCATION};
pub use error::{CoordinatorError, CoordinatorResult};
pub use inline::InlineFiles;
pub use report::{DeleteFailure, DeleteReport, SweepReport};
