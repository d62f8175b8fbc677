use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Metadata sidecar stored as `{id}.info.json` next to every payload.
///
/// Only `path` is required when decoding; the remaining fields are filled in
/// by this implementation but tolerated as absent so older or hand-written
/// sidecars still parse. Unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFileInfo {
    /// The path the blob was originally stored under.
    pub path: String,
    /// Payload size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StorageFileInfo {
    /// Sidecar for a payload of `size` bytes written now.
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size: Some(size),
            created_at: Some(Utc::now()),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, TypeError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, TypeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
