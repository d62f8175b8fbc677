use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of random bytes behind a [`BlobId`].
const BLOB_ID_BYTES: usize = 16;

/// Opaque identifier naming a blob on the blob store.
///
/// A `BlobId` is 16 random bytes rendered as 32 lowercase hex characters.
/// It is not derived from the content: two puts of identical bytes produce
/// two distinct blobs. Uniqueness is probabilistic and never checked.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobId(String);

impl BlobId {
    /// Length of the hex representation.
    pub const LEN: usize = BLOB_ID_BYTES * 2;

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let bytes: [u8; BLOB_ID_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    /// Parse an identifier, rejecting anything that is not 32 lowercase hex
    /// characters.
    ///
    /// Values read back from the key index go through here so a corrupted or
    /// foreign value can never be turned into a path outside the blob root.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        if value.len() != Self::LEN {
            return Err(TypeError::InvalidBlobId {
                value: value.to_string(),
                reason: format!("expected {} characters, got {}", Self::LEN, value.len()),
            });
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(TypeError::InvalidBlobId {
                value: value.to_string(),
                reason: "expected lowercase hex".into(),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the metadata sidecar for this blob.
    pub fn metadata_file_name(&self) -> String {
        format!("{}.info.json", self.0)
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", &self.0[..8])
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BlobId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BlobId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlobId> for String {
    fn from(id: BlobId) -> Self {
        id.0
    }
}

impl AsRef<str> for BlobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
