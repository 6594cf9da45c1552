use factory_tint::PreparedSubject;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Subject identifier (content hash of the upload)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// First 16 hex characters of the SHA-256 of `bytes`
    ///
    /// Uploading the same photo twice yields the same id.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(hex::encode(&digest[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uploaded, isolated and prepared subject
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: SubjectId,
    pub prepared: Arc<PreparedSubject>,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    /// Whether the upload already carried its own cut-out
    pub had_transparency: bool,
}

impl Subject {
    pub fn new(id: SubjectId, prepared: PreparedSubject, had_transparency: bool) -> Self {
        Self {
            id,
            prepared: Arc::new(prepared),
            uploaded_at: chrono::Utc::now(),
            had_transparency,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.prepared.dimensions()
    }
}
