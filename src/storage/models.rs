//! Data models for storage operations.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp.
pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(0))
        .unwrap_or(0)
}

/// One file's indexable unit: its path, preprocessed text, and embedding.
///
/// Exactly one chunk exists per indexed path; re-indexing the same path
/// replaces the previous chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    /// Repository-relative path of the source file.
    pub path: String,

    /// Preprocessed source text (header boilerplate stripped).
    pub content: String,

    /// Embedding vector.
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            embedding,
        }
    }
}

/// A semantic search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Repository-relative path of the matched file.
    pub path: String,

    /// Vector distance to the query (smaller is closer).
    pub distance: f32,
}
