//! Version-control access.
//!
//! The engine never shells out directly; everything goes through the
//! [`Vcs`] trait so tests can substitute a fully in-memory fake.

mod git;

use async_trait::async_trait;

pub use git::GitVcs;

use crate::Result;

/// Status of one path in a two-revision diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Path exists in the newer revision only.
    Added,
    /// Path exists in both revisions with different content.
    Modified,
    /// Path exists in the older revision only.
    Deleted,
    /// Any other status code (rename, copy, type change). The detector
    /// ignores these rather than failing.
    Other,
}

impl FileStatus {
    /// Classify a single-letter git status code.
    #[must_use]
    pub const fn from_code(code: char) -> Self {
        match code {
            'A' => Self::Added,
            'M' => Self::Modified,
            'D' => Self::Deleted,
            _ => Self::Other,
        }
    }
}

/// One entry of a status-labeled diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// Classified status.
    pub status: FileStatus,
    /// Repository-relative path.
    pub path: String,
}

/// Boundary contract for version-control state.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Whether the working copy has version-control metadata.
    async fn is_working_copy(&self) -> bool;

    /// Resolve a revision identifier to its canonical commit hash.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::UnknownRevision` if the identifier does
    /// not resolve in the repository's history.
    async fn resolve_revision(&self, revision: &str) -> Result<String>;

    /// List every tracked repository-relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    async fn list_tracked(&self) -> Result<Vec<String>>;

    /// Status-labeled diff between two revisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the diff fails.
    async fn diff_status(&self, from: &str, to: &str) -> Result<Vec<DiffEntry>>;
}
