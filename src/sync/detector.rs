//! Change detection between the stored watermark and the current head.

use tracing::{debug, info};

use crate::error::EnvironmentError;
use crate::vcs::{FileStatus, Vcs};
use crate::Result;

/// The set of paths whose index entries are out of date, plus the head
/// revision they were computed against.
///
/// The three path lists are disjoint: a path appears in at most one of
/// them. `head` is the revision the repository was at when detection ran;
/// advancing the watermark to it (after the change set is applied) makes
/// the index current as of that revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Head revision at detection time.
    pub head: String,
    /// Paths new since the watermark.
    pub added: Vec<String>,
    /// Paths whose content changed since the watermark.
    pub modified: Vec<String>,
    /// Paths removed since the watermark.
    pub deleted: Vec<String>,
}

impl ChangeSet {
    /// An empty change set at `head`.
    #[must_use]
    pub const fn empty(head: String) -> Self {
        Self {
            head,
            added: Vec::new(),
            modified: Vec::new(),
            deleted: Vec::new(),
        }
    }

    /// Whether no paths changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Total number of changed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

/// Compute the change set between `watermark` and the repository head.
///
/// An absent watermark means the index has never been populated: every
/// tracked file is reported as added (full scan). A watermark equal to
/// the head yields an empty change set. Otherwise the two revisions are
/// diffed and entries classified as added, modified, or deleted; other
/// status codes are ignored.
///
/// # Errors
///
/// Returns `EnvironmentError::NotARepository` if `repo` names a
/// directory without version-control metadata, and
/// `EnvironmentError::UnknownRevision` if the watermark no longer
/// resolves (for example after a history rewrite). Both abort before any
/// store mutation.
pub async fn detect(vcs: &dyn Vcs, repo: &str, watermark: Option<&str>) -> Result<ChangeSet> {
    if !vcs.is_working_copy().await {
        return Err(EnvironmentError::NotARepository(repo.to_string()).into());
    }

    let head = vcs.resolve_revision("HEAD").await?;

    let Some(mark) = watermark else {
        let added = vcs.list_tracked().await?;
        info!(head = %head, files = added.len(), "No watermark, scheduling full scan");
        return Ok(ChangeSet {
            head,
            added,
            modified: Vec::new(),
            deleted: Vec::new(),
        });
    };

    let mark = vcs.resolve_revision(mark).await?;
    if mark == head {
        debug!(head = %head, "Watermark already at head");
        return Ok(ChangeSet::empty(head));
    }

    let entries = vcs.diff_status(&mark, &head).await?;
    let mut change_set = ChangeSet::empty(head);
    for entry in entries {
        match entry.status {
            FileStatus::Added => change_set.added.push(entry.path),
            FileStatus::Modified => change_set.modified.push(entry.path),
            FileStatus::Deleted => change_set.deleted.push(entry.path),
            FileStatus::Other => {
                debug!(path = %entry.path, "Ignoring unclassified diff entry");
            }
        }
    }

    info!(
        from = %mark,
        to = %change_set.head,
        added = change_set.added.len(),
        modified = change_set.modified.len(),
        deleted = change_set.deleted.len(),
        "Detected changes"
    );
    Ok(change_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::DiffEntry;
    use crate::Error;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory stand-in for a git working copy.
    struct FakeVcs {
        working_copy: bool,
        head: String,
        known: Vec<String>,
        tracked: Vec<String>,
        diffs: HashMap<(String, String), Vec<DiffEntry>>,
    }

    impl FakeVcs {
        fn new(head: &str) -> Self {
            Self {
                working_copy: true,
                head: head.to_string(),
                known: vec![head.to_string()],
                tracked: Vec::new(),
                diffs: HashMap::new(),
            }
        }

        fn with_tracked(mut self, paths: &[&str]) -> Self {
            self.tracked = paths.iter().map(ToString::to_string).collect();
            self
        }

        fn with_diff(mut self, from: &str, to: &str, entries: Vec<DiffEntry>) -> Self {
            self.known.push(from.to_string());
            self.diffs.insert((from.to_string(), to.to_string()), entries);
            self
        }
    }

    #[async_trait]
    impl Vcs for FakeVcs {
        async fn is_working_copy(&self) -> bool {
            self.working_copy
        }

        async fn resolve_revision(&self, revision: &str) -> Result<String> {
            if revision == "HEAD" {
                return Ok(self.head.clone());
            }
            if self.known.iter().any(|k| k == revision) {
                return Ok(revision.to_string());
            }
            Err(EnvironmentError::UnknownRevision(revision.to_string()).into())
        }

        async fn list_tracked(&self) -> Result<Vec<String>> {
            Ok(self.tracked.clone())
        }

        async fn diff_status(&self, from: &str, to: &str) -> Result<Vec<DiffEntry>> {
            Ok(self
                .diffs
                .get(&(from.to_string(), to.to_string()))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn entry(status: FileStatus, path: &str) -> DiffEntry {
        DiffEntry {
            status,
            path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn test_not_a_repository() {
        let mut vcs = FakeVcs::new("aaa");
        vcs.working_copy = false;

        let err = detect(&vcs, "/tmp/nowhere", None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Environment(EnvironmentError::NotARepository(_))
        ));
    }

    #[tokio::test]
    async fn test_absent_watermark_full_scan() {
        let vcs = FakeVcs::new("aaa").with_tracked(&["main.py", "README.md"]);

        let cs = detect(&vcs, ".", None).await.unwrap();
        assert_eq!(cs.head, "aaa");
        assert_eq!(cs.added, vec!["main.py", "README.md"]);
        assert!(cs.modified.is_empty());
        assert!(cs.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_watermark_at_head_is_empty() {
        let vcs = FakeVcs::new("aaa").with_tracked(&["main.py"]);

        let cs = detect(&vcs, ".", Some("aaa")).await.unwrap();
        assert!(cs.is_empty());
        assert_eq!(cs.head, "aaa");
    }

    #[tokio::test]
    async fn test_unknown_watermark() {
        let vcs = FakeVcs::new("aaa");

        let err = detect(&vcs, ".", Some("rewritten")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Environment(EnvironmentError::UnknownRevision(_))
        ));
    }

    #[tokio::test]
    async fn test_diff_classification() {
        let vcs = FakeVcs::new("bbb").with_diff(
            "aaa",
            "bbb",
            vec![
                entry(FileStatus::Added, "new.py"),
                entry(FileStatus::Modified, "main.py"),
                entry(FileStatus::Deleted, "old.py"),
                entry(FileStatus::Other, "renamed.py"),
            ],
        );

        let cs = detect(&vcs, ".", Some("aaa")).await.unwrap();
        assert_eq!(cs.head, "bbb");
        assert_eq!(cs.added, vec!["new.py"]);
        assert_eq!(cs.modified, vec!["main.py"]);
        assert_eq!(cs.deleted, vec!["old.py"]);
        assert_eq!(cs.len(), 3);
    }
}
