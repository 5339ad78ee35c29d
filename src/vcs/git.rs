//! Git implementation of the [`Vcs`] trait, shelling out to the `git`
//! binary with `-C <root>` so the process's working directory never
//! matters.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use super::{DiffEntry, FileStatus, Vcs};
use crate::error::EnvironmentError;
use crate::Result;

/// Git-backed VCS access rooted at a working copy.
#[derive(Debug, Clone)]
pub struct GitVcs {
    root: PathBuf,
}

impl GitVcs {
    /// Create a handle for the working copy at `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .await
            .map_err(|e| EnvironmentError::Git(format!("failed to spawn git: {e}")))?;
        Ok(output)
    }

    fn stdout_lines(output: &Output) -> Vec<String> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

#[async_trait]
impl Vcs for GitVcs {
    async fn is_working_copy(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"])
            .await
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    async fn resolve_revision(&self, revision: &str) -> Result<String> {
        let out = self.git(&["rev-parse", "--verify", revision]).await?;
        if !out.status.success() {
            return Err(EnvironmentError::UnknownRevision(revision.to_string()).into());
        }

        let hash = String::from_utf8_lossy(&out.stdout).trim().to_string();
        if hash.is_empty() {
            return Err(EnvironmentError::UnknownRevision(revision.to_string()).into());
        }
        Ok(hash)
    }

    async fn list_tracked(&self) -> Result<Vec<String>> {
        let out = self.git(&["ls-files"]).await?;
        if !out.status.success() {
            return Err(EnvironmentError::Git(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            )
            .into());
        }
        Ok(Self::stdout_lines(&out))
    }

    async fn diff_status(&self, from: &str, to: &str) -> Result<Vec<DiffEntry>> {
        let out = self.git(&["diff", "--name-status", from, to]).await?;
        if !out.status.success() {
            return Err(EnvironmentError::Git(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            )
            .into());
        }

        let mut entries = Vec::new();
        for line in Self::stdout_lines(&out) {
            // Format: "<status>\t<path>" with a possible similarity score
            // suffix on the status (e.g. R100).
            let mut parts = line.splitn(2, '\t');
            let (Some(code), Some(path)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Some(letter) = code.chars().next() else {
                continue;
            };
            entries.push(DiffEntry {
                status: FileStatus::from_code(letter),
                path: path.trim().to_string(),
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn git_in(dir: &Path, args: &[&str]) {
        let status = StdCommand::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .status()
            .expect("git not available");
        assert!(status.success(), "git {args:?} failed");
    }

    fn init_repo(dir: &Path) {
        git_in(dir, &["init", "-q"]);
        git_in(dir, &["config", "user.email", "test@example.com"]);
        git_in(dir, &["config", "user.name", "Test User"]);
    }

    #[tokio::test]
    async fn test_not_a_working_copy() {
        let tmp = TempDir::new().unwrap();
        let vcs = GitVcs::new(tmp.path());
        assert!(!vcs.is_working_copy().await);
    }

    #[tokio::test]
    async fn test_resolve_and_list() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        std::fs::write(tmp.path().join("a.py"), "print('a')\n").unwrap();
        git_in(tmp.path(), &["add", "."]);
        git_in(tmp.path(), &["commit", "-q", "-m", "initial"]);

        let vcs = GitVcs::new(tmp.path());
        assert!(vcs.is_working_copy().await);

        let head = vcs.resolve_revision("HEAD").await.unwrap();
        assert_eq!(head.len(), 40);

        let tracked = vcs.list_tracked().await.unwrap();
        assert_eq!(tracked, vec!["a.py"]);
    }

    #[tokio::test]
    async fn test_unknown_revision() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        std::fs::write(tmp.path().join("a.py"), "x = 1\n").unwrap();
        git_in(tmp.path(), &["add", "."]);
        git_in(tmp.path(), &["commit", "-q", "-m", "initial"]);

        let vcs = GitVcs::new(tmp.path());
        let err = vcs.resolve_revision("no-such-rev").await.unwrap_err();
        assert!(err.to_string().contains("unknown revision"));
    }

    #[tokio::test]
    async fn test_diff_status_classification() {
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        std::fs::write(tmp.path().join("keep.py"), "x = 1\n").unwrap();
        std::fs::write(tmp.path().join("gone.py"), "y = 2\n").unwrap();
        git_in(tmp.path(), &["add", "."]);
        git_in(tmp.path(), &["commit", "-q", "-m", "initial"]);

        let vcs = GitVcs::new(tmp.path());
        let base = vcs.resolve_revision("HEAD").await.unwrap();

        std::fs::write(tmp.path().join("keep.py"), "x = 1\nz = 3\n").unwrap();
        std::fs::write(tmp.path().join("new.py"), "n = 4\n").unwrap();
        std::fs::remove_file(tmp.path().join("gone.py")).unwrap();
        git_in(tmp.path(), &["add", "-A"]);
        git_in(tmp.path(), &["commit", "-q", "-m", "changes"]);

        let entries = vcs.diff_status(&base, "HEAD").await.unwrap();

        let find = |p: &str| entries.iter().find(|e| e.path == p).map(|e| e.status);
        assert_eq!(find("new.py"), Some(FileStatus::Added));
        assert_eq!(find("keep.py"), Some(FileStatus::Modified));
        assert_eq!(find("gone.py"), Some(FileStatus::Deleted));
    }
}
