//! Sync orchestration.
//!
//! A run moves through detect, filter, transform, and apply. Detection
//! and filtering are fail-fast: an unusable environment aborts before
//! anything is staged. The transform stage is the opposite: per-file
//! failures are logged and counted, never fatal. Apply is all-or-nothing;
//! the watermark only advances when every staged mutation lands.

use std::path::PathBuf;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::detector::{detect, ChangeSet};
use super::filter::IgnoreRules;
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::preprocess::{preprocess, LanguageRegistry};
use crate::storage::{IndexStore, IndexedChunk, PendingBatch};
use crate::vcs::Vcs;
use crate::{Error, Result};

/// What one sync run should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    /// Diff the stored watermark against the repository head and sync
    /// everything that changed.
    Revision,
    /// Index and remove exactly the listed paths. The watermark is not
    /// consulted and not advanced.
    Explicit {
        /// Paths to index.
        add: Vec<String>,
        /// Paths to remove from the index.
        delete: Vec<String>,
    },
}

impl SyncRequest {
    /// Build a request from CLI-shaped inputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingModes`] when explicit file lists are
    /// combined with a revision sync, and [`Error::NoWorkSpecified`] when
    /// neither is requested.
    pub fn from_parts(add: Vec<String>, delete: Vec<String>, revision: bool) -> Result<Self> {
        let explicit = !add.is_empty() || !delete.is_empty();
        match (revision, explicit) {
            (true, true) => Err(Error::ConflictingModes),
            (true, false) => Ok(Self::Revision),
            (false, true) => Ok(Self::Explicit { add, delete }),
            (false, false) => Err(Error::NoWorkSpecified),
        }
    }
}

/// Summary of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files embedded and upserted.
    pub indexed: usize,
    /// Paths removed from the index.
    pub deleted: usize,
    /// Files skipped: ignore-filtered, vanished from disk, or empty after
    /// preprocessing.
    pub skipped: usize,
    /// Files that could not be read or embedded.
    pub failed: usize,
    /// Watermark after the run.
    pub watermark: Option<String>,
}

/// Outcome of transforming one file.
enum Outcome {
    Indexed(IndexedChunk),
    Skipped,
    Failed,
}

/// Drives sync runs over a VCS, a store, and an embedding provider.
pub struct SyncEngine<S> {
    vcs: Box<dyn Vcs>,
    store: S,
    provider: Box<dyn EmbeddingProvider>,
    registry: LanguageRegistry,
    repo_root: PathBuf,
    ignore_path: PathBuf,
    workers: usize,
    embed_timeout: Duration,
}

impl<S: IndexStore> SyncEngine<S> {
    /// Wire up an engine from configuration and collaborators.
    #[must_use]
    pub fn new(
        config: &Config,
        vcs: Box<dyn Vcs>,
        store: S,
        provider: Box<dyn EmbeddingProvider>,
        registry: LanguageRegistry,
    ) -> Self {
        Self {
            vcs,
            store,
            provider,
            registry,
            repo_root: config.repo_root.clone(),
            ignore_path: config.ignore_file_path(),
            workers: config.workers,
            embed_timeout: Duration::from_secs(config.embed_timeout_secs),
        }
    }

    /// Execute one sync run.
    ///
    /// # Errors
    ///
    /// Returns an error when the environment is unusable (not a
    /// repository, unresolvable watermark) or the final batch apply
    /// fails. In both cases the index and watermark are untouched.
    pub async fn run(&self, request: &SyncRequest) -> Result<SyncReport> {
        match request {
            SyncRequest::Revision => self.run_revision().await,
            SyncRequest::Explicit { add, delete } => self.run_explicit(add, delete).await,
        }
    }

    async fn run_revision(&self) -> Result<SyncReport> {
        let watermark = self.store.watermark()?;
        let change_set = detect(
            self.vcs.as_ref(),
            &self.repo_root.display().to_string(),
            watermark.as_deref(),
        )
        .await?;
        let head = change_set.head.clone();

        if change_set.is_empty() && watermark.as_deref() == Some(head.as_str()) {
            info!(head = %head, "Index already current");
            return Ok(SyncReport {
                watermark: Some(head),
                ..SyncReport::default()
            });
        }

        let mut report = SyncReport::default();
        let (change_set, rules_skipped) = self.apply_ignore_rules(change_set);
        report.skipped += rules_skipped;

        let mut batch = PendingBatch::new();
        for path in &change_set.deleted {
            batch.push_delete(path.clone());
        }
        report.deleted = change_set.deleted.len();

        let mut to_index = change_set.added;
        to_index.extend(change_set.modified);
        self.transform_into(to_index, &mut batch, &mut report).await;

        // The watermark is the revision detection ran against, not
        // whatever the head happens to be at apply time.
        if watermark.as_deref() != Some(head.as_str()) {
            batch.set_watermark(head.clone());
        }

        self.store.apply(&batch)?;
        report.watermark = Some(head);

        info!(
            indexed = report.indexed,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            watermark = ?report.watermark,
            "Sync run complete"
        );
        Ok(report)
    }

    async fn run_explicit(&self, add: &[String], delete: &[String]) -> Result<SyncReport> {
        let rules = IgnoreRules::load(&self.ignore_path);

        let mut report = SyncReport::default();
        let requested = add.len() + delete.len();
        let add = rules.filter(add.to_vec());
        let delete = rules.filter(delete.to_vec());
        report.skipped += requested - (add.len() + delete.len());

        let mut batch = PendingBatch::new();
        for path in &delete {
            batch.push_delete(path.clone());
        }
        report.deleted = delete.len();

        self.transform_into(add, &mut batch, &mut report).await;

        self.store.apply(&batch)?;
        report.watermark = self.store.watermark()?;

        info!(
            indexed = report.indexed,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "Explicit sync complete"
        );
        Ok(report)
    }

    /// Drop ignored paths from every list of the change set, returning
    /// the filtered set and the number of paths dropped.
    fn apply_ignore_rules(&self, change_set: ChangeSet) -> (ChangeSet, usize) {
        let rules = IgnoreRules::load(&self.ignore_path);
        if rules.is_empty() {
            return (change_set, 0);
        }

        let before = change_set.len();
        let filtered = ChangeSet {
            head: change_set.head,
            added: rules.filter(change_set.added),
            modified: rules.filter(change_set.modified),
            deleted: rules.filter(change_set.deleted),
        };
        let dropped = before - filtered.len();
        if dropped > 0 {
            debug!(dropped, "Ignore rules filtered paths from change set");
        }
        (filtered, dropped)
    }

    /// Transform files concurrently and stage the results.
    async fn transform_into(
        &self,
        paths: Vec<String>,
        batch: &mut PendingBatch,
        report: &mut SyncReport,
    ) {
        let outcomes: Vec<Outcome> = stream::iter(paths)
            .map(|path| self.transform_file(path))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Indexed(chunk) => {
                    batch.push_upsert(chunk);
                    report.indexed += 1;
                }
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
        }
    }

    /// Read, preprocess, and embed one file. Never fails the run.
    async fn transform_file(&self, path: String) -> Outcome {
        let absolute = self.repo_root.join(&path);
        let content = match tokio::fs::read_to_string(&absolute).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path, "File no longer on disk, skipping");
                return Outcome::Skipped;
            }
            Err(e) => {
                warn!(path, error = %e, "Failed to read file");
                return Outcome::Failed;
            }
        };

        let prepared = preprocess(&content, &path, &self.registry);
        if prepared.trim().is_empty() {
            debug!(path, "No indexable content after preprocessing, skipping");
            return Outcome::Skipped;
        }

        match tokio::time::timeout(self.embed_timeout, self.provider.encode(&prepared)).await {
            Ok(Ok(embedding)) => Outcome::Indexed(IndexedChunk::new(path, prepared, embedding)),
            Ok(Err(e)) => {
                warn!(path, error = %e, "Embedding failed");
                Outcome::Failed
            }
            Err(_) => {
                warn!(
                    path,
                    timeout_secs = self.embed_timeout.as_secs(),
                    "Embedding timed out"
                );
                Outcome::Failed
            }
        }
    }
}
