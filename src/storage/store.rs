//! Client-side batching and the atomic apply path.
//!
//! A sync run stages its work in a [`PendingBatch`] and hands it to an
//! [`IndexStore`] in one call. Either every delete, every upsert, and the
//! watermark write land together, or none of them do.

use rusqlite::Connection;

use super::chunks::{delete_chunk_by_path, upsert_chunk};
use super::connection::Database;
use super::meta::{get_watermark, set_watermark};
use super::models::IndexedChunk;
use crate::Result;

/// The unit of atomicity for one sync run.
#[derive(Debug, Default)]
pub struct PendingBatch {
    upserts: Vec<IndexedChunk>,
    deletes: Vec<String>,
    new_watermark: Option<String>,
}

impl PendingBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a chunk upsert.
    pub fn push_upsert(&mut self, chunk: IndexedChunk) {
        self.upserts.push(chunk);
    }

    /// Stage a path deletion.
    pub fn push_delete(&mut self, path: impl Into<String>) {
        self.deletes.push(path.into());
    }

    /// Set the watermark to persist with this batch.
    pub fn set_watermark(&mut self, revision: impl Into<String>) {
        self.new_watermark = Some(revision.into());
    }

    /// Whether the batch stages no chunk mutations.
    ///
    /// A batch carrying only a watermark is still worth applying: it
    /// records that the index is current as of that revision.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }

    /// Whether applying the batch would change nothing at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.is_empty() && self.new_watermark.is_none()
    }

    /// Staged upserts.
    #[must_use]
    pub fn upserts(&self) -> &[IndexedChunk] {
        &self.upserts
    }

    /// Staged deletions.
    #[must_use]
    pub fn deletes(&self) -> &[String] {
        &self.deletes
    }

    /// The watermark this batch will persist, if any.
    #[must_use]
    pub fn watermark(&self) -> Option<&str> {
        self.new_watermark.as_deref()
    }
}

/// Store collaborator as seen by the sync engine: watermark access plus
/// one-shot transactional batch application.
pub trait IndexStore: Send + Sync {
    /// Read the persisted watermark.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn watermark(&self) -> Result<Option<String>>;

    /// Apply a batch atomically: deletes first, then upserts, then the
    /// watermark write. On error nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; the store is rolled
    /// back to its prior state.
    fn apply(&self, batch: &PendingBatch) -> Result<()>;
}

/// SQLite-backed index store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wrap an open database.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the underlying database (query paths, tests).
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    fn apply_inner(conn: &Connection, batch: &PendingBatch) -> Result<()> {
        // Deletes go first so a path deleted and re-added in the same
        // batch ends up present.
        for path in batch.deletes() {
            delete_chunk_by_path(conn, path)?;
        }

        for chunk in batch.upserts() {
            upsert_chunk(conn, chunk)?;
        }

        if let Some(revision) = batch.watermark() {
            set_watermark(conn, revision)?;
        }

        Ok(())
    }
}

impl IndexStore for SqliteStore {
    fn watermark(&self) -> Result<Option<String>> {
        self.db.with_conn(get_watermark)
    }

    fn apply(&self, batch: &PendingBatch) -> Result<()> {
        if batch.is_noop() {
            tracing::debug!("Empty batch, nothing to apply");
            return Ok(());
        }

        self.db
            .with_transaction(|conn| Self::apply_inner(conn, batch))?;

        tracing::info!(
            upserts = batch.upserts().len(),
            deletes = batch.deletes().len(),
            watermark = ?batch.watermark(),
            "Applied batch"
        );
        Ok(())
    }
}
