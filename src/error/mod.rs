//! Error types and Result aliases for codesync.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.
//!
//! Per-file failures during a sync run (unreadable file, embedding call
//! failure, empty content after stripping) are deliberately not part of
//! this hierarchy: they are logged, counted in the run summary, and never
//! abort a run.

use thiserror::Error;

/// Result type alias using codesync's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for codesync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Both an explicit file list and a revision-based sync were requested.
    #[error("conflicting sync modes: explicit file lists cannot be combined with a revision sync")]
    ConflictingModes,

    /// Neither an explicit file list nor a revision-based sync was requested.
    #[error("no work specified: supply files to add/delete or request a revision sync")]
    NoWorkSpecified,

    /// Version-control environment error.
    #[error("environment error: {0}")]
    Environment(#[from] EnvironmentError),

    /// Database/storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Embedding generation error.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Version-control environment errors. Fatal: these abort a sync run
/// before any store mutation.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// The working copy has no version-control metadata.
    #[error("not a git repository: {0}")]
    NotARepository(String),

    /// The stored watermark does not resolve in the repository's history.
    #[error("unknown revision: '{0}'")]
    UnknownRevision(String),

    /// A git invocation failed.
    #[error("git command failed: {0}")]
    Git(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// `SQLite` database error.
    #[error("database error: {0}")]
    Database(String),

    /// Batch transaction error. The batch was rolled back and the
    /// watermark left unchanged; the run is safely retryable.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Vector table operation error.
    #[error("vector error: {0}")]
    Vector(String),
}

/// Embedding-specific errors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// HTTP transport failure reaching the provider.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider did not respond within the configured deadline.
    #[error("embedding request timed out after {0}s")]
    Timeout(u64),

    /// The provider answered with an unusable payload.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from the store's transactional apply.
    /// Such failures leave the index and watermark untouched.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
