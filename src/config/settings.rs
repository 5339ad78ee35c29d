//! Configuration settings and validation.

use serde::Serialize;
use std::path::PathBuf;

use crate::{Error, Result};

/// Name of the per-repository ignore file. Fixed at the engine level.
pub const IGNORE_FILE_NAME: &str = ".codebaseignore";

/// Main configuration for codesync.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Root of the repository to index.
    pub repo_root: PathBuf,

    /// Directory for the `SQLite` index database.
    pub data_dir: PathBuf,

    /// Base URL of the OpenAI-compatible embedding endpoint.
    pub embedding_url: String,

    /// Model name sent with embedding requests.
    pub embedding_model: String,

    /// Dimension of the embedding vectors.
    pub embedding_dim: usize,

    /// Per-request embedding timeout in seconds.
    pub embed_timeout_secs: u64,

    /// Bounded concurrency for the per-file transform stage.
    pub workers: usize,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            data_dir: PathBuf::from("./data"),
            embedding_url: "http://localhost:8000".to_string(),
            embedding_model: "Qwen3-Embedding-0.6B".to_string(),
            embedding_dim: 1024,
            embed_timeout_secs: 10,
            workers: std::thread::available_parallelism()
                .map(|n| n.get().min(4))
                .unwrap_or(4),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.embedding_url.is_empty() {
            return Err(Error::config("embedding_url cannot be empty"));
        }

        if self.embedding_dim == 0 {
            return Err(Error::config("embedding_dim cannot be 0"));
        }

        if self.embed_timeout_secs == 0 {
            return Err(Error::config("embed_timeout_secs cannot be 0"));
        }

        if self.workers == 0 {
            return Err(Error::config("workers cannot be 0"));
        }

        if self.workers > 32 {
            return Err(Error::config("workers cannot exceed 32"));
        }

        Ok(())
    }

    /// Get the path to the `SQLite` database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("codesync.db")
    }

    /// Get the path to the repository's ignore file.
    #[must_use]
    pub fn ignore_file_path(&self) -> PathBuf {
        self.repo_root.join(IGNORE_FILE_NAME)
    }
}
