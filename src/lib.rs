//! codesync - incremental vector-index synchronization for git
//! repositories.
//!
//! Keeps a `SQLite` + `sqlite-vec` index of a repository's file contents
//! in step with its git history. Each run diffs the stored watermark
//! against the current head, strips non-semantic file headers, embeds
//! what changed, and applies the result as one atomic batch that also
//! advances the watermark.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod embeddings;
pub mod error;
pub mod observability;
pub mod preprocess;
pub mod server;
pub mod storage;
pub mod sync;
pub mod vcs;

pub use config::Config;
pub use error::{Error, Result};
