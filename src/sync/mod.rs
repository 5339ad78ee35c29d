//! Incremental synchronization pipeline.
//!
//! The pipeline is detect (what changed since the watermark), filter
//! (drop ignored paths), transform (read, preprocess, embed), and apply
//! (one atomic batch that also advances the watermark).

mod detector;
mod engine;
mod filter;

pub use detector::{detect, ChangeSet};
pub use engine::{SyncEngine, SyncReport, SyncRequest};
pub use filter::IgnoreRules;
