//! Configuration management for codesync.
//!
//! Configuration is an explicit value built once in `main.rs` from
//! command-line arguments and environment variables, then passed by
//! reference into the engine and store constructors. There is no global
//! mutable configuration.

mod settings;

pub use settings::{Config, IGNORE_FILE_NAME};
