//! codesync - incremental vector-index synchronization for git
//! repositories.
//!
//! Command-line entry point.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use codesync::embeddings::{EmbeddingProvider, OpenAiProvider};
use codesync::observability::init_tracing;
use codesync::preprocess::LanguageRegistry;
use codesync::server::McpState;
use codesync::storage::{init_sqlite_vec, init_storage, search_by_embedding, Database, SqliteStore};
use codesync::sync::{SyncEngine, SyncRequest};
use codesync::vcs::GitVcs;
use codesync::{Config, Result};

/// Keep a vector index in step with a git repository.
#[derive(Parser, Debug)]
#[command(name = "codesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of the repository to index
    #[arg(short, long, env = "CODESYNC_REPO_ROOT", default_value = ".")]
    repo_root: std::path::PathBuf,

    /// Data directory for the `SQLite` index database
    #[arg(short, long, env = "CODESYNC_DATA_DIR", default_value = "./data")]
    data_dir: std::path::PathBuf,

    /// Base URL of the OpenAI-compatible embedding endpoint
    #[arg(
        long,
        env = "CODESYNC_EMBEDDING_URL",
        default_value = "http://localhost:8000"
    )]
    embedding_url: String,

    /// Model name sent with embedding requests
    #[arg(
        long,
        env = "CODESYNC_EMBEDDING_MODEL",
        default_value = "Qwen3-Embedding-0.6B"
    )]
    embedding_model: String,

    /// Embedding vector dimension
    #[arg(long, env = "CODESYNC_EMBEDDING_DIM", default_value = "1024")]
    embedding_dim: usize,

    /// Per-request embedding timeout in seconds
    #[arg(long, env = "CODESYNC_EMBED_TIMEOUT", default_value = "10")]
    embed_timeout: u64,

    /// Bounded concurrency for the per-file transform stage
    #[arg(short, long, env = "CODESYNC_WORKERS")]
    workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CODESYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "CODESYNC_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronize the index with the repository
    Sync {
        /// Sync everything that changed since the last indexed revision
        #[arg(long)]
        git: bool,

        /// Index exactly these repository-relative paths
        #[arg(long, value_delimiter = ',')]
        add: Vec<String>,

        /// Remove exactly these repository-relative paths from the index
        #[arg(long, value_delimiter = ',')]
        delete: Vec<String>,
    },

    /// Search the index by semantic similarity
    Search {
        /// Query text
        #[arg(short, long)]
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print the effective configuration as JSON
    Config,

    /// Serve the MCP search endpoints over HTTP
    Serve {
        /// Host address to bind to
        #[arg(long, env = "CODESYNC_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "CODESYNC_PORT", default_value = "8080")]
        port: u16,
    },
}

impl Cli {
    fn to_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            repo_root: self.repo_root.clone(),
            data_dir: self.data_dir.clone(),
            embedding_url: self.embedding_url.clone(),
            embedding_model: self.embedding_model.clone(),
            embedding_dim: self.embedding_dim,
            embed_timeout_secs: self.embed_timeout,
            workers: self.workers.unwrap_or(defaults.workers),
            log_level: self.log_level.clone(),
        }
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    init_sqlite_vec();
    let db = Database::open(config.database_path())?;
    init_storage(&db, config.embedding_dim)?;
    Ok(SqliteStore::new(db))
}

async fn run_sync(config: &Config, request: &SyncRequest) -> Result<()> {
    let store = open_store(config)?;
    let provider = OpenAiProvider::new(
        &config.embedding_url,
        &config.embedding_model,
        config.embed_timeout_secs,
    )?;
    let engine = SyncEngine::new(
        config,
        Box::new(GitVcs::new(&config.repo_root)),
        store,
        Box::new(provider),
        LanguageRegistry::standard(),
    );

    let report = engine.run(request).await?;
    println!(
        "indexed {} deleted {} skipped {} failed {} watermark {}",
        report.indexed,
        report.deleted,
        report.skipped,
        report.failed,
        report.watermark.as_deref().unwrap_or("-"),
    );
    Ok(())
}

async fn run_search(config: &Config, query: &str, limit: usize) -> Result<()> {
    let store = open_store(config)?;
    let provider = OpenAiProvider::new(
        &config.embedding_url,
        &config.embedding_model,
        config.embed_timeout_secs,
    )?;

    let embedding = provider.encode(query).await?;
    let hits = store
        .database()
        .with_conn(|conn| search_by_embedding(conn, &embedding, limit))?;

    if hits.is_empty() {
        println!("no results");
        return Ok(());
    }
    for hit in hits {
        println!("{:.4}  {}", hit.distance, hit.path);
    }
    Ok(())
}

async fn run_serve(config: &Config, host: &str, port: u16) -> Result<()> {
    let store = open_store(config)?;
    let provider = OpenAiProvider::new(
        &config.embedding_url,
        &config.embedding_model,
        config.embed_timeout_secs,
    )?;

    let state = Arc::new(McpState::new(
        store.database().clone(),
        Box::new(provider),
    ));
    codesync::server::serve(state, host, port).await
}

fn print_config(config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| codesync::Error::internal(format!("failed to serialize config: {e}")))?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config();
    tracing::debug!(?config, "Configuration loaded");
    config.validate()?;

    match &cli.command {
        Command::Sync { git, add, delete } => {
            // Bare `codesync sync` defaults to a revision sync.
            let revision = *git || (add.is_empty() && delete.is_empty());
            let request = SyncRequest::from_parts(add.clone(), delete.clone(), revision)?;
            run_sync(&config, &request).await
        }
        Command::Search { query, limit } => run_search(&config, query, *limit).await,
        Command::Config => print_config(&config),
        Command::Serve { host, port } => run_serve(&config, host, *port).await,
    }
}
