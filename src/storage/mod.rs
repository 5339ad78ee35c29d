//! `SQLite` storage with `sqlite-vec` for vector search.
//!
//! Holds one chunk row (path, preprocessed text) per indexed file, a
//! paired embedding in a vec0 virtual table, and the watermark of the
//! last fully indexed revision. Batch mutations and the watermark are
//! committed in a single transaction.

mod chunks;
mod connection;
mod meta;
mod models;
mod schema;
mod search;
mod store;
mod vector;

pub use chunks::{count_chunks, delete_chunk_by_path, list_indexed_paths, upsert_chunk};
pub use connection::Database;
pub use meta::{get_watermark, set_watermark};
pub use models::{IndexedChunk, SearchHit};
pub use schema::{migrate, verify_schema, SCHEMA_VERSION};
pub use search::search_by_embedding;
pub use store::{IndexStore, PendingBatch, SqliteStore};
pub use vector::{init_chunk_vectors, init_sqlite_vec, search_similar, CHUNK_VEC_TABLE};

/// Initialize storage: run migrations, verify the schema, create the
/// vector table for the configured embedding dimension. Callers must
/// register sqlite-vec with [`init_sqlite_vec`] before opening the
/// database.
///
/// # Errors
///
/// Returns an error if database initialization fails.
pub fn init_storage(db: &Database, embedding_dim: usize) -> crate::Result<()> {
    db.with_conn(|conn| {
        migrate(conn)?;
        verify_schema(conn)?;
        init_chunk_vectors(conn, embedding_dim)?;
        tracing::info!("Storage initialized, schema version {SCHEMA_VERSION}");
        Ok(())
    })
}
