//! Vector storage using the sqlite-vec extension.
//!
//! Embeddings live in a vec0 virtual table keyed by the owning chunk's
//! row id, so replacing a chunk replaces its vector in the same
//! transaction.

use rusqlite::Connection;
use sqlite_vec::sqlite3_vec_init;
use std::sync::Once;

use crate::error::StorageError;
use crate::Result;

/// Vector table holding one embedding per indexed chunk.
pub const CHUNK_VEC_TABLE: &str = "chunk_embeddings";

static INIT: Once = Once::new();

/// Register the sqlite-vec extension globally.
///
/// Must be called before any database connections are opened. Safe to
/// call multiple times; the `Once` guard makes subsequent calls no-ops.
#[allow(unsafe_code)]
pub fn init_sqlite_vec() {
    INIT.call_once(|| {
        // SAFETY: sqlite3_vec_init is a valid extension initializer and
        // sqlite3_auto_extension expects exactly that signature. The Once
        // guard prevents double registration. This is the standard loading
        // pattern from https://alexgarcia.xyz/sqlite-vec/rust.html
        #[allow(clippy::missing_transmute_annotations)]
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite3_vec_init as *const (),
            )));
        }
        tracing::debug!("sqlite-vec extension registered");
    });
}

/// Create the vec0 virtual table for chunk embeddings.
///
/// # Errors
///
/// Returns an error if the table cannot be created.
pub fn init_chunk_vectors(conn: &Connection, dimension: usize) -> Result<()> {
    let sql = format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS {CHUNK_VEC_TABLE} USING vec0(
            id INTEGER PRIMARY KEY,
            embedding FLOAT[{dimension}]
        )"
    );

    conn.execute(&sql, [])
        .map_err(|e| StorageError::Vector(format!("failed to create vec table: {e}")))?;

    tracing::debug!(dim = dimension, "Chunk vector table initialized");
    Ok(())
}

/// Insert an embedding keyed by chunk id.
///
/// # Errors
///
/// Returns an error if the insertion fails.
pub fn insert_vector(conn: &Connection, id: i64, embedding: &[f32]) -> Result<()> {
    let sql = format!("INSERT INTO {CHUNK_VEC_TABLE} (id, embedding) VALUES (?, ?)");
    conn.execute(&sql, rusqlite::params![id, vector_to_blob(embedding)])
        .map_err(|e| StorageError::Vector(format!("failed to insert vector: {e}")))?;
    Ok(())
}

/// Delete the embedding for a chunk id, if present.
///
/// # Errors
///
/// Returns an error if the deletion fails.
pub fn delete_vector(conn: &Connection, id: i64) -> Result<()> {
    let sql = format!("DELETE FROM {CHUNK_VEC_TABLE} WHERE id = ?");
    conn.execute(&sql, rusqlite::params![id])
        .map_err(|e| StorageError::Vector(format!("failed to delete vector: {e}")))?;
    Ok(())
}

/// Nearest-neighbor search over chunk embeddings.
///
/// Returns (id, distance) pairs sorted by distance ascending.
///
/// # Errors
///
/// Returns an error if the search fails.
pub fn search_similar(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Vec<(i64, f32)>> {
    let sql = format!(
        "SELECT id, distance
         FROM {CHUNK_VEC_TABLE}
         WHERE embedding MATCH ?
         ORDER BY distance
         LIMIT ?"
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StorageError::Vector(format!("failed to prepare search: {e}")))?;

    let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(
            rusqlite::params![vector_to_blob(query_embedding), limit_i64],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f32>(1)?)),
        )
        .map_err(|e| StorageError::Vector(format!("failed to execute search: {e}")))?;

    let mut matches = Vec::new();
    for row in rows {
        matches.push(row.map_err(|e| StorageError::Vector(format!("failed to read row: {e}")))?);
    }
    Ok(matches)
}

fn vector_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}
