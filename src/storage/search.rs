//! Semantic search over indexed chunks.

use rusqlite::Connection;

use super::models::SearchHit;
use super::vector::search_similar;
use crate::error::StorageError;
use crate::Result;

/// Search for the files closest to a query embedding.
///
/// Returns hits sorted by distance ascending.
///
/// # Errors
///
/// Returns an error if the search fails.
pub fn search_by_embedding(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Vec<SearchHit>> {
    let candidates = search_similar(conn, query_embedding, limit)?;

    let mut hits = Vec::with_capacity(candidates.len());
    for (id, distance) in candidates {
        let path: String = conn
            .query_row("SELECT file_path FROM chunks WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .map_err(|e| StorageError::Database(format!("failed to resolve hit path: {e}")))?;
        hits.push(SearchHit { path, distance });
    }

    Ok(hits)
}
