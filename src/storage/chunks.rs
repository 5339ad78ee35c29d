//! Chunk row operations.
//!
//! One row per indexed path. Upserts replace on path conflict so the
//! store never holds two rows for the same file; the paired embedding in
//! the vec0 table is replaced alongside the row.

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{now_unix, IndexedChunk};
use super::vector::{delete_vector, insert_vector};
use crate::error::StorageError;
use crate::Result;

/// Upsert a chunk and its embedding, keyed on path equality.
///
/// Returns the chunk's row id.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_chunk(conn: &Connection, chunk: &IndexedChunk) -> Result<i64> {
    conn.execute(
        "INSERT INTO chunks (file_path, content, indexed_at)
         VALUES (?, ?, ?)
         ON CONFLICT(file_path) DO UPDATE SET
             content = excluded.content,
             indexed_at = excluded.indexed_at",
        params![chunk.path, chunk.content, now_unix()],
    )
    .map_err(|e| StorageError::Database(format!("failed to upsert chunk: {e}")))?;

    // last_insert_rowid is unreliable on the DO UPDATE path, so look the
    // row id up by path.
    let id: i64 = conn
        .query_row(
            "SELECT id FROM chunks WHERE file_path = ?",
            [&chunk.path],
            |row| row.get(0),
        )
        .map_err(|e| StorageError::Database(format!("failed to resolve chunk id: {e}")))?;

    delete_vector(conn, id)?;
    insert_vector(conn, id, &chunk.embedding)?;

    tracing::trace!(id, path = %chunk.path, "Upserted chunk");
    Ok(id)
}

/// Delete the chunk (and embedding) for a path. Missing paths are a no-op.
///
/// Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_chunk_by_path(conn: &Connection, path: &str) -> Result<bool> {
    let id: Option<i64> = conn
        .query_row("SELECT id FROM chunks WHERE file_path = ?", [path], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| StorageError::Database(format!("failed to look up chunk: {e}")))?;

    let Some(id) = id else {
        return Ok(false);
    };

    delete_vector(conn, id)?;
    conn.execute("DELETE FROM chunks WHERE id = ?", [id])
        .map_err(|e| StorageError::Database(format!("failed to delete chunk: {e}")))?;

    tracing::trace!(id, path, "Deleted chunk");
    Ok(true)
}

/// Count indexed chunks.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_chunks(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
        .map_err(|e| StorageError::Database(format!("failed to count chunks: {e}")).into())
}

/// List all indexed paths, sorted.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_indexed_paths(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT file_path FROM chunks ORDER BY file_path")
        .map_err(|e| StorageError::Database(format!("failed to prepare query: {e}")))?;

    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|e| StorageError::Database(format!("failed to list paths: {e}")))?;

    let mut paths = Vec::new();
    for row in rows {
        paths.push(row.map_err(|e| StorageError::Database(format!("failed to read row: {e}")))?);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::vector::{init_chunk_vectors, init_sqlite_vec};
    use crate::storage::{migrate, Database};

    fn setup() -> Database {
        init_sqlite_vec();
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            migrate(conn)?;
            init_chunk_vectors(conn, 4)
        })
        .unwrap();
        db
    }

    fn chunk(path: &str, content: &str) -> IndexedChunk {
        IndexedChunk::new(path, content, vec![0.1, 0.2, 0.3, 0.4])
    }

    #[test]
    fn test_upsert_inserts() {
        let db = setup();
        db.with_conn(|conn| {
            upsert_chunk(conn, &chunk("main.py", "print('a')"))?;
            assert_eq!(count_chunks(conn)?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_upsert_replaces_on_path_conflict() {
        let db = setup();
        db.with_conn(|conn| {
            let id1 = upsert_chunk(conn, &chunk("main.py", "old"))?;
            let id2 = upsert_chunk(conn, &chunk("main.py", "new"))?;
            assert_eq!(id1, id2);
            assert_eq!(count_chunks(conn)?, 1);

            let content: String = conn
                .query_row(
                    "SELECT content FROM chunks WHERE file_path = ?",
                    ["main.py"],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(content, "new");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_by_path() {
        let db = setup();
        db.with_conn(|conn| {
            upsert_chunk(conn, &chunk("utils.py", "def add(): pass"))?;
            assert!(delete_chunk_by_path(conn, "utils.py")?);
            assert!(!delete_chunk_by_path(conn, "utils.py")?);
            assert_eq!(count_chunks(conn)?, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_indexed_paths_sorted() {
        let db = setup();
        db.with_conn(|conn| {
            upsert_chunk(conn, &chunk("b.py", "x"))?;
            upsert_chunk(conn, &chunk("a.py", "y"))?;
            assert_eq!(list_indexed_paths(conn)?, vec!["a.py", "b.py"]);
            Ok(())
        })
        .unwrap();
    }
}
