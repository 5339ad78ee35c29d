//! Watermark metadata.
//!
//! The watermark is the last revision fully reflected in the index. It
//! lives in the single-row `index_meta` table and is only ever written as
//! part of a successful batch apply.

use rusqlite::Connection;

use super::models::now_unix;
use crate::error::StorageError;
use crate::Result;

/// Read the stored watermark. `None` means no prior successful sync.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_watermark(conn: &Connection) -> Result<Option<String>> {
    conn.query_row(
        "SELECT last_commit FROM index_meta WHERE id = 1",
        [],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::Database(format!("failed to read watermark: {e}")).into())
}

/// Write the watermark. Callers must invoke this inside the same
/// transaction as the chunk mutations it accounts for.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn set_watermark(conn: &Connection, revision: &str) -> Result<()> {
    conn.execute(
        "UPDATE index_meta SET last_commit = ?, indexed_at = ? WHERE id = 1",
        rusqlite::params![revision, now_unix()],
    )
    .map_err(|e| StorageError::Database(format!("failed to write watermark: {e}")))?;
    Ok(())
}
