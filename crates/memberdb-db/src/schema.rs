//! The `member` table.
//!
//! The repository assumes the table exists. [`ensure_schema`] creates it when
//! it is missing and leaves an existing table alone.

use rusqlite::Connection;

const MEMBER_TABLE_SQL: &str = include_str!("schema.sql");

/// Creates the `member` table if it does not exist yet.
///
/// # Errors
///
/// Returns the underlying SQLite error if the statement fails.
pub fn ensure_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(MEMBER_TABLE_SQL)?;
    tracing::debug!("member table ready");
    Ok(())
}
