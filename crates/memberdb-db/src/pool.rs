//! Connection pool creation and per-connection SQLite setup.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use thiserror::Error;

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,

    /// How long a pool checkout may wait for a free connection, in
    /// milliseconds. Ignored by direct connections.
    pub connection_timeout_ms: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
            connection_timeout_ms: 30_000,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),

    /// A setting the pool cannot be built with.
    #[error("invalid pool settings: {0}")]
    InvalidSettings(&'static str),
}

/// Flags used for every connection, pooled or direct.
pub(crate) fn open_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX
}

/// Applies WAL mode, foreign keys and the busy timeout to a fresh connection.
pub(crate) fn init_connection(
    conn: &Connection,
    settings: DbRuntimeSettings,
) -> Result<(), rusqlite::Error> {
    // In-memory databases report "memory", which is acceptable.
    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if journal_mode != "wal" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!(
                "failed to set WAL journal mode, got: {}",
                journal_mode
            )),
        ));
    }
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};",
        settings.busy_timeout_ms
    ))
}

/// Creates a new SQLite connection pool with WAL mode and foreign keys enabled.
///
/// # Arguments
///
/// * `db_path` - Path to the SQLite database file. `:memory:` works, but every
///   pooled connection then sees its own private database.
/// * `settings` - Pool size, checkout timeout and busy timeout.
///
/// # Errors
///
/// Returns `PoolError::InvalidSettings` if `pool_max_size` or
/// `connection_timeout_ms` is zero, or `PoolError::PoolInit` if the
/// connection pool cannot be created.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    // r2d2 asserts on both of these instead of returning an error.
    if settings.pool_max_size == 0 {
        return Err(PoolError::InvalidSettings("pool_max_size must be positive"));
    }
    if settings.connection_timeout_ms == 0 {
        return Err(PoolError::InvalidSettings(
            "connection_timeout_ms must be positive",
        ));
    }

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(open_flags())
        .with_init(move |conn| init_connection(conn, settings));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .connection_timeout(Duration::from_millis(settings.connection_timeout_ms))
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        max_size = settings.pool_max_size,
        connection_timeout_ms = settings.connection_timeout_ms,
        "created database connection pool"
    );

    Ok(pool)
}
