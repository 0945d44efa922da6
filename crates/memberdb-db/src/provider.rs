//! Connection providers.
//!
//! A [`ConnectionProvider`] hands out one usable SQLite connection per call.
//! Releasing the connection is dropping it: a [`DirectConnection`] closes its
//! handle, a pooled connection goes back to the pool. Consumers are generic
//! over the provider, so swapping [`DirectProvider`] for [`PooledProvider`]
//! does not touch their code.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use thiserror::Error;

use crate::pool::{init_connection, open_flags, DbPool, DbRuntimeSettings};

/// Errors that can occur while acquiring a connection.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Opening or initializing a direct connection failed.
    #[error("failed to open database connection: {0}")]
    Open(#[from] rusqlite::Error),

    /// The pool could not supply a connection before its checkout timeout.
    #[error("failed to check out pooled connection: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Something that can produce a usable database connection on request.
pub trait ConnectionProvider {
    /// The connection handle. Dropping it releases the connection.
    type Connection: Deref<Target = Connection>;

    /// Acquires a connection. May block (pooled) or fail.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if no connection could be acquired.
    fn get_connection(&self) -> Result<Self::Connection, ProviderError>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    type Connection = P::Connection;

    fn get_connection(&self) -> Result<Self::Connection, ProviderError> {
        (**self).get_connection()
    }
}

/// Opens a brand-new connection to the database file on every call.
#[derive(Debug)]
pub struct DirectProvider {
    db_path: String,
    settings: DbRuntimeSettings,
    opened: AtomicU64,
}

impl DirectProvider {
    /// Creates a provider for the database at `db_path`. Nothing is opened
    /// until the first [`ConnectionProvider::get_connection`] call.
    pub fn new(db_path: impl Into<String>, settings: DbRuntimeSettings) -> Self {
        Self {
            db_path: db_path.into(),
            settings,
            opened: AtomicU64::new(0),
        }
    }

    /// Path of the database file this provider opens.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Number of connections opened so far.
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }
}

impl ConnectionProvider for DirectProvider {
    type Connection = DirectConnection;

    fn get_connection(&self) -> Result<DirectConnection, ProviderError> {
        let conn = Connection::open_with_flags(&self.db_path, open_flags())?;
        init_connection(&conn, self.settings)?;

        let connection_no = self.opened.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            connection_no,
            path = %self.db_path,
            "opened direct connection"
        );

        Ok(DirectConnection {
            conn,
            connection_no,
        })
    }
}

/// A connection owned by exactly one caller. Closed on drop.
#[derive(Debug)]
pub struct DirectConnection {
    conn: Connection,
    connection_no: u64,
}

impl DirectConnection {
    /// Sequence number assigned by the provider that opened this connection.
    pub fn connection_no(&self) -> u64 {
        self.connection_no
    }
}

impl Deref for DirectConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for DirectConnection {
    fn drop(&mut self) {
        tracing::debug!(connection_no = self.connection_no, "closing direct connection");
    }
}

/// Checks connections out of an `r2d2` pool.
#[derive(Clone)]
pub struct PooledProvider {
    pool: DbPool,
}

impl std::fmt::Debug for PooledProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledProvider")
            .field("max_size", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}

impl PooledProvider {
    /// Wraps an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl From<DbPool> for PooledProvider {
    fn from(pool: DbPool) -> Self {
        Self::new(pool)
    }
}

impl ConnectionProvider for PooledProvider {
    type Connection = PooledConnection<SqliteConnectionManager>;

    fn get_connection(&self) -> Result<Self::Connection, ProviderError> {
        let conn = self.pool.get()?;
        let state = self.pool.state();
        tracing::info!(
            connections = state.connections,
            idle = state.idle_connections,
            max_size = self.pool.max_size(),
            "checked out pooled connection"
        );
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;

    fn temp_db(dir: &tempfile::TempDir) -> String {
        dir.path()
            .join("provider.db")
            .to_str()
            .expect("temp path should be utf-8")
            .to_string()
    }

    #[test]
    fn direct_provider_opens_a_new_connection_each_call() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let provider = DirectProvider::new(temp_db(&dir), DbRuntimeSettings::default());
        assert_eq!(provider.opened(), 0);

        let first = provider.get_connection().expect("first connection");
        let second = provider.get_connection().expect("second connection");

        assert_eq!(first.connection_no(), 1);
        assert_eq!(second.connection_no(), 2);
        assert_eq!(provider.opened(), 2);
    }

    #[test]
    fn direct_connections_share_the_database_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let provider = DirectProvider::new(temp_db(&dir), DbRuntimeSettings::default());

        {
            let conn = provider.get_connection().expect("writer connection");
            conn.execute_batch("CREATE TABLE marker (v INTEGER); INSERT INTO marker VALUES (7);")
                .expect("should write marker");
        }

        let conn = provider.get_connection().expect("reader connection");
        let v: i64 = conn
            .query_row("SELECT v FROM marker", [], |row| row.get(0))
            .expect("should read marker");
        assert_eq!(v, 7);
    }

    #[test]
    fn direct_provider_reports_open_failure() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let missing = dir.path().join("no-such-dir").join("x.db");
        let provider = DirectProvider::new(
            missing.to_str().expect("temp path should be utf-8"),
            DbRuntimeSettings::default(),
        );

        let err = provider.get_connection().expect_err("open should fail");
        assert!(matches!(err, ProviderError::Open(_)), "got {err:?}");
        assert_eq!(provider.opened(), 0);
    }

    #[test]
    fn pooled_connection_returns_to_pool_on_drop() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let settings = DbRuntimeSettings {
            pool_max_size: 2,
            ..DbRuntimeSettings::default()
        };
        let provider = PooledProvider::new(create_pool(&temp_db(&dir), settings).expect("pool"));

        let conn = provider.get_connection().expect("checkout");
        assert_eq!(provider.pool().state().idle_connections, 1);
        drop(conn);
        assert_eq!(provider.pool().state().idle_connections, 2);
    }

    #[test]
    fn pooled_provider_times_out_when_exhausted() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let settings = DbRuntimeSettings {
            pool_max_size: 2,
            connection_timeout_ms: 100,
            ..DbRuntimeSettings::default()
        };
        let provider = PooledProvider::new(create_pool(&temp_db(&dir), settings).expect("pool"));

        let _a = provider.get_connection().expect("first checkout");
        let _b = provider.get_connection().expect("second checkout");
        let err = match provider.get_connection() {
            Ok(_) => panic!("third checkout should time out"),
            Err(e) => e,
        };
        assert!(matches!(err, ProviderError::Pool(_)), "got {err:?}");
    }

    #[test]
    fn borrowed_provider_is_a_provider() {
        fn acquire<P: ConnectionProvider>(provider: P) -> i64 {
            let conn = provider.get_connection().expect("connection");
            conn.query_row("SELECT 1", [], |row| row.get(0))
                .expect("select 1")
        }

        let dir = tempfile::tempdir().expect("should create temp dir");
        let provider = DirectProvider::new(temp_db(&dir), DbRuntimeSettings::default());
        assert_eq!(acquire(&provider), 1);
        assert_eq!(provider.opened(), 1);
    }
}
