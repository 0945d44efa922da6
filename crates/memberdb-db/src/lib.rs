//! Database layer for memberdb.
//!
//! Provides the [`ConnectionProvider`] abstraction that data-access code is
//! written against, plus its two implementations:
//!
//! - [`DirectProvider`] opens a fresh SQLite connection on every request.
//! - [`PooledProvider`] checks connections out of an `r2d2` pool and returns
//!   them when dropped.
//!
//! Both initialize connections the same way (WAL journal, foreign keys, busy
//! timeout), so code that works against one works against the other. The
//! crate also knows how to create the `member` table.

mod pool;
mod provider;
mod schema;

pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use provider::{
    ConnectionProvider, DirectConnection, DirectProvider, PooledProvider, ProviderError,
};
pub use schema::ensure_schema;
