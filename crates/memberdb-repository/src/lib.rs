//! Member data access for memberdb.
//!
//! [`MemberRepository`] maps four operations onto parameterized SQL against
//! the `member` table. It owns no connection: every call acquires one from
//! the injected [`ConnectionProvider`] and releases it before returning.
//!
//! ```rust,ignore
//! use memberdb_db::{create_pool, DbRuntimeSettings, PooledProvider};
//! use memberdb_repository::MemberRepository;
//! use memberdb_types::Member;
//!
//! let pool = create_pool("member.db", DbRuntimeSettings::default())?;
//! let repository = MemberRepository::new(PooledProvider::new(pool));
//!
//! repository.save(Member::new("memberVo", 10_000))?;
//! repository.update("memberVo", 20_000)?;
//! assert_eq!(repository.find_by_id("memberVo")?.money, 20_000);
//! ```

mod error;
mod repository;

pub use error::RepositoryError;
pub use repository::MemberRepository;
