//! The member repository.
//!
//! Each operation follows the same shape: acquire a connection, prepare a
//! statement, bind parameters, execute, and (for reads) walk a row cursor.
//! Those handles are plain locals, so they are released in reverse order
//! (cursor, statement, connection) whether the operation returns `Ok` or
//! bails out early with `?`.

use memberdb_db::ConnectionProvider;
use memberdb_types::Member;
use rusqlite::params;

use crate::error::RepositoryError;

const INSERT_SQL: &str = "insert into member(member_id, money) values (?1, ?2)";
const SELECT_SQL: &str = "select * from member where member_id = ?1";
const UPDATE_SQL: &str = "update member set money = ?1 where member_id = ?2";
const DELETE_SQL: &str = "delete from member where member_id = ?1";

/// CRUD access to the `member` table through an injected connection provider.
///
/// The repository holds nothing but the provider, so it is `Send + Sync`
/// whenever `P` is, and concurrent calls are as safe as concurrent
/// acquisition from `P`.
#[derive(Debug, Clone)]
pub struct MemberRepository<P> {
    provider: P,
}

impl<P: ConnectionProvider> MemberRepository<P> {
    /// Creates a repository that acquires connections from `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The injected connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Inserts a new member row and hands the member back.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the insert fails, for example
    /// on a duplicate `member_id`, or [`RepositoryError::Provider`] if no
    /// connection could be acquired.
    pub fn save(&self, member: Member) -> Result<Member, RepositoryError> {
        self.insert(&member)
            .map_err(|e| log_failure("save", &member.member_id, e))?;
        Ok(member)
    }

    /// Loads the member with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no row matches, or a
    /// provider/database error if the query itself fails.
    pub fn find_by_id(&self, member_id: &str) -> Result<Member, RepositoryError> {
        self.select(member_id)
            .map_err(|e| log_failure("find_by_id", member_id, e))
    }

    /// Sets the balance of the given member and returns the affected-row count.
    ///
    /// A count of zero (no such member) is not an error.
    ///
    /// # Errors
    ///
    /// Returns a provider/database error if the update cannot be executed.
    pub fn update(&self, member_id: &str, money: i32) -> Result<usize, RepositoryError> {
        self.update_money(member_id, money)
            .map_err(|e| log_failure("update", member_id, e))
    }

    /// Deletes the given member. Deleting a missing member is not an error.
    ///
    /// # Errors
    ///
    /// Returns a provider/database error if the delete cannot be executed.
    pub fn delete(&self, member_id: &str) -> Result<(), RepositoryError> {
        self.remove(member_id)
            .map_err(|e| log_failure("delete", member_id, e))
    }

    fn insert(&self, member: &Member) -> Result<(), RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(INSERT_SQL)?;
        stmt.execute(params![member.member_id, member.money])?;
        Ok(())
    }

    fn select(&self, member_id: &str) -> Result<Member, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(SELECT_SQL)?;
        let mut rows = stmt.query([member_id])?;

        // Single-row lookup: advance the cursor once.
        let member = match rows.next()? {
            Some(row) => Member {
                member_id: row.get("member_id")?,
                money: row.get("money")?,
            },
            None => {
                return Err(RepositoryError::NotFound {
                    member_id: member_id.to_string(),
                })
            }
        };
        Ok(member)
    }

    fn update_money(&self, member_id: &str, money: i32) -> Result<usize, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(UPDATE_SQL)?;
        let result_size = stmt.execute(params![money, member_id])?;
        tracing::info!(member_id, result_size, "updated member money");
        Ok(result_size)
    }

    fn remove(&self, member_id: &str) -> Result<(), RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(DELETE_SQL)?;
        let deleted = stmt.execute([member_id])?;
        tracing::debug!(member_id, deleted, "deleted member");
        Ok(())
    }

    fn connection(&self) -> Result<P::Connection, RepositoryError> {
        let conn = self.provider.get_connection()?;
        tracing::info!(
            class = std::any::type_name::<P::Connection>(),
            path = conn.path().unwrap_or(":memory:"),
            "get connection"
        );
        Ok(conn)
    }
}

/// Logs an underlying failure and hands the error back untouched.
/// `NotFound` is an expected outcome and is not logged.
fn log_failure(operation: &'static str, member_id: &str, err: RepositoryError) -> RepositoryError {
    if !err.is_not_found() {
        tracing::error!(operation, member_id, error = %err, "db error");
    }
    err
}
