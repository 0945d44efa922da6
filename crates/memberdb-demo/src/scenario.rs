//! Scripted walk-throughs of the data-access layer.

use memberdb_db::{ConnectionProvider, ProviderError};
use memberdb_repository::{MemberRepository, RepositoryError};
use memberdb_types::Member;
use serde::Serialize;
use thiserror::Error;

/// What the CRUD scenario observed at each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Member returned by `save`.
    pub saved: Member,
    /// Member read back right after `save`.
    pub found: Member,
    /// Rows affected by `update`.
    pub update_result_size: usize,
    /// Member read back after `update`.
    pub updated: Member,
    /// Message of the not-found error raised after `delete`.
    pub not_found_message: String,
}

/// Errors that stop the CRUD scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A repository call failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A read-back did not match what was written.
    #[error("{step}: expected {expected}, found {found}")]
    Mismatch {
        /// The step whose read-back disagreed.
        step: &'static str,
        /// What was written.
        expected: String,
        /// What was read.
        found: String,
    },

    /// The member was still readable after `delete`.
    #[error("member {member_id} still present after delete")]
    NotDeleted {
        /// The member that survived.
        member_id: String,
    },
}

/// Runs save, find, update, find, delete, find against `repository`.
///
/// The last lookup must fail with not-found; its message is captured in the
/// report.
///
/// # Errors
///
/// Returns [`ScenarioError::Repository`] if any call fails unexpectedly, or a
/// mismatch variant if a read-back disagrees with the preceding write.
pub fn run_crud_scenario<P: ConnectionProvider>(
    repository: &MemberRepository<P>,
    member: Member,
    updated_money: i32,
) -> Result<ScenarioReport, ScenarioError> {
    let member_id = member.member_id.clone();

    let saved = repository.save(member.clone())?;

    let found = repository.find_by_id(&member_id)?;
    tracing::info!(%found, equal = found == member, "read back saved member");
    if found != member {
        return Err(ScenarioError::Mismatch {
            step: "find_by_id",
            expected: member.to_string(),
            found: found.to_string(),
        });
    }

    let update_result_size = repository.update(&member_id, updated_money)?;
    let updated = repository.find_by_id(&member_id)?;
    if updated.money != updated_money {
        return Err(ScenarioError::Mismatch {
            step: "update",
            expected: updated_money.to_string(),
            found: updated.money.to_string(),
        });
    }

    repository.delete(&member_id)?;
    let not_found_message = match repository.find_by_id(&member_id) {
        Err(e) if e.is_not_found() => e.to_string(),
        Err(e) => return Err(e.into()),
        Ok(still_there) => {
            return Err(ScenarioError::NotDeleted {
                member_id: still_there.member_id,
            })
        }
    };

    Ok(ScenarioReport {
        saved,
        found,
        update_result_size,
        updated,
        not_found_message,
    })
}

/// Acquires `count` connections from `provider` and holds all of them.
///
/// Against a pool smaller than `count` this blocks for the pool's checkout
/// timeout and then fails.
///
/// # Errors
///
/// Returns the first [`ProviderError`]; connections acquired before it are
/// released.
pub fn acquire_connections<P: ConnectionProvider>(
    provider: &P,
    count: usize,
) -> Result<Vec<P::Connection>, ProviderError> {
    (0..count)
        .map(|n| -> Result<P::Connection, ProviderError> {
            let conn = provider.get_connection()?;
            tracing::info!(
                n,
                class = std::any::type_name::<P::Connection>(),
                "acquired connection"
            );
            Ok(conn)
        })
        .collect()
}
