//! Error types for member data access.

use memberdb_db::ProviderError;

/// Errors returned by [`MemberRepository`](crate::MemberRepository).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No connection could be acquired from the provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Preparing or executing a statement failed.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    /// `find_by_id` matched no row.
    #[error("member not found: memberId = {member_id}")]
    NotFound {
        /// The identifier that was looked up.
        member_id: String,
    },
}

impl RepositoryError {
    /// Returns `true` for [`RepositoryError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
