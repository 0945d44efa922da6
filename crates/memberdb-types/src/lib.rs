//! Shared domain types for the memberdb workspace.
//!
//! The only entity is [`Member`]: a string-keyed account with an integer
//! balance. It is stored in the `member` table as `(member_id, money)`.
//! Every other crate depends on this one for the entity definition so the
//! row mapping lives in exactly one shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A member account row.
///
/// Equality is field-wise: two members are equal when both the identifier
/// and the balance match, regardless of where each value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier. Immutable once the row is persisted.
    pub member_id: String,
    /// Account balance. No range is enforced here or by the schema.
    pub money: i32,
}

impl Member {
    /// Creates a member that has not been persisted yet.
    pub fn new(member_id: impl Into<String>, money: i32) -> Self {
        Self {
            member_id: member_id.into(),
            money,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Member(memberId={}, money={})", self.member_id, self.money)
    }
}
