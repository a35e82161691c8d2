/// User points ledger view
///
/// The engine only ever sees this slice of the user record: the balance it
/// debits when restoring a streak. The rest of the user profile is owned by
/// other parts of the backend.

use serde::{Deserialize, Serialize};
use crate::domain::UserId;

/// The points ledger slice of a user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Non-negative balance; the engine debits it and never lets it go below zero
    pub total_points: u32,
}

impl User {
    pub fn new(id: UserId, total_points: u32) -> Self {
        Self { id, total_points }
    }
}
