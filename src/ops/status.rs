/// Handler for user-submitted status changes
///
/// Applies the streak effect table to one habit, keyed by (user, title). The
/// read-apply-write cycle runs under the store's version guard so two
/// concurrent updates to the same habit produce exactly one increment each,
/// never a lost update.

use chrono::Utc;
use serde::Deserialize;
use crate::domain::{streak, Habit, HabitStatus, UserId};
use crate::ops::EngineError;
use crate::storage::{HabitStore, StorageError};

/// How many times a lost guarded write is retried before giving up
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Parameters for a status change request
#[derive(Debug, Clone, Deserialize)]
pub struct StatusParams {
    pub user_id: UserId,
    pub title: String,
    /// New status, case-insensitive: "completed", "skipped" or "active"
    pub status: String,
}

/// Apply a status change to the habit identified by (user, title)
///
/// Returns the habit as persisted. Malformed input is a validation error and
/// nothing is written; an unknown (user, title) pair is a not-found error.
pub fn apply_status<S: HabitStore>(
    store: &S,
    params: StatusParams,
) -> Result<Habit, EngineError> {
    if params.title.trim().is_empty() {
        return Err(EngineError::Validation(
            "Habit title is required".to_string(),
        ));
    }
    let new_status = HabitStatus::parse(&params.status)?;

    let now = Utc::now();

    for attempt in 0..MAX_WRITE_ATTEMPTS {
        let mut habit = store.find_by_title(params.user_id, &params.title)?;
        let prior_version = habit.version;

        streak::apply_status(&mut habit, new_status, now);

        match store.update_habit_guarded(&habit, prior_version) {
            Ok(()) => {
                habit.version = prior_version + 1;
                tracing::debug!(
                    "Status {} applied to habit {} (streak {})",
                    new_status.as_str(),
                    habit.id,
                    habit.streak_count
                );
                return Ok(habit);
            }
            Err(StorageError::VersionConflict { .. }) => {
                tracing::warn!(
                    "Status update on habit '{}' lost write race (attempt {}), retrying",
                    params.title,
                    attempt + 1
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(EngineError::Conflict)
}
