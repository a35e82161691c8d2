/// Handlers for reading habits with lazy period reconciliation
///
/// There is no background scheduler: period rollover is detected here, when
/// habits are read, or when an explicit check is requested. The transition
/// itself is `domain::streak::reconcile`; this layer persists what changed.

use chrono::Utc;
use serde::Deserialize;
use crate::domain::{streak, Frequency, Habit, UserId};
use crate::ops::EngineError;
use crate::storage::{HabitStore, StorageError};

/// Parameters for listing a user's habits
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    pub user_id: UserId,
    /// Optional equality filter on frequency
    pub frequency: Option<Frequency>,
}

/// List a user's habits, rolling each one over into the current period first
///
/// Habits already `Active` this period come back untouched (the transition is
/// a no-op for them), so repeated reads never double-penalize. A record whose
/// guarded write loses its race was rolled over by someone else concurrently;
/// we take their state rather than retrying ours.
pub fn reconcile_and_list<S: HabitStore>(
    store: &S,
    params: ListParams,
) -> Result<Vec<Habit>, EngineError> {
    let now = Utc::now();
    let habits = store.list_habits(params.user_id, params.frequency)?;

    let mut listed = Vec::with_capacity(habits.len());
    for mut habit in habits {
        let prior_version = habit.version;
        if streak::reconcile(&mut habit, now) {
            match store.update_habit_guarded(&habit, prior_version) {
                Ok(()) => habit.version = prior_version + 1,
                Err(StorageError::VersionConflict { .. }) => {
                    tracing::debug!(
                        "Habit {} rolled over concurrently, reloading",
                        habit.id
                    );
                    match store.get_habit(params.user_id, habit.id) {
                        Ok(current) => habit = current,
                        // Deleted while we were listing; drop it rather than
                        // failing the whole read.
                        Err(StorageError::HabitNotFound { .. }) => {
                            tracing::debug!(
                                "Habit {} deleted concurrently, omitting from listing",
                                habit.id
                            );
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        listed.push(habit);
    }

    Ok(listed)
}

/// Parameters for an explicit check-and-reset of a single habit
#[derive(Debug, Clone, Deserialize)]
pub struct CheckResetParams {
    pub user_id: UserId,
    pub title: String,
}

/// Run the rollover transition on one habit, by its (user, title) key
pub fn check_reset<S: HabitStore>(
    store: &S,
    params: CheckResetParams,
) -> Result<Habit, EngineError> {
    let now = Utc::now();
    let mut habit = store.find_by_title(params.user_id, &params.title)?;

    let prior_version = habit.version;
    if streak::reconcile(&mut habit, now) {
        match store.update_habit_guarded(&habit, prior_version) {
            Ok(()) => habit.version = prior_version + 1,
            Err(StorageError::VersionConflict { .. }) => {
                habit = store.find_by_title(params.user_id, &params.title)?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(habit)
}
