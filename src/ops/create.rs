/// Habit and ledger CRUD the engine needs around its core operations
///
/// The wider backend owns most record CRUD; these are the pieces the streak
/// engine's callers use directly: creating a habit (or provisional task),
/// fetching one by its alternate key, deleting one, and seeding a user ledger.

use chrono::Utc;
use serde::Deserialize;
use crate::domain::{Frequency, Habit, HabitId, HabitType, User, UserId};
use crate::ops::EngineError;
use crate::storage::HabitStore;

/// Parameters for creating a habit
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHabitParams {
    pub user_id: UserId,
    pub title: String,
    /// "daily", "weekly" or "monthly", case-insensitive
    pub frequency: String,
    /// "good" or "bad", case-insensitive
    pub habit_type: String,
    /// True to create a provisional task that promotes after a success run
    #[serde(default)]
    pub is_task: bool,
}

/// Create a new habit starting in the `Active` state with zero streaks
pub fn create_habit<S: HabitStore>(
    store: &S,
    params: CreateHabitParams,
) -> Result<Habit, EngineError> {
    let frequency = Frequency::parse(&params.frequency)?;
    let habit_type = HabitType::parse(&params.habit_type)?;

    let habit = Habit::new(
        params.user_id,
        params.title,
        frequency,
        habit_type,
        params.is_task,
        Utc::now(),
    )?;

    store.create_habit(&habit)?;
    Ok(habit)
}

/// Fetch a habit by its (user, title) alternate key, without reconciliation
pub fn get_habit<S: HabitStore>(
    store: &S,
    user_id: UserId,
    title: &str,
) -> Result<Habit, EngineError> {
    Ok(store.find_by_title(user_id, title)?)
}

/// Delete a habit by id
pub fn delete_habit<S: HabitStore>(
    store: &S,
    user_id: UserId,
    habit_id: HabitId,
) -> Result<(), EngineError> {
    store.delete_habit(user_id, habit_id)?;
    Ok(())
}

/// Seed a user's points ledger
///
/// The wider backend owns user registration; the engine only needs the ledger
/// row to exist before habits reference it.
pub fn register_user<S: HabitStore>(
    store: &S,
    user_id: UserId,
    initial_points: u32,
) -> Result<User, EngineError> {
    let user = User::new(user_id, initial_points);
    store.create_user(&user)?;
    Ok(user)
}
