/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a tracked habit
/// (or provisional task) belonging to one user, along with its validation rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, Frequency, HabitId, HabitStatus, HabitType, UserId};

/// A habit the user wants to keep (good) or break (bad)
///
/// This is the record the streak engine operates on. The streak fields are only
/// mutated through the status handler, the rollover transition, and the
/// restoration handler, which keep `streak_count <= best_streak` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Owning user
    pub user_id: UserId,
    /// Display name; with `user_id` it forms the alternate lookup key
    pub title: String,
    /// Which calendar period one qualifying action is expected in
    pub frequency: Frequency,
    /// Good ("do more") or bad ("do less") polarity
    pub habit_type: HabitType,
    /// State within the current period; `Active` is both initial and reset state
    pub status: HabitStatus,
    /// Consecutive qualifying periods so far
    pub streak_count: u32,
    /// High-water mark of `streak_count`, never lowered
    pub best_streak: u32,
    /// True while this is still a provisional one-off task; flips to false
    /// permanently once the streak reaches the promotion threshold
    pub is_task: bool,
    /// Last time a qualifying action was recorded (completion for good habits,
    /// resisting for bad habits)
    pub last_completed: Option<DateTime<Utc>>,
    /// Last period-boundary touch; drives the "has a new period begun" check
    pub last_updated: Option<DateTime<Utc>>,
    /// Optimistic-concurrency token, bumped on every guarded write
    pub version: i64,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// New habits start `Active` with zero streaks and `last_updated` set to
    /// the creation instant so the first rollover check has a reference point.
    pub fn new(
        user_id: UserId,
        title: String,
        frequency: Frequency,
        habit_type: HabitType,
        is_task: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::validate_title(&title)?;

        Ok(Self {
            id: HabitId::new(),
            user_id,
            title,
            frequency,
            habit_type,
            status: HabitStatus::Active,
            streak_count: 0,
            best_streak: 0,
            is_task,
            last_completed: None,
            last_updated: Some(now),
            version: 0,
        })
    }

    /// Create a habit from existing data (used when loading from the database)
    ///
    /// This constructor assumes data is already validated and is mainly used
    /// by the storage layer when mapping rows back into the domain.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        user_id: UserId,
        title: String,
        frequency: Frequency,
        habit_type: HabitType,
        status: HabitStatus,
        streak_count: u32,
        best_streak: u32,
        is_task: bool,
        last_completed: Option<DateTime<Utc>>,
        last_updated: Option<DateTime<Utc>>,
        version: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            frequency,
            habit_type,
            status,
            streak_count,
            best_streak,
            is_task,
            last_completed,
            last_updated,
            version,
        }
    }

    /// Validate a habit title according to business rules
    pub fn validate_title(title: &str) -> Result<(), DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidTitle(
                "Habit title cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidTitle(
                "Habit title cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }
}
