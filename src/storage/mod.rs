/// Storage layer for persisting habit and user records
///
/// This module handles all database operations using SQLite. Handlers express
/// every access as equality filters on user, title/id, and frequency; there are
/// no raw queries above this layer.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;
use crate::domain::{Frequency, Habit, HabitId, User, UserId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {key}")]
    HabitNotFound { key: String },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Habit already exists for user: {title}")]
    DuplicateHabit { title: String },

    #[error("Concurrent update on habit {habit_id}: version {expected} is stale")]
    VersionConflict { habit_id: HabitId, expected: i64 },

    #[error("Points debit failed for user {user_id}: balance below cost")]
    PointsDebitFailed { user_id: UserId },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Storage interface for habit records and the user points ledger
///
/// All habit writes are guarded: the caller passes the version it read and the
/// write only lands if no one else wrote in between. This is the
/// compare-and-swap that makes concurrent status updates lose at most a retry,
/// never an increment.
pub trait HabitStore {
    /// Insert a new habit record
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Look a habit up by id, scoped to its owner
    fn get_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<Habit, StorageError>;

    /// Look a habit up by the (user, title) alternate key
    fn find_by_title(&self, user_id: UserId, title: &str) -> Result<Habit, StorageError>;

    /// List a user's habits, optionally filtered by frequency
    fn list_habits(
        &self,
        user_id: UserId,
        frequency: Option<Frequency>,
    ) -> Result<Vec<Habit>, StorageError>;

    /// Write a habit back if its stored version still equals `expected_version`
    ///
    /// Bumps the version on success; fails with `VersionConflict` if another
    /// writer got there first.
    fn update_habit_guarded(
        &self,
        habit: &Habit,
        expected_version: i64,
    ) -> Result<(), StorageError>;

    /// Delete a habit by id, scoped to its owner
    fn delete_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<(), StorageError>;

    /// Insert a user ledger record
    fn create_user(&self, user: &User) -> Result<(), StorageError>;

    /// Fetch a user's points ledger
    fn get_user(&self, user_id: UserId) -> Result<User, StorageError>;

    /// Debit the user's points and write the restored habit in one transaction
    ///
    /// Either both writes land or neither does; the ledger can never end up
    /// debited without the streak restored. The debit carries its own balance
    /// guard so the ledger never goes negative, and the habit write is guarded
    /// by `expected_version` like any other. Returns the remaining balance.
    fn debit_and_restore(
        &self,
        habit: &Habit,
        expected_version: i64,
        cost: u32,
    ) -> Result<u32, StorageError>;
}
