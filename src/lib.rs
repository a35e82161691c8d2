/// Public library interface for the Rise habit streak engine
///
/// This module exports the engine facade and the public domain types that the
/// CLI binary and tests use.

use std::path::PathBuf;

// Internal modules
mod domain;
mod ops;
mod storage;

// Re-export public modules and types
pub use domain::*;
pub use ops::{
    apply_status, check_reset, create_habit, delete_habit, get_habit, reconcile_and_list,
    register_user, restore_streak, CheckResetParams, CreateHabitParams, EngineError, ListParams,
    PolicyRejection, RestoreOutcome, RestoreParams, StatusParams,
};
pub use storage::{HabitStore, SqliteStore, StorageError};

/// The habit streak engine over a SQLite store
///
/// Owns the store and exposes the engine's operations: lazy
/// reconcile-and-list, status updates, streak restoration, and the habit CRUD
/// around them. All operations are synchronous request/response; there is no
/// background scheduler.
pub struct HabitEngine {
    store: SqliteStore,
}

impl HabitEngine {
    /// Open (or create) the database at `db_path` and run migrations
    pub fn new(db_path: PathBuf) -> Result<Self, EngineError> {
        tracing::info!("Initializing habit engine with database: {:?}", db_path);
        let store = SqliteStore::new(db_path).map_err(EngineError::from)?;
        Ok(Self { store })
    }

    /// List a user's habits after rolling each into the current period
    pub fn reconcile_and_list(&self, params: ListParams) -> Result<Vec<Habit>, EngineError> {
        ops::reconcile_and_list(&self.store, params)
    }

    /// Run the rollover transition on one habit explicitly
    pub fn check_reset(&self, params: CheckResetParams) -> Result<Habit, EngineError> {
        ops::check_reset(&self.store, params)
    }

    /// Apply a user-submitted status change
    pub fn apply_status(&self, params: StatusParams) -> Result<Habit, EngineError> {
        ops::apply_status(&self.store, params)
    }

    /// Spend points to repair a streak broken 2-3 periods ago
    pub fn restore_streak(&self, params: RestoreParams) -> Result<RestoreOutcome, EngineError> {
        ops::restore_streak(&self.store, params)
    }

    /// Create a habit or provisional task
    pub fn create_habit(&self, params: CreateHabitParams) -> Result<Habit, EngineError> {
        ops::create_habit(&self.store, params)
    }

    /// Fetch a habit by (user, title) without reconciliation
    pub fn get_habit(&self, user_id: UserId, title: &str) -> Result<Habit, EngineError> {
        ops::get_habit(&self.store, user_id, title)
    }

    /// Delete a habit by id
    pub fn delete_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<(), EngineError> {
        ops::delete_habit(&self.store, user_id, habit_id)
    }

    /// Seed a user's points ledger
    pub fn register_user(&self, user_id: UserId, initial_points: u32) -> Result<User, EngineError> {
        ops::register_user(&self.store, user_id, initial_points)
    }

    /// Fetch a user's points balance
    pub fn get_user(&self, user_id: UserId) -> Result<User, EngineError> {
        Ok(self.store.get_user(user_id)?)
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }
}
