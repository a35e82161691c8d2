/// Engine operations exposed to callers
///
/// This module contains the handlers an outer transport (HTTP, CLI) calls to
/// interact with the streak engine: reconcile-and-list, status updates, streak
/// restoration, and the habit CRUD the engine itself needs. Each handler is a
/// free function generic over the storage trait, with its own params struct.

pub mod create;
pub mod list;
pub mod restore;
pub mod status;

// Re-export handler functions for easy access
pub use create::*;
pub use list::*;
pub use restore::*;
pub use status::*;

use thiserror::Error;
use crate::domain::DomainError;
use crate::storage::StorageError;

/// Expected business rejections, distinguishable by kind for the caller
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRejection {
    #[error("No completion history to restore from")]
    NoCompletionHistory,

    #[error("Grace period expired: {elapsed} whole periods elapsed, restorable window is 2-3")]
    GracePeriodExpired { elapsed: i64 },

    #[error("Insufficient points: restoration costs {required}, balance is {available}")]
    InsufficientPoints { required: u32, available: u32 },
}

/// Errors surfaced by engine operations
///
/// The taxonomy the presentation layer switches on: validation and not-found
/// mean no mutation happened; policy rejections are expected outcomes, not
/// faults; conflict means a guarded write lost its race after retries.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {key}")]
    NotFound { key: String },

    #[error(transparent)]
    Policy(#[from] PolicyRejection),

    #[error("Concurrent update conflict, retry the request")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::HabitNotFound { key } => EngineError::NotFound { key },
            StorageError::UserNotFound { user_id } => EngineError::NotFound {
                key: user_id.to_string(),
            },
            StorageError::DuplicateHabit { title } => {
                EngineError::Validation(format!("Habit '{}' already exists", title))
            }
            StorageError::VersionConflict { .. } | StorageError::PointsDebitFailed { .. } => {
                EngineError::Conflict
            }
            other => EngineError::Storage(other),
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        EngineError::Validation(err.to_string())
    }
}
