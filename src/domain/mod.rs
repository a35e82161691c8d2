/// Domain module containing core business logic and data types
///
/// This module defines the Habit entity, the period calendar, and the pure
/// streak policy functions. Everything here is storage-agnostic; the handlers
/// in `ops` wire these functions to the record store.

pub mod calendar;
pub mod habit;
pub mod streak;
pub mod types;
pub mod user;

// Re-export public types for easy access
pub use habit::*;
pub use streak::{RestoreDenied, RESTORE_COST_PER_PERIOD, TASK_PROMOTION_THRESHOLD};
pub use types::*;
pub use user::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit title: {0}")]
    InvalidTitle(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid habit type: {0}")]
    InvalidHabitType(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),
}
