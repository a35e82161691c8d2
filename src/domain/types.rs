/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like Frequency, HabitType, and
/// HabitStatus that are used by the Habit entity and the streak policy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a user ID is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for the user owning a habit
///
/// A foreign association, not ownership - the user record itself lives in the
/// store and the engine only touches its points ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How often a habit expects one qualifying action
///
/// The frequency picks which calendar predicate the rollover transition and the
/// restoration grace window use. It is immutable for the engine's purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One qualifying action per calendar day
    Daily,
    /// One per Monday-start week
    Weekly,
    /// One per calendar month
    Monthly,
}

impl Frequency {
    /// Parse a frequency from its request/storage form, case-insensitively
    pub fn parse(s: &str) -> Result<Self, crate::domain::DomainError> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(crate::domain::DomainError::InvalidFrequency(
                format!("Expected daily, weekly or monthly, got '{}'", other)
            )),
        }
    }

    /// The string form used in the database and at the API boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// Whether a habit is something to do more of or less of
///
/// The polarity flips the streak semantics: a good habit's streak counts
/// completions, a bad habit's streak counts periods of successful avoidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    /// "Do more" - completing it extends the streak
    Good,
    /// "Do less" - resisting it (skipped) extends the streak
    Bad,
}

impl HabitType {
    pub fn parse(s: &str) -> Result<Self, crate::domain::DomainError> {
        match s.to_ascii_lowercase().as_str() {
            "good" => Ok(HabitType::Good),
            "bad" => Ok(HabitType::Bad),
            other => Err(crate::domain::DomainError::InvalidHabitType(
                format!("Expected good or bad, got '{}'", other)
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Good => "good",
            HabitType::Bad => "bad",
        }
    }
}

/// The user-visible state of a habit within the current period
///
/// `Active` is both the initial state and the state every habit returns to when
/// a new period begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    /// No qualifying action recorded yet this period
    Active,
    /// The user did the habit this period
    Completed,
    /// The user skipped (or, for bad habits, resisted) this period
    Skipped,
}

impl HabitStatus {
    pub fn parse(s: &str) -> Result<Self, crate::domain::DomainError> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(HabitStatus::Active),
            "completed" => Ok(HabitStatus::Completed),
            "skipped" => Ok(HabitStatus::Skipped),
            other => Err(crate::domain::DomainError::InvalidStatus(
                format!("Expected active, completed or skipped, got '{}'", other)
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitStatus::Active => "active",
            HabitStatus::Completed => "completed",
            HabitStatus::Skipped => "skipped",
        }
    }
}
