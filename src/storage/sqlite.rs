/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit and user records. It handles all SQL queries and
/// data conversion.

use std::path::PathBuf;
use rusqlite::{params, Connection, Row};
use chrono::{DateTime, Utc};

use crate::domain::{
    Frequency, Habit, HabitId, HabitStatus, HabitType, User, UserId,
};
use crate::storage::{migrations, HabitStore, StorageError};

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStore trait.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        // Enable foreign key constraints
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    /// Current stored version of a habit, or None if the row is gone
    fn habit_version(&self, habit_id: HabitId) -> Result<Option<i64>, StorageError> {
        let result = self.conn.query_row(
            "SELECT version FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Query(e)),
        }
    }
}

const HABIT_COLUMNS: &str = "id, user_id, title, frequency, habit_type, status, \
     streak_count, best_streak, is_task, last_completed, last_updated, version";

/// Map one habits row into the domain entity
fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id_str: String = row.get(0)?;
    let id = HabitId::from_string(&id_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
    })?;

    let user_id_str: String = row.get(1)?;
    let user_id = UserId::from_string(&user_id_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(1, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
    })?;

    let frequency_str: String = row.get(3)?;
    let frequency = Frequency::parse(&frequency_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(3, "Invalid frequency".to_string(), rusqlite::types::Type::Text)
    })?;

    let habit_type_str: String = row.get(4)?;
    let habit_type = HabitType::parse(&habit_type_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(4, "Invalid habit type".to_string(), rusqlite::types::Type::Text)
    })?;

    let status_str: String = row.get(5)?;
    let status = HabitStatus::parse(&status_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(5, "Invalid status".to_string(), rusqlite::types::Type::Text)
    })?;

    let last_completed = parse_optional_instant(row, 9)?;
    let last_updated = parse_optional_instant(row, 10)?;

    Ok(Habit::from_existing(
        id,
        user_id,
        row.get(2)?, // title
        frequency,
        habit_type,
        status,
        row.get(6)?, // streak_count
        row.get(7)?, // best_streak
        row.get(8)?, // is_task
        last_completed,
        last_updated,
        row.get(11)?, // version
    ))
}

/// Parse a nullable RFC3339 column; a malformed value maps to None rather than
/// failing the whole row (the rollover transition then skips the record)
fn parse_optional_instant(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }))
}

impl HabitStore for SqliteStore {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO habits (
                id, user_id, title, frequency, habit_type, status,
                streak_count, best_streak, is_task, last_completed, last_updated, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                habit.id.to_string(),
                habit.user_id.to_string(),
                habit.title,
                habit.frequency.as_str(),
                habit.habit_type.as_str(),
                habit.status.as_str(),
                habit.streak_count,
                habit.best_streak,
                habit.is_task,
                habit.last_completed.map(|d| d.to_rfc3339()),
                habit.last_updated.map(|d| d.to_rfc3339()),
                habit.version,
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Created habit: {} ({})", habit.title, habit.id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StorageError::DuplicateHabit {
                    title: habit.title.clone(),
                })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Get a habit by its ID, scoped to the owning user
    fn get_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<Habit, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2",
            HABIT_COLUMNS
        );
        let result = self.conn.query_row(
            &sql,
            params![habit_id.to_string(), user_id.to_string()],
            row_to_habit,
        );

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                key: habit_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Look a habit up by the (user, title) alternate key
    fn find_by_title(&self, user_id: UserId, title: &str) -> Result<Habit, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits WHERE user_id = ?1 AND title = ?2",
            HABIT_COLUMNS
        );
        let result = self.conn.query_row(
            &sql,
            params![user_id.to_string(), title],
            row_to_habit,
        );

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                key: format!("{}/{}", user_id, title),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// List a user's habits, optionally filtered by frequency
    fn list_habits(
        &self,
        user_id: UserId,
        frequency: Option<Frequency>,
    ) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits WHERE user_id = ?1", HABIT_COLUMNS);
        if frequency.is_some() {
            sql.push_str(" AND frequency = ?2");
        }
        sql.push_str(" ORDER BY title");

        let mut stmt = self.conn.prepare(&sql)?;

        let mut habits = Vec::new();
        match frequency {
            Some(freq) => {
                let iter = stmt.query_map(
                    params![user_id.to_string(), freq.as_str()],
                    row_to_habit,
                )?;
                for habit in iter {
                    habits.push(habit?);
                }
            }
            None => {
                let iter = stmt.query_map(params![user_id.to_string()], row_to_habit)?;
                for habit in iter {
                    habits.push(habit?);
                }
            }
        }

        Ok(habits)
    }

    /// Guarded write: lands only if the stored version is still `expected_version`
    fn update_habit_guarded(
        &self,
        habit: &Habit,
        expected_version: i64,
    ) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                title = ?3,
                status = ?4,
                streak_count = ?5,
                best_streak = ?6,
                is_task = ?7,
                last_completed = ?8,
                last_updated = ?9,
                version = version + 1
             WHERE id = ?1 AND version = ?2",
            params![
                habit.id.to_string(),
                expected_version,
                habit.title,
                habit.status.as_str(),
                habit.streak_count,
                habit.best_streak,
                habit.is_task,
                habit.last_completed.map(|d| d.to_rfc3339()),
                habit.last_updated.map(|d| d.to_rfc3339()),
            ],
        )?;

        if rows_affected == 0 {
            // Either the row is gone or someone else wrote first.
            return match self.habit_version(habit.id)? {
                Some(_) => Err(StorageError::VersionConflict {
                    habit_id: habit.id,
                    expected: expected_version,
                }),
                None => Err(StorageError::HabitNotFound {
                    key: habit.id.to_string(),
                }),
            };
        }

        tracing::debug!("Updated habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    /// Delete a habit by id, scoped to its owner
    fn delete_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![habit_id.to_string(), user_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                key: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    /// Insert a user ledger record
    fn create_user(&self, user: &User) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO users (id, total_points) VALUES (?1, ?2)",
            params![user.id.to_string(), user.total_points],
        )?;

        tracing::debug!("Created user ledger: {}", user.id);
        Ok(())
    }

    /// Fetch a user's points ledger
    fn get_user(&self, user_id: UserId) -> Result<User, StorageError> {
        let result = self.conn.query_row(
            "SELECT total_points FROM users WHERE id = ?1",
            params![user_id.to_string()],
            |row| row.get::<_, u32>(0),
        );

        match result {
            Ok(total_points) => Ok(User::new(user_id, total_points)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::UserNotFound { user_id })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Debit points and write the restored habit atomically
    ///
    /// Both statements run inside one transaction; failure at any point rolls
    /// the debit back, so the ledger is never left debited without the streak
    /// restored. The debit's balance guard makes the insufficient-points race
    /// lose cleanly instead of driving the balance negative.
    fn debit_and_restore(
        &self,
        habit: &Habit,
        expected_version: i64,
        cost: u32,
    ) -> Result<u32, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let debited = tx.execute(
            "UPDATE users SET total_points = total_points - ?1
             WHERE id = ?2 AND total_points >= ?1",
            params![cost, habit.user_id.to_string()],
        )?;

        if debited == 0 {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM users WHERE id = ?1",
                    params![habit.user_id.to_string()],
                    |_| Ok(()),
                )
                .is_ok();
            return Err(if exists {
                StorageError::PointsDebitFailed {
                    user_id: habit.user_id,
                }
            } else {
                StorageError::UserNotFound {
                    user_id: habit.user_id,
                }
            });
        }

        let restored = tx.execute(
            "UPDATE habits SET
                status = ?3,
                streak_count = ?4,
                last_completed = ?5,
                last_updated = ?6,
                version = version + 1
             WHERE id = ?1 AND version = ?2",
            params![
                habit.id.to_string(),
                expected_version,
                habit.status.as_str(),
                habit.streak_count,
                habit.last_completed.map(|d| d.to_rfc3339()),
                habit.last_updated.map(|d| d.to_rfc3339()),
            ],
        )?;

        if restored == 0 {
            return Err(StorageError::VersionConflict {
                habit_id: habit.id,
                expected: expected_version,
            });
        }

        let remaining = tx.query_row(
            "SELECT total_points FROM users WHERE id = ?1",
            params![habit.user_id.to_string()],
            |row| row.get::<_, u32>(0),
        )?;

        tx.commit()?;

        tracing::debug!(
            "Restored streak for habit {} at cost {}, {} points remaining",
            habit.id,
            cost,
            remaining
        );
        Ok(remaining)
    }
}
