/// End-to-end engine flows over a tempfile-backed SQLite store
use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;

use rise_habits::{
    CheckResetParams, CreateHabitParams, EngineError, Frequency, Habit, HabitEngine, HabitId,
    HabitStatus, HabitStore, HabitType, ListParams, PolicyRejection, RestoreParams, StatusParams,
    StorageError, User, UserId,
};

fn engine_with_user(points: u32) -> (NamedTempFile, HabitEngine, UserId) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let engine = HabitEngine::new(temp_file.path().to_path_buf()).expect("Failed to open engine");
    let user_id = UserId::new();
    engine.register_user(user_id, points).expect("Failed to seed user");
    (temp_file, engine, user_id)
}

fn add_good_daily(engine: &HabitEngine, user_id: UserId, title: &str) -> Habit {
    engine
        .create_habit(CreateHabitParams {
            user_id,
            title: title.to_string(),
            frequency: "daily".to_string(),
            habit_type: "good".to_string(),
            is_task: false,
        })
        .expect("Failed to create habit")
}

/// Overwrite a habit's streak state directly through the store, simulating a
/// record last touched in an earlier period.
fn backdate(
    engine: &HabitEngine,
    habit: &Habit,
    status: HabitStatus,
    streak: u32,
    best: u32,
    last_completed: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
) {
    let mut h = habit.clone();
    h.status = status;
    h.streak_count = streak;
    h.best_streak = best;
    h.last_completed = last_completed;
    h.last_updated = last_updated;
    engine
        .store()
        .update_habit_guarded(&h, h.version)
        .expect("Failed to backdate habit");
}

#[test]
fn active_habits_are_untouched_by_reconciliation() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    let habit = add_good_daily(&engine, user_id, "Stretch");
    let long_ago = Utc::now() - Duration::days(90);
    backdate(&engine, &habit, HabitStatus::Active, 4, 6, Some(long_ago), Some(long_ago));

    let listed = engine
        .reconcile_and_list(ListParams { user_id, frequency: None })
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, HabitStatus::Active);
    assert_eq!(listed[0].streak_count, 4);
    assert_eq!(listed[0].best_streak, 6);
    // No write happened: version is still the backdated one.
    assert_eq!(listed[0].last_updated, Some(long_ago));
}

#[test]
fn completed_yesterday_carries_streak_on_rollover() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    let habit = add_good_daily(&engine, user_id, "Run");
    let yesterday = Utc::now() - Duration::days(1);
    backdate(&engine, &habit, HabitStatus::Completed, 4, 6, Some(yesterday), Some(yesterday));

    let listed = engine
        .reconcile_and_list(ListParams { user_id, frequency: None })
        .unwrap();

    assert_eq!(listed[0].status, HabitStatus::Active);
    assert_eq!(listed[0].streak_count, 4);
}

#[test]
fn three_day_gap_breaks_streak_on_rollover() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    let habit = add_good_daily(&engine, user_id, "Run");
    let three_days_ago = Utc::now() - Duration::days(3);
    backdate(
        &engine,
        &habit,
        HabitStatus::Completed,
        4,
        6,
        Some(three_days_ago),
        Some(three_days_ago),
    );

    let listed = engine
        .reconcile_and_list(ListParams { user_id, frequency: None })
        .unwrap();

    assert_eq!(listed[0].streak_count, 0);
    assert_eq!(listed[0].best_streak, 6);
    assert_eq!(listed[0].status, HabitStatus::Active);

    // The reset was persisted, not just computed.
    let stored = engine.get_habit(user_id, "Run").unwrap();
    assert_eq!(stored.streak_count, 0);
}

#[test]
fn repeated_completions_accumulate_and_promote_tasks() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    engine
        .create_habit(CreateHabitParams {
            user_id,
            title: "Journal".to_string(),
            frequency: "daily".to_string(),
            habit_type: "good".to_string(),
            is_task: true,
        })
        .unwrap();

    for n in 1..=9u32 {
        let habit = engine
            .apply_status(StatusParams {
                user_id,
                title: "Journal".to_string(),
                status: "completed".to_string(),
            })
            .unwrap();
        assert_eq!(habit.streak_count, n);
        assert!(habit.is_task);
    }

    let habit = engine
        .apply_status(StatusParams {
            user_id,
            title: "Journal".to_string(),
            status: "completed".to_string(),
        })
        .unwrap();
    assert_eq!(habit.streak_count, 10);
    assert!(!habit.is_task);
}

#[test]
fn bad_habit_polarity_through_the_engine() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    engine
        .create_habit(CreateHabitParams {
            user_id,
            title: "No sugar".to_string(),
            frequency: "daily".to_string(),
            habit_type: "bad".to_string(),
            is_task: false,
        })
        .unwrap();

    for _ in 0..2 {
        engine
            .apply_status(StatusParams {
                user_id,
                title: "No sugar".to_string(),
                status: "skipped".to_string(),
            })
            .unwrap();
    }
    let habit = engine.get_habit(user_id, "No sugar").unwrap();
    assert_eq!(habit.streak_count, 2);
    assert!(habit.best_streak >= 2);

    let habit = engine
        .apply_status(StatusParams {
            user_id,
            title: "No sugar".to_string(),
            status: "completed".to_string(),
        })
        .unwrap();
    assert_eq!(habit.streak_count, 0);
    assert_eq!(habit.best_streak, 2);
}

#[test]
fn restoration_rejected_on_insufficient_points() {
    let (_tmp, engine, user_id) = engine_with_user(40);
    let habit = add_good_daily(&engine, user_id, "Run");
    let two_days_ago = Utc::now() - Duration::days(2);
    backdate(&engine, &habit, HabitStatus::Active, 0, 5, Some(two_days_ago), Some(two_days_ago));

    let result = engine.restore_streak(RestoreParams {
        user_id,
        title: "Run".to_string(),
    });

    assert!(matches!(
        result,
        Err(EngineError::Policy(PolicyRejection::InsufficientPoints {
            required: 50,
            available: 40,
        }))
    ));
    // No partial mutation: balance and habit untouched.
    assert_eq!(engine.get_user(user_id).unwrap().total_points, 40);
    assert_eq!(engine.get_habit(user_id, "Run").unwrap().streak_count, 0);
}

#[test]
fn restoration_debits_and_restores_atomically() {
    let (_tmp, engine, user_id) = engine_with_user(50);
    let habit = add_good_daily(&engine, user_id, "Run");
    let two_days_ago = Utc::now() - Duration::days(2);
    backdate(&engine, &habit, HabitStatus::Active, 0, 5, Some(two_days_ago), Some(two_days_ago));

    let outcome = engine
        .restore_streak(RestoreParams {
            user_id,
            title: "Run".to_string(),
        })
        .unwrap();

    assert_eq!(outcome.cost, 50);
    assert_eq!(outcome.remaining_points, 0);
    assert_eq!(outcome.habit.streak_count, 5);
    assert_eq!(outcome.habit.status, HabitStatus::Completed);

    assert_eq!(engine.get_user(user_id).unwrap().total_points, 0);
    let stored = engine.get_habit(user_id, "Run").unwrap();
    assert_eq!(stored.streak_count, 5);
    assert_eq!(stored.status, HabitStatus::Completed);
}

#[test]
fn restoration_window_excludes_one_and_four_periods() {
    let (_tmp, engine, user_id) = engine_with_user(1000);

    for (title, days) in [("Fresh", 1), ("Stale", 4)] {
        let habit = add_good_daily(&engine, user_id, title);
        let when = Utc::now() - Duration::days(days);
        backdate(&engine, &habit, HabitStatus::Active, 0, 3, Some(when), Some(when));

        let result = engine.restore_streak(RestoreParams {
            user_id,
            title: title.to_string(),
        });
        assert!(
            matches!(
                result,
                Err(EngineError::Policy(PolicyRejection::GracePeriodExpired { .. }))
            ),
            "{} days should be outside the window",
            days
        );
    }
}

#[test]
fn restoration_requires_completion_history() {
    let (_tmp, engine, user_id) = engine_with_user(1000);
    add_good_daily(&engine, user_id, "Run");

    let result = engine.restore_streak(RestoreParams {
        user_id,
        title: "Run".to_string(),
    });

    assert!(matches!(
        result,
        Err(EngineError::Policy(PolicyRejection::NoCompletionHistory))
    ));
}

#[test]
fn unknown_habit_is_a_not_found_error() {
    let (_tmp, engine, user_id) = engine_with_user(0);

    let result = engine.apply_status(StatusParams {
        user_id,
        title: "Nope".to_string(),
        status: "completed".to_string(),
    });

    assert!(matches!(result, Err(EngineError::NotFound { .. })));
}

#[test]
fn malformed_status_is_a_validation_error_with_no_mutation() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    add_good_daily(&engine, user_id, "Run");

    let result = engine.apply_status(StatusParams {
        user_id,
        title: "Run".to_string(),
        status: "done-ish".to_string(),
    });

    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert_eq!(engine.get_habit(user_id, "Run").unwrap().streak_count, 0);
}

#[test]
fn duplicate_title_per_user_is_rejected() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    add_good_daily(&engine, user_id, "Run");

    let result = engine.create_habit(CreateHabitParams {
        user_id,
        title: "Run".to_string(),
        frequency: "weekly".to_string(),
        habit_type: "good".to_string(),
        is_task: false,
    });

    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[test]
fn stale_guarded_write_conflicts_but_engine_recovers() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    let created = add_good_daily(&engine, user_id, "Run");

    // A competing writer lands first.
    engine
        .apply_status(StatusParams {
            user_id,
            title: "Run".to_string(),
            status: "completed".to_string(),
        })
        .unwrap();

    // A write using the stale pre-update version must be refused.
    let stale = engine.store().update_habit_guarded(&created, created.version);
    assert!(matches!(
        stale,
        Err(rise_habits::StorageError::VersionConflict { .. })
    ));

    // The engine path re-reads per attempt, so it still applies exactly one
    // increment on top of the competing write.
    let habit = engine
        .apply_status(StatusParams {
            user_id,
            title: "Run".to_string(),
            status: "completed".to_string(),
        })
        .unwrap();
    assert_eq!(habit.streak_count, 2);
}

#[test]
fn check_reset_rolls_over_a_single_habit() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    let habit = add_good_daily(&engine, user_id, "Run");
    let three_days_ago = Utc::now() - Duration::days(3);
    backdate(
        &engine,
        &habit,
        HabitStatus::Completed,
        4,
        6,
        Some(three_days_ago),
        Some(three_days_ago),
    );

    let rolled = engine
        .check_reset(CheckResetParams {
            user_id,
            title: "Run".to_string(),
        })
        .unwrap();

    assert_eq!(rolled.status, HabitStatus::Active);
    assert_eq!(rolled.streak_count, 0);
    assert_eq!(rolled.best_streak, 6);

    // The reset was persisted.
    let stored = engine.get_habit(user_id, "Run").unwrap();
    assert_eq!(stored.status, HabitStatus::Active);
    assert_eq!(stored.streak_count, 0);

    // A second check in the same period is a no-op.
    let again = engine
        .check_reset(CheckResetParams {
            user_id,
            title: "Run".to_string(),
        })
        .unwrap();
    assert_eq!(again, stored);
}

/// Store double for the race where another writer rolls a habit over (version
/// conflict) and then deletes it before the re-read lands.
struct VanishingStore {
    habit: Habit,
}

impl HabitStore for VanishingStore {
    fn list_habits(
        &self,
        _user_id: UserId,
        _frequency: Option<Frequency>,
    ) -> Result<Vec<Habit>, StorageError> {
        Ok(vec![self.habit.clone()])
    }

    fn update_habit_guarded(
        &self,
        habit: &Habit,
        expected_version: i64,
    ) -> Result<(), StorageError> {
        Err(StorageError::VersionConflict {
            habit_id: habit.id,
            expected: expected_version,
        })
    }

    fn get_habit(&self, _user_id: UserId, habit_id: HabitId) -> Result<Habit, StorageError> {
        Err(StorageError::HabitNotFound {
            key: habit_id.to_string(),
        })
    }

    fn create_habit(&self, _habit: &Habit) -> Result<(), StorageError> {
        unimplemented!()
    }

    fn find_by_title(&self, _user_id: UserId, _title: &str) -> Result<Habit, StorageError> {
        unimplemented!()
    }

    fn delete_habit(&self, _user_id: UserId, _habit_id: HabitId) -> Result<(), StorageError> {
        unimplemented!()
    }

    fn create_user(&self, _user: &User) -> Result<(), StorageError> {
        unimplemented!()
    }

    fn get_user(&self, _user_id: UserId) -> Result<User, StorageError> {
        unimplemented!()
    }

    fn debit_and_restore(
        &self,
        _habit: &Habit,
        _expected_version: i64,
        _cost: u32,
    ) -> Result<u32, StorageError> {
        unimplemented!()
    }
}

#[test]
fn listing_omits_habit_deleted_mid_reconcile() {
    let three_days_ago = Utc::now() - Duration::days(3);
    let mut habit = Habit::new(
        UserId::new(),
        "Run".to_string(),
        Frequency::Daily,
        HabitType::Good,
        false,
        three_days_ago,
    )
    .unwrap();
    habit.status = HabitStatus::Completed;
    habit.last_completed = Some(three_days_ago);
    habit.last_updated = Some(three_days_ago);
    let user_id = habit.user_id;

    let store = VanishingStore { habit };
    let listed = rise_habits::reconcile_and_list(
        &store,
        ListParams {
            user_id,
            frequency: None,
        },
    )
    .unwrap();

    assert!(listed.is_empty());
}

#[test]
fn delete_then_lookup_is_not_found() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    let habit = add_good_daily(&engine, user_id, "Run");

    engine.delete_habit(user_id, habit.id).unwrap();

    let result = engine.get_habit(user_id, "Run");
    assert!(matches!(result, Err(EngineError::NotFound { .. })));
}

#[test]
fn frequency_filter_limits_listing() {
    let (_tmp, engine, user_id) = engine_with_user(0);
    add_good_daily(&engine, user_id, "Run");
    engine
        .create_habit(CreateHabitParams {
            user_id,
            title: "Budget review".to_string(),
            frequency: "monthly".to_string(),
            habit_type: "good".to_string(),
            is_task: false,
        })
        .unwrap();

    let daily = engine
        .reconcile_and_list(ListParams {
            user_id,
            frequency: Some(rise_habits::Frequency::Daily),
        })
        .unwrap();

    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].title, "Run");
}
