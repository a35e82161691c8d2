/// Policy properties exercised through the public API, with fixed instants
use chrono::{DateTime, Duration, TimeZone, Utc};
use rise_habits::{
    calendar, streak, Frequency, Habit, HabitStatus, HabitType, UserId,
};

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn new_habit(frequency: Frequency, habit_type: HabitType, now: DateTime<Utc>) -> Habit {
    Habit::new(
        UserId::new(),
        "Read".to_string(),
        frequency,
        habit_type,
        false,
        now,
    )
    .unwrap()
}

#[test]
fn n_completions_in_one_period_add_n_to_streak() {
    let now = utc(2024, 3, 10, 9);
    let mut habit = new_habit(Frequency::Daily, HabitType::Good, now);

    for n in 1..=7u32 {
        streak::apply_status(&mut habit, HabitStatus::Completed, now);
        assert_eq!(habit.streak_count, n);
        assert_eq!(habit.best_streak, n);
    }
}

#[test]
fn task_promotion_fires_once_and_stays() {
    let now = utc(2024, 3, 10, 9);
    let mut habit = new_habit(Frequency::Daily, HabitType::Good, now);
    habit.is_task = true;

    for _ in 0..9 {
        streak::apply_status(&mut habit, HabitStatus::Completed, now);
        assert!(habit.is_task);
    }
    streak::apply_status(&mut habit, HabitStatus::Completed, now);
    assert_eq!(habit.streak_count, 10);
    assert!(!habit.is_task);

    // Promotion is a latch: recomputed every update, never reversed.
    streak::apply_status(&mut habit, HabitStatus::Skipped, now);
    streak::apply_status(&mut habit, HabitStatus::Completed, now);
    assert!(!habit.is_task);
}

#[test]
fn best_streak_never_decreases_across_operation_sequences() {
    let now = utc(2024, 3, 10, 9);
    let mut habit = new_habit(Frequency::Daily, HabitType::Good, now);
    let mut high_water = 0;

    let script = [
        HabitStatus::Completed,
        HabitStatus::Completed,
        HabitStatus::Skipped,
        HabitStatus::Completed,
        HabitStatus::Active,
        HabitStatus::Completed,
        HabitStatus::Skipped,
    ];

    let mut at = now;
    for status in script {
        streak::apply_status(&mut habit, status, at);
        assert!(habit.best_streak >= high_water);
        assert!(habit.streak_count <= habit.best_streak);
        high_water = habit.best_streak;

        // Roll into the next day between updates; reconcile must not lower it.
        at += Duration::days(1);
        streak::reconcile(&mut habit, at);
        assert!(habit.best_streak >= high_water);
        assert!(habit.streak_count <= habit.best_streak);
    }
}

#[test]
fn bad_habit_two_skips_then_lapse() {
    let now = utc(2024, 3, 10, 9);
    let mut habit = new_habit(Frequency::Daily, HabitType::Bad, now);

    streak::apply_status(&mut habit, HabitStatus::Skipped, now);
    streak::apply_status(&mut habit, HabitStatus::Skipped, now);
    assert_eq!(habit.streak_count, 2);
    assert!(habit.best_streak >= 2);

    streak::apply_status(&mut habit, HabitStatus::Completed, now);
    assert_eq!(habit.streak_count, 0);
    assert_eq!(habit.best_streak, 2);
}

#[test]
fn reconcile_is_idempotent_within_a_period() {
    let now = utc(2024, 3, 10, 9);
    let mut habit = new_habit(Frequency::Daily, HabitType::Good, utc(2024, 3, 9, 20));
    habit.status = HabitStatus::Completed;
    habit.streak_count = 4;
    habit.best_streak = 4;
    habit.last_completed = Some(utc(2024, 3, 9, 20));

    assert!(streak::reconcile(&mut habit, now));
    let after_first = habit.clone();

    // Second run in the same period: habit is Active now, nothing changes.
    assert!(!streak::reconcile(&mut habit, now));
    assert_eq!(habit, after_first);
}

#[test]
fn weekly_grace_window_boundaries() {
    // now is Wed 2024-03-27; week starts Mon 2024-03-25
    let now = utc(2024, 3, 27, 12);
    let cases = [
        (utc(2024, 3, 21, 9), 1, false),  // last week: too early
        (utc(2024, 3, 15, 9), 2, true),   // two weeks back
        (utc(2024, 3, 4, 9), 3, true),    // three weeks back
        (utc(2024, 2, 28, 9), 4, false),  // four weeks back: too stale
    ];

    for (last_completed, expected_elapsed, ok) in cases {
        assert_eq!(
            calendar::periods_elapsed(Frequency::Weekly, last_completed, now),
            expected_elapsed
        );
        let mut habit = new_habit(Frequency::Weekly, HabitType::Good, now);
        habit.best_streak = 4;
        habit.last_completed = Some(last_completed);
        assert_eq!(
            streak::check_restorable(&habit, now).is_ok(),
            ok,
            "elapsed {} weeks",
            expected_elapsed
        );
    }
}

#[test]
fn monthly_grace_window_boundaries() {
    let now = utc(2024, 5, 10, 12);
    let cases = [
        (utc(2024, 4, 30, 9), false), // 1 month
        (utc(2024, 3, 1, 9), true),   // 2 months
        (utc(2024, 2, 28, 9), true),  // 3 months
        (utc(2024, 1, 31, 9), false), // 4 months
    ];

    for (last_completed, ok) in cases {
        let mut habit = new_habit(Frequency::Monthly, HabitType::Good, now);
        habit.best_streak = 2;
        habit.last_completed = Some(last_completed);
        assert_eq!(streak::check_restorable(&habit, now).is_ok(), ok);
    }
}

#[test]
fn restoration_cost_is_ten_per_best_streak_period() {
    let now = utc(2024, 3, 10, 9);
    let mut habit = new_habit(Frequency::Daily, HabitType::Good, now);
    habit.best_streak = 5;
    habit.last_completed = Some(now - Duration::days(2));

    assert_eq!(streak::check_restorable(&habit, now), Ok(50));
}
