/// Streak policy: pure data-in/data-out transition functions
///
/// Everything temporal about streaks lives here - the period rollover
/// transition, the status-change effect table (good/bad polarity), task
/// promotion, and the restoration grace window. Handlers orchestrate storage
/// around these functions but never duplicate the policy.

use chrono::{DateTime, Utc};
use crate::domain::{calendar, Habit, HabitStatus, HabitType};

/// A provisional task graduates to a tracked habit at this streak length
pub const TASK_PROMOTION_THRESHOLD: u32 = 10;

/// Points charged per best-streak period when repairing a broken streak
pub const RESTORE_COST_PER_PERIOD: u32 = 10;

/// Whole elapsed periods within which a broken streak may still be repaired.
/// One period means the streak is not broken yet; four or more is too stale.
pub const RESTORE_WINDOW_MIN: i64 = 2;
pub const RESTORE_WINDOW_MAX: i64 = 3;

/// Why a restoration request was denied by policy
///
/// These are expected business outcomes, not faults; the points check is
/// separate because it needs the user's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreDenied {
    /// The habit has never had a qualifying action recorded
    NoCompletionHistory,
    /// Elapsed whole periods fall outside the 2-3 grace window
    OutsideGraceWindow { elapsed: i64 },
}

/// Roll a habit over into the current period if its tracked period has elapsed
///
/// Decides whether the streak carried (a qualifying action in the period just
/// ended) or broke, resets `status` to `Active`, and stamps `last_updated`.
/// Returns true if the record changed and needs persisting.
///
/// Idempotent by construction: an `Active` habit is never touched, so running
/// this on every read cannot double-penalize a habit already reset this
/// period. A record with no `last_updated` is skipped rather than reset, so
/// corrupt rows cannot trigger a mass streak wipe.
pub fn reconcile(habit: &mut Habit, now: DateTime<Utc>) -> bool {
    let Some(last_updated) = habit.last_updated else {
        tracing::debug!("Habit {} has no last_updated, skipping rollover check", habit.id);
        return false;
    };

    if habit.status == HabitStatus::Active {
        return false;
    }

    if calendar::same_period(habit.frequency, last_updated, now) {
        return false;
    }

    // The user never explicitly reset the prior period: decide carry vs break.
    let completed_last_period = habit
        .last_completed
        .map(|lc| calendar::in_previous_period(habit.frequency, lc, now))
        .unwrap_or(false);

    let broken = match habit.habit_type {
        // A good streak carries only if the qualifying action landed in the
        // period that just ended.
        HabitType::Good => !completed_last_period,
        // A bad-habit streak counts avoidance: a lapse (completed) within the
        // just-ended period breaks it.
        HabitType::Bad => habit.status == HabitStatus::Completed && completed_last_period,
    };

    if broken {
        tracing::debug!(
            "Habit {} streak broken on rollover (was {})",
            habit.id,
            habit.streak_count
        );
        habit.streak_count = 0;
    }

    habit.status = HabitStatus::Active;
    habit.last_updated = Some(now);
    true
}

/// Apply a user-submitted status change to a habit
///
/// The effect table, keyed on (habit_type, new_status):
///
/// |      | completed          | skipped            | active    |
/// |------|--------------------|--------------------|-----------|
/// | good | streak += 1        | streak = 0         | no change |
/// | bad  | streak = 0         | streak += 1        | no change |
///
/// Increments also raise `best_streak` and stamp `last_completed`; resets
/// stamp `last_completed` too (the action happened, it just wasn't
/// qualifying). Task promotion is recomputed on every update and latches.
pub fn apply_status(habit: &mut Habit, new_status: HabitStatus, now: DateTime<Utc>) {
    match (habit.habit_type, new_status) {
        (HabitType::Good, HabitStatus::Completed) | (HabitType::Bad, HabitStatus::Skipped) => {
            habit.streak_count += 1;
            habit.best_streak = habit.best_streak.max(habit.streak_count);
            habit.last_completed = Some(now);
        }
        (HabitType::Good, HabitStatus::Skipped) | (HabitType::Bad, HabitStatus::Completed) => {
            habit.streak_count = 0;
            habit.last_completed = Some(now);
        }
        (_, HabitStatus::Active) => {}
    }

    habit.status = new_status;
    habit.last_updated = Some(now);

    if habit.is_task && habit.streak_count >= TASK_PROMOTION_THRESHOLD {
        tracing::debug!("Task {} promoted to habit at streak {}", habit.id, habit.streak_count);
        habit.is_task = false;
    }
}

/// Points cost of restoring a broken streak
pub fn restoration_cost(best_streak: u32) -> u32 {
    best_streak * RESTORE_COST_PER_PERIOD
}

/// Check whether a habit is within the restoration grace window
///
/// Returns the cost on success. The caller still has to check and debit the
/// user's points; this function is pure over the habit and the clock.
pub fn check_restorable(habit: &Habit, now: DateTime<Utc>) -> Result<u32, RestoreDenied> {
    let Some(last_completed) = habit.last_completed else {
        return Err(RestoreDenied::NoCompletionHistory);
    };

    let elapsed = calendar::periods_elapsed(habit.frequency, last_completed, now);
    if !(RESTORE_WINDOW_MIN..=RESTORE_WINDOW_MAX).contains(&elapsed) {
        return Err(RestoreDenied::OutsideGraceWindow { elapsed });
    }

    Ok(restoration_cost(habit.best_streak))
}

/// Apply a successful restoration to the habit record
///
/// The points debit is the store's job (it has to be transactional with this
/// write); here we only compute the restored state.
pub fn apply_restore(habit: &mut Habit, now: DateTime<Utc>) {
    habit.streak_count = habit.best_streak;
    habit.status = HabitStatus::Completed;
    habit.last_completed = Some(now);
    habit.last_updated = Some(now);
}
