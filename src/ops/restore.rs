/// Handler for points-funded streak restoration
///
/// Validates the grace window and the points balance, then performs the debit
/// and the streak restore as one transactional store operation so the ledger
/// can never end up debited without the streak restored.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::domain::{streak, Habit, RestoreDenied, UserId};
use crate::ops::{EngineError, PolicyRejection};
use crate::storage::{HabitStore, StorageError};

/// Parameters for a streak restoration request
#[derive(Debug, Clone, Deserialize)]
pub struct RestoreParams {
    pub user_id: UserId,
    pub title: String,
}

/// Result of a successful restoration
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    /// The habit with its streak restored to the best-streak mark
    pub habit: Habit,
    /// Points charged
    pub cost: u32,
    /// Ledger balance after the debit, for the caller to display
    pub remaining_points: u32,
}

/// Restore a broken streak in exchange for points
///
/// Preconditions, checked in order with no mutation on failure: the habit
/// exists, it has completion history, the break is 2-3 whole periods old, and
/// the user can afford `best_streak * 10` points.
pub fn restore_streak<S: HabitStore>(
    store: &S,
    params: RestoreParams,
) -> Result<RestoreOutcome, EngineError> {
    if params.title.trim().is_empty() {
        return Err(EngineError::Validation(
            "Habit title is required".to_string(),
        ));
    }

    let now = Utc::now();
    let mut habit = store.find_by_title(params.user_id, &params.title)?;

    let cost = streak::check_restorable(&habit, now).map_err(|denied| match denied {
        RestoreDenied::NoCompletionHistory => PolicyRejection::NoCompletionHistory,
        RestoreDenied::OutsideGraceWindow { elapsed } => {
            PolicyRejection::GracePeriodExpired { elapsed }
        }
    })?;

    let user = store.get_user(params.user_id)?;
    if user.total_points < cost {
        return Err(PolicyRejection::InsufficientPoints {
            required: cost,
            available: user.total_points,
        }
        .into());
    }

    let prior_version = habit.version;
    streak::apply_restore(&mut habit, now);

    match store.debit_and_restore(&habit, prior_version, cost) {
        Ok(remaining_points) => {
            habit.version = prior_version + 1;
            tracing::info!(
                "Restored streak {} on habit {} for {} points",
                habit.streak_count,
                habit.id,
                cost
            );
            Ok(RestoreOutcome {
                habit,
                cost,
                remaining_points,
            })
        }
        // Lost a balance race between the check and the debit: report it as
        // the policy rejection it is, with a fresh balance.
        Err(StorageError::PointsDebitFailed { .. }) => {
            let user = store.get_user(params.user_id)?;
            Err(PolicyRejection::InsufficientPoints {
                required: cost,
                available: user.total_points,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}
