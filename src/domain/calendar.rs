/// Period calendar: pure predicates over UTC instants
///
/// All period math happens in a single fixed reference (UTC) so two callers in
/// different timezones agree on where a period boundary falls. Weeks start on
/// Monday; months are calendar months.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use crate::domain::Frequency;

/// Monday-aligned start of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Months since year zero; lets month comparisons cross year boundaries
fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// True if the two instants fall on the same calendar day
pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// True if the two instants fall in the same Monday-start week
pub fn same_week(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    week_start(a.date_naive()) == week_start(b.date_naive())
}

/// True if the two instants fall in the same calendar month
pub fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    month_index(a.date_naive()) == month_index(b.date_naive())
}

/// True if the two instants share the period selected by `frequency`
pub fn same_period(frequency: Frequency, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    match frequency {
        Frequency::Daily => same_day(a, b),
        Frequency::Weekly => same_week(a, b),
        Frequency::Monthly => same_month(a, b),
    }
}

/// Like `same_period`, but a missing instant is never in the same period
pub fn same_period_opt(
    frequency: Frequency,
    a: Option<DateTime<Utc>>,
    b: DateTime<Utc>,
) -> bool {
    match a {
        Some(a) => same_period(frequency, a, b),
        None => false,
    }
}

/// True if `instant` falls in the period immediately preceding `now`
///
/// Yesterday for daily habits, last Monday-start week for weekly, last
/// calendar month for monthly. This is the reference window the rollover
/// transition uses to decide whether a streak carried over.
pub fn in_previous_period(
    frequency: Frequency,
    instant: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    let d = instant.date_naive();
    let n = now.date_naive();
    match frequency {
        Frequency::Daily => d == n - Duration::days(1),
        Frequency::Weekly => week_start(d) == week_start(n) - Duration::days(7),
        Frequency::Monthly => month_index(d) == month_index(n) - 1,
    }
}

/// Whole periods elapsed between `from` and `to`
///
/// Days are calendar days, weeks are Monday-aligned week boundaries crossed,
/// months are calendar month boundaries crossed. Negative if `to` precedes
/// `from`.
pub fn periods_elapsed(
    frequency: Frequency,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> i64 {
    match frequency {
        Frequency::Daily => (to.date_naive() - from.date_naive()).num_days(),
        Frequency::Weekly => {
            (week_start(to.date_naive()) - week_start(from.date_naive())).num_days() / 7
        }
        Frequency::Monthly => month_index(to.date_naive()) - month_index(from.date_naive()),
    }
}
