//! Whole-day arithmetic on timestamps

use chrono::{DateTime, TimeDelta, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// `ceil((to - from) / 1 day)`. Negative spans round toward zero.
pub fn ceil_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let millis = (to - from).num_milliseconds();
    -(-millis).div_euclid(MILLIS_PER_DAY)
}

/// `floor((to - from) / 1 day)`, used for "days since" style ages
pub fn floor_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Shift a timestamp forward by a signed number of days; `None` when the
/// result leaves chrono's representable range
pub fn add_days(at: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|delta| at.checked_add_signed(delta))
}

/// Shift a timestamp back by a signed number of days; `None` on overflow
pub fn sub_days(at: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|delta| at.checked_sub_signed(delta))
}
