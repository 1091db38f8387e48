//! Date utilities for daily reset hour handling.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

/// Start of the study day containing `now`, in UTC.
///
/// A study day begins at `daily_reset_hour` rather than midnight. Before the
/// reset hour it is still "yesterday" from a study perspective, so learners
/// can practise late at night and have it count towards the previous day.
pub fn study_day_start(now: DateTime<Utc>, daily_reset_hour: u32) -> DateTime<Utc> {
    let since_midnight = Duration::seconds(i64::from(now.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(now.nanosecond()));
    let reset = now - since_midnight + Duration::hours(i64::from(daily_reset_hour.min(23)));

    if now < reset {
        reset - Duration::days(1)
    } else {
        reset
    }
}

/// Calendar date of the study day containing `now`.
pub fn study_date(now: DateTime<Utc>, daily_reset_hour: u32) -> NaiveDate {
    study_day_start(now, daily_reset_hour).date_naive()
}
