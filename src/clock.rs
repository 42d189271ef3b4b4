// src/clock.rs
// Calendar-day boundaries used by the scheduler and the due queue.

use chrono::{DateTime, Days, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};

/// Sentinel due date for graduated words. Nothing is ever due at or after it.
pub const NEVER: i64 = i64::MAX;

/// Resolves local midnight of `date`, tolerating DST transitions that skip or repeat it.
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Midnight fell into a DST gap; the day starts at the first valid instant.
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Midnight at the start of the calendar day containing `now`.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    midnight(&now.timezone(), now.date_naive())
}

/// Midnight of the calendar date `days` after the one containing `now`.
pub fn day_offset<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Tz> {
    let date = now
        .date_naive()
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    midnight(&now.timezone(), date)
}

/// Last millisecond of the calendar day containing `now`.
pub fn end_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    day_offset(now, 1) - Duration::milliseconds(1)
}

/// Human-readable local date for a due timestamp.
pub fn describe_due(millis: i64) -> String {
    if millis == NEVER {
        return "never".to_string();
    }
    match Local.timestamp_millis_opt(millis) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.format("%Y-%m-%d").to_string(),
        LocalResult::None => "unknown".to_string(),
    }
}
