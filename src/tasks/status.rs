//! Date-derived status rules.
//!
//! All predicates take the current day (or instant) as a parameter rather
//! than reading the clock. Day-granularity rules compare against `today`
//! as a calendar date, which is the same as comparing against local midnight.
//! [`is_active_today`] is the exception and compares the full timestamp.

use crate::tasks::models::{Status, Task};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Days ahead of today that still count as "due soon".
pub const DUE_SOON_DAYS: i64 = 7;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
///
/// Returns `None` for empty, malformed or impossible dates.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !DATE_PATTERN.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Inclusive day count between two dates, in either order.
///
/// The same day counts as 1. Returns 0 if either date is missing.
#[must_use]
pub fn days_between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> u32 {
    match (start, end) {
        (Some(start), Some(end)) => {
            let span = (end - start).num_days().unsigned_abs();
            u32::try_from(span).map_or(u32::MAX, |days| days.saturating_add(1))
        }
        _ => 0,
    }
}

/// [`days_between`] over raw strings; unparseable input counts as missing.
#[must_use]
pub fn days_between_str(start: &str, end: &str) -> u32 {
    days_between(parse_date(start), parse_date(end))
}

/// Whether a task has missed its schedule.
///
/// True when the status is explicitly `Delayed`, or when an unfinished task's
/// end date has passed, or when a task that never started has a past start
/// date. Completed tasks are never delayed.
#[must_use]
pub fn is_delayed(task: &Task, today: NaiveDate) -> bool {
    match task.status {
        Status::Delayed => true,
        Status::Completed => false,
        Status::NotStarted | Status::InProgress => {
            if task.end_date.is_some_and(|end| end < today) {
                return true;
            }
            task.status == Status::NotStarted && task.start_date.is_some_and(|start| start < today)
        }
    }
}

/// Whether an unfinished task ends within the next [`DUE_SOON_DAYS`] days,
/// today included.
#[must_use]
pub fn is_due_soon(task: &Task, today: NaiveDate) -> bool {
    if task.status == Status::Completed {
        return false;
    }
    let horizon = today + Duration::days(DUE_SOON_DAYS);
    task.end_date.is_some_and(|end| end >= today && end <= horizon)
}

/// Whether `now` falls between the task's start and end dates.
///
/// Both bounds are the dates at midnight and `now` is not normalized, so any
/// time after midnight on the end date is outside the range.
#[must_use]
pub fn is_active_today(task: &Task, now: NaiveDateTime) -> bool {
    let (Some(start), Some(end)) = (task.start_date, task.end_date) else {
        return false;
    };
    let lower = start.and_time(chrono::NaiveTime::MIN);
    let upper = end.and_time(chrono::NaiveTime::MIN);
    now >= lower && now <= upper
}

impl Task {
    /// Status to show in list views: `Delayed` when [`is_delayed`] holds,
    /// otherwise the stored status.
    #[must_use]
    pub fn display_status(&self, today: NaiveDate) -> Status {
        if is_delayed(self, today) {
            Status::Delayed
        } else {
            self.status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn task(status: Status, start: Option<&str>, end: Option<&str>) -> Task {
        let mut task = Task::new("t", "Task");
        task.status = status;
        task.start_date = start.map(date);
        task.end_date = end.map(date);
        task
    }

    fn at(day: &str, hour: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2024-02-29 "), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("2024-1-5"), None);
        assert_eq!(parse_date("05/01/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between_str("2024-01-01", "2024-01-01"), 1);
        assert_eq!(days_between_str("2024-01-01", "2024-01-05"), 5);
        assert_eq!(days_between_str("2024-01-05", "2024-01-01"), 5);
        assert_eq!(days_between_str("2024-01-01", ""), 0);
        assert_eq!(days_between_str("garbage", "2024-01-01"), 0);
        assert_eq!(days_between(None, None), 0);
    }

    #[test]
    fn test_completed_is_never_delayed() {
        let today = date("2024-06-10");
        let t = task(Status::Completed, Some("2020-01-01"), Some("2020-02-01"));
        assert!(!is_delayed(&t, today));
    }

    #[test]
    fn test_explicit_delayed_status() {
        let today = date("2024-06-10");
        assert!(is_delayed(&task(Status::Delayed, None, None), today));
    }

    #[test]
    fn test_no_dates_never_delayed() {
        let today = date("2024-06-10");
        assert!(!is_delayed(&task(Status::NotStarted, None, None), today));
        assert!(!is_delayed(&task(Status::InProgress, None, None), today));
    }

    #[test]
    fn test_past_end_date_is_delayed_not_due_soon() {
        let today = date("2024-06-10");
        let t = task(Status::InProgress, None, Some("2024-06-09"));
        assert!(is_delayed(&t, today));
        assert!(!is_due_soon(&t, today));
    }

    #[test]
    fn test_past_start_only_delays_not_started() {
        let today = date("2024-06-10");
        let not_started = task(Status::NotStarted, Some("2024-06-01"), Some("2024-07-01"));
        let in_progress = task(Status::InProgress, Some("2024-06-01"), Some("2024-07-01"));
        assert!(is_delayed(&not_started, today));
        assert!(!is_delayed(&in_progress, today));
    }

    #[test]
    fn test_ending_today_is_not_delayed() {
        let today = date("2024-06-10");
        let t = task(Status::InProgress, None, Some("2024-06-10"));
        assert!(!is_delayed(&t, today));
        assert!(is_due_soon(&t, today));
    }

    #[test]
    fn test_due_soon_window_is_inclusive() {
        let today = date("2024-06-10");
        assert!(is_due_soon(&task(Status::NotStarted, None, Some("2024-06-17")), today));
        assert!(!is_due_soon(&task(Status::NotStarted, None, Some("2024-06-18")), today));
        assert!(!is_due_soon(&task(Status::Completed, None, Some("2024-06-12")), today));
        assert!(!is_due_soon(&task(Status::NotStarted, None, None), today));
    }

    #[test]
    fn test_active_today_within_range() {
        let t = task(Status::InProgress, Some("2024-06-01"), Some("2024-06-30"));
        assert!(is_active_today(&t, at("2024-06-15", 12)));
        assert!(is_active_today(&t, at("2024-06-01", 0)));
        assert!(!is_active_today(&t, at("2024-05-31", 23)));
    }

    #[test]
    fn test_active_today_uses_unnormalized_now_on_end_date() {
        let t = task(Status::InProgress, Some("2024-06-01"), Some("2024-06-30"));
        // Midnight on the end date is inside; later that day is not.
        assert!(is_active_today(&t, at("2024-06-30", 0)));
        assert!(!is_active_today(&t, at("2024-06-30", 9)));
        // The day-granularity rules still treat the end date as current.
        assert!(!is_delayed(&t, date("2024-06-30")));
    }

    #[test]
    fn test_active_today_requires_both_dates() {
        let t = task(Status::InProgress, Some("2024-06-01"), None);
        assert!(!is_active_today(&t, at("2024-06-02", 0)));
    }

    #[test]
    fn test_display_status() {
        let today = date("2024-06-10");
        let late = task(Status::NotStarted, Some("2024-06-01"), None);
        let fine = task(Status::InProgress, Some("2024-06-01"), Some("2024-06-20"));
        assert_eq!(late.display_status(today), Status::Delayed);
        assert_eq!(fine.display_status(today), Status::InProgress);
    }
}
