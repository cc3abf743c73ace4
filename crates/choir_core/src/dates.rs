//! Date helpers for the Sunday schedule.
//!
//! Song dates are plain calendar dates in local time. Two string forms are used:
//! the sortable ISO form (`YYYY-MM-DD`) and the short display form (`M/D`).
//! Helpers that depend on "now" have an `_at` variant taking the reference
//! instant so callers and tests can pin the clock.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};

/// Display token for a song that has no date yet.
pub const UNSCHEDULED: &str = "미정";

const WEEKDAY_NAMES: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Whether "the next Sunday" of a Sunday is the same day or a week later.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SundayPolicy {
    /// A Sunday is its own next Sunday.
    #[default]
    Inclusive,
    /// A Sunday's next Sunday is seven days later.
    Exclusive,
}

/// Stand-in date for unscheduled songs so they sort after every real date.
pub fn unscheduled_sort_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Format the local calendar fields of `date` as zero-padded `YYYY-MM-DD`.
pub fn format_date_iso<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a display string (`M/D`) as a date in the current local year.
///
/// The unscheduled token parses to [`unscheduled_sort_date`].
pub fn parse_display_date(s: &str) -> Option<NaiveDate> {
    parse_display_date_in(s, Local::now().year())
}

/// Parse a display string (`M/D`) as a date in `year`.
pub fn parse_display_date_in(s: &str, year: i32) -> Option<NaiveDate> {
    let s = s.trim();
    if s == UNSCHEDULED {
        return Some(unscheduled_sort_date());
    }
    let (month, day) = s.split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The Sunday on or after `date` (see [`SundayPolicy`] for a Sunday input).
pub fn next_sunday(date: NaiveDate, policy: SundayPolicy) -> NaiveDate {
    let from_sunday = date.weekday().num_days_from_sunday();
    let days = match (from_sunday, policy) {
        (0, SundayPolicy::Inclusive) => 0,
        (0, SundayPolicy::Exclusive) => 7,
        (n, _) => 7 - n,
    };
    date + Duration::days(i64::from(days))
}

/// `weeks` consecutive Sundays as ISO strings, starting at `next_sunday(from, policy)`.
pub fn upcoming_sundays(weeks: usize, from: NaiveDate, policy: SundayPolicy) -> Vec<String> {
    let first = next_sunday(from, policy);
    (0..weeks)
        .map(|i| format_date_iso(&(first + Duration::weeks(i as i64))))
        .collect()
}

/// The next `weeks` Sundays from today, counting today when it is a Sunday.
pub fn upcoming_sundays_from_today(weeks: usize) -> Vec<String> {
    upcoming_sundays(weeks, Local::now().date_naive(), SundayPolicy::Inclusive)
}

pub fn today_iso() -> String {
    format_date_iso(&Local::now().date_naive())
}

/// True when the whole of `date` (through 23:59:59.999) lies before `now`.
pub fn is_past_on(date: NaiveDate, now: NaiveDateTime) -> bool {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .is_some_and(|end_of_day| end_of_day < now)
}

/// Whether an ISO date string is entirely in the past, in local time.
///
/// Empty, missing, or malformed input is never past.
pub fn is_past_date(s: Option<&str>) -> bool {
    is_past_date_at(s, Local::now().naive_local())
}

pub fn is_past_date_at(s: Option<&str>, now: NaiveDateTime) -> bool {
    s.filter(|s| !s.is_empty())
        .and_then(parse_iso)
        .is_some_and(|date| is_past_on(date, now))
}

/// `M/D` without zero padding.
pub fn display_from_date(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Format an ISO date string as `M/D`.
///
/// Missing or empty input yields [`UNSCHEDULED`]; a string that is not an ISO
/// date is returned unchanged.
pub fn format_display(s: Option<&str>) -> String {
    match s.filter(|s| !s.is_empty()) {
        None => UNSCHEDULED.to_string(),
        Some(raw) => parse_iso(raw)
            .map(display_from_date)
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// One-character Korean weekday name.
pub fn korean_weekday(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_sunday() as usize]
}

/// Format an ISO date string as `M/D (요일)`; empty or malformed input yields `""`.
pub fn format_display_korean(s: Option<&str>) -> String {
    s.filter(|s| !s.is_empty())
        .and_then(parse_iso)
        .map(|date| {
            format!(
                "{} ({})",
                display_from_date(date),
                korean_weekday(date.weekday())
            )
        })
        .unwrap_or_default()
}
