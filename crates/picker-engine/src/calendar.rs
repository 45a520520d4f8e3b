//! Calendar-aware arithmetic on wall-clock instants.
//!
//! Every move that changes the month or year clamps the day-of-month to the
//! target month's length (31 January + 1 month = 28/29 February), never rolling
//! over into the following month.

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday,
};

use crate::error::{PickerError, Result};

/// Weekday header order of the day grid. The week starts on Sunday.
pub const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Build a date, clamping `day` into the month. `None` only for an invalid
/// month or a year outside chrono's range.
pub fn date_clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    if last == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// Replace the month, clamping the day.
pub fn with_month_clamped(value: NaiveDateTime, month: u32) -> Option<NaiveDateTime> {
    date_clamped(value.year(), month, value.day()).map(|d| d.and_time(value.time()))
}

/// Replace the year, clamping 29 February to the 28th in common years.
pub fn with_year_clamped(value: NaiveDateTime, year: i32) -> Option<NaiveDateTime> {
    date_clamped(year, value.month(), value.day()).map(|d| d.and_time(value.time()))
}

/// Shift by a signed number of months, clamping the day.
pub fn add_months(value: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let date = if months >= 0 {
        value.date().checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        value.date().checked_sub_months(Months::new(months.unsigned_abs()))
    }?;
    Some(date.and_time(value.time()))
}

pub fn add_years(value: NaiveDateTime, years: i32) -> Option<NaiveDateTime> {
    add_months(value, years.checked_mul(12)?)
}

/// Column of `weekday` in a Sunday-first grid (Sunday = 0).
pub fn weekday_column(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}

/// The Sunday that starts the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(time_to_minute(value.time()))
}

/// Drop seconds and sub-second precision from a time of day.
pub fn time_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(NaiveTime::MIN)
}

/// Parse an instant string.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DDTHH:MM`, RFC 3339 (the offset is
/// dropped and the local wall time kept) and a bare `YYYY-MM-DD` (midnight).
pub fn parse_instant(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|e| PickerError::InvalidInstant(format!("'{}': {}", s, e)))
}

/// Parse a time-of-day (`HH:MM` or `HH:MM:SS`), or take the time part of a
/// full instant string.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    for format in ["%H:%M", "%H:%M:%S"] {
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, format) {
            return Ok(t);
        }
    }
    parse_instant(trimmed).map(|dt| dt.time())
}
