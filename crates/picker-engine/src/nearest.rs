//! Find the closest selectable value to a disabled one.
//!
//! The search escalates through granularities. Dates go day → month → year
//! and only move forward in time. Times go minute → AM/PM half → whole day,
//! within the value's own day. Searches are bounded: dates look at most
//! [`YEAR_LOOKAHEAD`] years ahead, times never leave the day. `None` means no
//! selectable value exists inside that horizon.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::blocklist::Constraints;
use crate::granularity::{Cycle, Granularity, Mode};
use crate::index::{AvailabilityIndex, DateIndex, TimeIndex};

/// How many years past the current one a date search may look.
pub const YEAR_LOOKAHEAD: i32 = 12;

/// Nearest selectable value to `current`, or `current` itself when it is
/// already selectable.
///
/// `index` is reused when it covers `current` under `constraints`, otherwise a
/// transient index is built for the search.
pub fn find_nearest(
    current: NaiveDateTime,
    granularity: Granularity,
    index: &AvailabilityIndex,
    constraints: &Arc<Constraints>,
) -> Option<NaiveDateTime> {
    match (granularity.mode(), index) {
        (Mode::Date, AvailabilityIndex::Date(index)) => {
            find_nearest_date(current, granularity, index, constraints)
        }
        (Mode::Time, AvailabilityIndex::Time(index)) => {
            find_nearest_time(current, granularity, index, constraints)
        }
        (Mode::Date, AvailabilityIndex::Time(_)) => find_nearest_date(
            current,
            granularity,
            &DateIndex::build(current, constraints),
            constraints,
        ),
        (Mode::Time, AvailabilityIndex::Date(_)) => find_nearest_time(
            current,
            granularity,
            &TimeIndex::build(current, constraints),
            constraints,
        ),
    }
}

/// Date-mode search. Selectability is judged at day precision; the
/// time-of-day of `current` is carried over to the result.
pub fn find_nearest_date(
    current: NaiveDateTime,
    granularity: Granularity,
    index: &DateIndex,
    constraints: &Arc<Constraints>,
) -> Option<NaiveDateTime> {
    if !constraints.is_disabled(current, Granularity::Day) {
        return Some(current);
    }

    let index: Cow<'_, DateIndex> = if index.is_fresh_for(current, constraints) {
        Cow::Borrowed(index)
    } else {
        Cow::Owned(DateIndex::build(current, constraints))
    };

    let month = current.month();
    let next_day = current.day() + 1;

    let found = match granularity {
        Granularity::Day | Granularity::Week => index
            .month(month)
            .and_then(|m| m.first_enabled_from(next_day))
            .or_else(|| {
                log::debug!("no enabled day left in {}-{:02}, escalating to month", index.year(), month);
                search_months(&index, month + 1, 1)
            }),
        _ => search_months(&index, month, next_day),
    }
    .or_else(|| {
        log::debug!("no enabled month left in {}, escalating to year", index.year());
        search_years(index.year(), constraints)
    });

    match found {
        Some(date) => Some(date.and_time(current.time())),
        None => {
            log::warn!(
                "no selectable date within {} years of {}",
                YEAR_LOOKAHEAD,
                current.date()
            );
            None
        }
    }
}

/// Scan months `from_month..=12` of the indexed year. The first month is
/// scanned from `from_day`, later ones from the 1st.
fn search_months(index: &DateIndex, from_month: u32, from_day: u32) -> Option<chrono::NaiveDate> {
    index
        .months()
        .iter()
        .filter(|m| m.month >= from_month)
        .find_map(|m| {
            let start = if m.month == from_month { from_day } else { 1 };
            m.first_enabled_from(start)
        })
}

fn search_years(year: i32, constraints: &Arc<Constraints>) -> Option<chrono::NaiveDate> {
    (1..=YEAR_LOOKAHEAD).find_map(|offset| {
        let index = DateIndex::build_year(year + offset, constraints);
        search_months(&index, 1, 1)
    })
}

/// Time-mode search within the day of `current`, at minute precision.
///
/// - `Minute` scans the rest of the current hour, then escalates to `Cycle`.
/// - `Cycle` scans the hours of the current AM/PM half in order, then
///   escalates to `Hour`.
/// - `Hour` scans all 24 hours in order.
///
/// Each hour found is entered at its first enabled minute.
pub fn find_nearest_time(
    current: NaiveDateTime,
    granularity: Granularity,
    index: &TimeIndex,
    constraints: &Arc<Constraints>,
) -> Option<NaiveDateTime> {
    let index: Cow<'_, TimeIndex> = if index.is_fresh_for(current, constraints) {
        Cow::Borrowed(index)
    } else {
        Cow::Owned(TimeIndex::build(current, constraints))
    };

    if index.is_minute_disabled(current) == Some(false) {
        return Some(current);
    }

    let hour = current.hour();
    let cycle = Cycle::of_hour(hour);

    let minute_step = || {
        index
            .hour(hour)
            .and_then(|h| h.first_enabled_from(current.minute() + 1))
    };
    let cycle_step = || {
        log::debug!("escalating time search to the {} half of {}", cycle, index.day());
        first_enabled_in_hours(&index, cycle.hours())
    };
    let hour_step = || {
        log::debug!("escalating time search to every hour of {}", index.day());
        first_enabled_in_hours(&index, 0..24)
    };

    let found = match granularity {
        Granularity::Minute => minute_step().or_else(cycle_step).or_else(hour_step),
        Granularity::Cycle => cycle_step().or_else(hour_step),
        _ => hour_step(),
    };

    if found.is_none() {
        log::warn!("no selectable time on {}", index.day());
    }
    found
}

fn first_enabled_in_hours(
    index: &TimeIndex,
    hours: std::ops::Range<u32>,
) -> Option<NaiveDateTime> {
    hours
        .filter_map(|h| index.hour(h))
        .find_map(|h| h.first_enabled_from(0))
}
