//! Merge a picked unit into the selected value.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PickerError, Result};
use crate::granularity::{Cycle, Granularity};

/// Snapshot of a picker's view and committed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Decides which page of the grid is shown.
    pub anchor: NaiveDateTime,
    pub granularity: Granularity,
    /// `None` while a zoom-out has provisionally cleared the selection.
    pub selected: Option<NaiveDateTime>,
}

/// Result of reducing one pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub value: NaiveDateTime,
    /// The granularity the pick was made at.
    pub granularity: Granularity,
    pub is_final: bool,
}

/// A pick in one of the time columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "column", content = "value", rename_all = "lowercase")]
pub enum TimePick {
    /// 12-hour clock numeral, 1 to 12.
    Hour(u32),
    Minute(u32),
    Cycle(Cycle),
}

impl TimePick {
    pub fn granularity(&self) -> Granularity {
        match self {
            TimePick::Hour(_) => Granularity::Hour,
            TimePick::Minute(_) => Granularity::Minute,
            TimePick::Cycle(_) => Granularity::Cycle,
        }
    }
}

/// Reduce a date-grid pick made at granularity `at`.
///
/// Day and week picks take the picked date. Month picks combine the anchor's
/// year with the picked month, on the 1st. Year picks land on 1 January. The
/// time-of-day always comes from `existing`, which a paired time picker owns.
pub fn select_date(
    existing: NaiveDateTime,
    anchor: NaiveDateTime,
    picked: NaiveDateTime,
    at: Granularity,
    end: Granularity,
) -> Result<Selection> {
    let date = match at {
        Granularity::Day | Granularity::Week => Some(picked.date()),
        Granularity::Month => NaiveDate::from_ymd_opt(anchor.year(), picked.month(), 1),
        Granularity::Year => NaiveDate::from_ymd_opt(picked.year(), 1, 1),
        other => {
            return Err(PickerError::InvalidPick(format!(
                "'{}' is not a date granularity",
                other
            )))
        }
    }
    .ok_or_else(|| PickerError::InvalidPick(format!("no date for pick {}", picked)))?;

    Ok(Selection {
        value: date.and_time(existing.time()),
        granularity: at,
        is_final: at == end,
    })
}

/// Reduce a time-column pick. Time picks are always final.
pub fn select_time(existing: NaiveDateTime, pick: TimePick) -> Result<Selection> {
    let value = match pick {
        TimePick::Hour(numeral) => {
            if !(1..=12).contains(&numeral) {
                return Err(PickerError::InvalidPick(format!(
                    "hour numeral {} is out of range 1-12",
                    numeral
                )));
            }
            let hour = Cycle::of_hour(existing.hour()).to_24h(numeral);
            existing.with_hour(hour)
        }
        TimePick::Minute(minute) => existing
            .with_minute(minute)
            .and_then(|t| t.with_second(0)),
        TimePick::Cycle(cycle) => {
            let current = Cycle::of_hour(existing.hour());
            Some(match (current, cycle) {
                (a, b) if a == b => existing,
                (Cycle::Am, Cycle::Pm) => existing + Duration::hours(12),
                _ => existing - Duration::hours(12),
            })
        }
    }
    .ok_or_else(|| PickerError::InvalidPick(format!("{:?} is out of range", pick)))?;

    Ok(Selection {
        value,
        granularity: pick.granularity(),
        is_final: true,
    })
}
