//! Precomputed availability per calendar unit, and the grids built from it.
//!
//! A [`DateIndex`] covers one year: twelve months of day cells, each month
//! flagged `disabled` when none of its days can be picked. A [`TimeIndex`]
//! covers one day: twenty-four hours of minute cells, each hour flagged the same
//! way. Indexes are built whole and never mutated. When the anchor leaves the
//! covered year/day, or the constraints are replaced, callers build a new one
//! and swap it in.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::blocklist::Constraints;
use crate::calendar::{days_in_month, first_of_month, weekday_column, WEEK_ORDER};
use crate::granularity::{Cycle, Granularity, Mode};
use crate::materialize::{materialize, spans_contain, BlockedSpan};

/// Number of years shown on one page of the year grid.
pub const YEARS_PER_PAGE: i32 = 12;

/// What a grid position holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "weekday", rename_all = "lowercase")]
pub enum CellKind {
    /// Weekday column header of the day grid.
    Header(Weekday),
    /// A pickable date or time value.
    Value,
    /// Filler aligning the first and last day under the right weekday.
    Empty,
}

/// One renderable grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: NaiveDateTime,
    pub kind: CellKind,
    pub disabled: bool,
}

impl Cell {
    fn value(value: NaiveDateTime, disabled: bool) -> Self {
        Self {
            value,
            kind: CellKind::Value,
            disabled,
        }
    }

    fn filler(value: NaiveDateTime, kind: CellKind) -> Self {
        Self {
            value,
            kind,
            disabled: true,
        }
    }

    /// Only enabled value cells can be picked.
    pub fn is_selectable(&self) -> bool {
        self.kind == CellKind::Value && !self.disabled
    }
}

/// Day availability of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthAvailability {
    pub month: u32,
    /// One cell per day, at midnight.
    pub days: Vec<Cell>,
    /// True iff no day of the month is enabled.
    pub disabled: bool,
    /// Empty cells before day 1 in a Sunday-first, 7-column grid.
    pub leading_blanks: usize,
    /// Empty cells after the last day to complete its row.
    pub trailing_blanks: usize,
}

impl MonthAvailability {
    fn build(year: i32, month: u32, constraints: &Constraints) -> Option<Self> {
        let first = first_of_month(year, month)?;
        let len = days_in_month(year, month);

        let days: Vec<Cell> = first
            .iter_days()
            .take(len as usize)
            .map(|date| {
                let value = date.and_time(NaiveTime::MIN);
                Cell::value(value, constraints.is_disabled(value, Granularity::Day))
            })
            .collect();

        let leading_blanks = weekday_column(first.weekday());
        let trailing_blanks = (7 - (leading_blanks + days.len()) % 7) % 7;

        Some(Self {
            month,
            disabled: days.iter().all(|c| c.disabled),
            days,
            leading_blanks,
            trailing_blanks,
        })
    }

    /// First enabled day on or after `day` (1-based).
    pub fn first_enabled_from(&self, day: u32) -> Option<NaiveDate> {
        if self.disabled {
            return None;
        }
        self.days
            .iter()
            .skip(day.saturating_sub(1) as usize)
            .find(|c| !c.disabled)
            .map(|c| c.value.date())
    }
}

/// Availability of every day of one year.
#[derive(Debug, Clone)]
pub struct DateIndex {
    year: i32,
    months: Vec<MonthAvailability>,
    constraints: Arc<Constraints>,
}

impl DateIndex {
    /// Build the index for the year containing `anchor`.
    pub fn build(anchor: NaiveDateTime, constraints: &Arc<Constraints>) -> Self {
        Self::build_year(anchor.year(), constraints)
    }

    pub fn build_year(year: i32, constraints: &Arc<Constraints>) -> Self {
        let months = (1..=12)
            .filter_map(|month| MonthAvailability::build(year, month, constraints))
            .collect();
        log::debug!("built date availability index for {}", year);
        Self {
            year,
            months,
            constraints: Arc::clone(constraints),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn months(&self) -> &[MonthAvailability] {
        &self.months
    }

    /// Availability of `month` (1-12).
    pub fn month(&self, month: u32) -> Option<&MonthAvailability> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn constraints(&self) -> &Arc<Constraints> {
        &self.constraints
    }

    /// Whether this index still answers for `anchor` under `constraints`.
    pub fn is_fresh_for(&self, anchor: NaiveDateTime, constraints: &Arc<Constraints>) -> bool {
        self.year == anchor.year() && Arc::ptr_eq(&self.constraints, constraints)
    }

    pub fn has_enabled_day(&self) -> bool {
        self.months.iter().any(|m| !m.disabled)
    }

    /// Cached day availability. `None` when `date` is outside the indexed year.
    pub fn is_day_disabled(&self, date: NaiveDate) -> Option<bool> {
        if date.year() != self.year {
            return None;
        }
        let month = self.month(date.month())?;
        month.days.get(date.day0() as usize).map(|c| c.disabled)
    }

    /// The 7-column day grid of `month`: weekday headers, leading blanks,
    /// days, trailing blanks.
    pub fn day_grid(&self, month: u32) -> Vec<Cell> {
        let Some(availability) = self.month(month) else {
            return Vec::new();
        };
        let Some(first) = first_of_month(self.year, month) else {
            return Vec::new();
        };
        let first = first.and_time(NaiveTime::MIN);

        let mut cells = Vec::with_capacity(
            WEEK_ORDER.len()
                + availability.leading_blanks
                + availability.days.len()
                + availability.trailing_blanks,
        );
        cells.extend(
            WEEK_ORDER
                .iter()
                .map(|&weekday| Cell::filler(first, CellKind::Header(weekday))),
        );
        cells.extend((0..availability.leading_blanks).map(|_| Cell::filler(first, CellKind::Empty)));
        cells.extend(availability.days.iter().copied());
        cells.extend((0..availability.trailing_blanks).map(|_| Cell::filler(first, CellKind::Empty)));
        cells
    }

    /// Twelve month cells; a month is disabled when none of its days is enabled.
    pub fn month_grid(&self) -> Vec<Cell> {
        self.months
            .iter()
            .filter_map(|m| {
                let first = first_of_month(self.year, m.month)?;
                Some(Cell::value(first.and_time(NaiveTime::MIN), m.disabled))
            })
            .collect()
    }
}

/// First year of the 12-year page containing `anchor_year`.
///
/// Pages are aligned on `reference_year` (usually the current year), so the
/// reference year always opens its page. The result is never more than a page
/// before `anchor_year`, whatever the reference year.
pub fn year_page_start(anchor_year: i32, reference_year: i32) -> i32 {
    let (anchor, reference, page) = (
        i64::from(anchor_year),
        i64::from(reference_year),
        i64::from(YEARS_PER_PAGE),
    );
    let start = reference + (anchor - reference).div_euclid(page) * page;
    i32::try_from(start).unwrap_or(anchor_year)
}

/// Twelve year cells starting at `page_start`. A year is disabled when none
/// of its days is enabled. `index` is reused for its own year.
pub fn year_grid(page_start: i32, index: &DateIndex) -> Vec<Cell> {
    let constraints = index.constraints();
    (page_start..page_start.saturating_add(YEARS_PER_PAGE))
        .filter_map(|year| {
            let jan1 = first_of_month(year, 1)?.and_time(NaiveTime::MIN);
            let disabled = if constraints.is_disabled(jan1, Granularity::Year) {
                true
            } else if year == index.year() {
                !index.has_enabled_day()
            } else {
                !DateIndex::build_year(year, constraints).has_enabled_day()
            };
            Some(Cell::value(jan1, disabled))
        })
        .collect()
}

/// Minute availability of one hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourAvailability {
    pub hour: u32,
    /// One cell per minute.
    pub minutes: Vec<Cell>,
    /// True iff no minute of the hour is enabled.
    pub disabled: bool,
}

impl HourAvailability {
    /// First enabled minute on or after `minute`.
    pub fn first_enabled_from(&self, minute: u32) -> Option<NaiveDateTime> {
        if self.disabled {
            return None;
        }
        self.minutes
            .iter()
            .skip(minute as usize)
            .find(|c| !c.disabled)
            .map(|c| c.value)
    }
}

/// Availability of every minute of one day.
#[derive(Debug, Clone)]
pub struct TimeIndex {
    day: NaiveDate,
    hours: Vec<HourAvailability>,
    spans: Vec<BlockedSpan>,
    constraints: Arc<Constraints>,
}

impl TimeIndex {
    /// Build the index for the day containing `anchor`.
    pub fn build(anchor: NaiveDateTime, constraints: &Arc<Constraints>) -> Self {
        let day = anchor.date();
        let spans = materialize(&constraints.rules, day);
        let bounds = constraints.bounds;

        let hours = (0..24)
            .map(|hour| {
                let minutes: Vec<Cell> = (0..60)
                    .filter_map(|minute| {
                        let value = day.and_hms_opt(hour, minute, 0)?;
                        let disabled = bounds.excludes(value, Granularity::Minute.precision())
                            || spans_contain(&spans, value);
                        Some(Cell::value(value, disabled))
                    })
                    .collect();
                HourAvailability {
                    hour,
                    disabled: minutes.iter().all(|c| c.disabled),
                    minutes,
                }
            })
            .collect();

        log::debug!("built time availability index for {} ({} span(s))", day, spans.len());
        Self {
            day,
            hours,
            spans,
            constraints: Arc::clone(constraints),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn hours(&self) -> &[HourAvailability] {
        &self.hours
    }

    pub fn hour(&self, hour: u32) -> Option<&HourAvailability> {
        self.hours.get(hour as usize)
    }

    /// The blocked spans this index was built from.
    pub fn spans(&self) -> &[BlockedSpan] {
        &self.spans
    }

    pub fn constraints(&self) -> &Arc<Constraints> {
        &self.constraints
    }

    pub fn is_fresh_for(&self, anchor: NaiveDateTime, constraints: &Arc<Constraints>) -> bool {
        self.day == anchor.date() && Arc::ptr_eq(&self.constraints, constraints)
    }

    /// Cached minute availability. `None` when `instant` is on another day.
    pub fn is_minute_disabled(&self, instant: NaiveDateTime) -> Option<bool> {
        if instant.date() != self.day {
            return None;
        }
        self.hour(instant.hour())?
            .minutes
            .get(instant.minute() as usize)
            .map(|c| c.disabled)
    }

    /// The hour column for `cycle`: twelve cells for the numerals 1 to 12, in
    /// that order.
    pub fn hour_column(&self, cycle: Cycle) -> Vec<Cell> {
        (1..=12)
            .filter_map(|numeral| {
                let hour = cycle.to_24h(numeral);
                let availability = self.hour(hour)?;
                let value = self.day.and_hms_opt(hour, 0, 0)?;
                Some(Cell::value(value, availability.disabled))
            })
            .collect()
    }

    /// The sixty minute cells of `hour`.
    pub fn minute_column(&self, hour: u32) -> Vec<Cell> {
        self.hour(hour)
            .map(|h| h.minutes.clone())
            .unwrap_or_default()
    }

    /// AM and PM cells; a half is disabled when all its hours are.
    pub fn cycle_column(&self) -> Vec<Cell> {
        [Cycle::Am, Cycle::Pm]
            .into_iter()
            .filter_map(|cycle| {
                let start = cycle.hours().start;
                let value = self.day.and_hms_opt(start, 0, 0)?;
                let disabled = cycle
                    .hours()
                    .all(|hour| self.hour(hour).is_none_or(|h| h.disabled));
                Some(Cell::value(value, disabled))
            })
            .collect()
    }
}

/// Either kind of index, for callers that switch on the widget mode.
#[derive(Debug, Clone)]
pub enum AvailabilityIndex {
    Date(DateIndex),
    Time(TimeIndex),
}

impl AvailabilityIndex {
    pub fn build(anchor: NaiveDateTime, mode: Mode, constraints: &Arc<Constraints>) -> Self {
        match mode {
            Mode::Date => AvailabilityIndex::Date(DateIndex::build(anchor, constraints)),
            Mode::Time => AvailabilityIndex::Time(TimeIndex::build(anchor, constraints)),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            AvailabilityIndex::Date(_) => Mode::Date,
            AvailabilityIndex::Time(_) => Mode::Time,
        }
    }

    pub fn is_fresh_for(&self, anchor: NaiveDateTime, constraints: &Arc<Constraints>) -> bool {
        match self {
            AvailabilityIndex::Date(index) => index.is_fresh_for(anchor, constraints),
            AvailabilityIndex::Time(index) => index.is_fresh_for(anchor, constraints),
        }
    }

    pub fn as_date(&self) -> Option<&DateIndex> {
        match self {
            AvailabilityIndex::Date(index) => Some(index),
            AvailabilityIndex::Time(_) => None,
        }
    }

    pub fn as_time(&self) -> Option<&TimeIndex> {
        match self {
            AvailabilityIndex::Time(index) => Some(index),
            AvailabilityIndex::Date(_) => None,
        }
    }
}
