//! Block rules: declarative conditions that make instants unselectable.
//!
//! [`BlockRule`] is the closed, typed form every evaluator matches on.
//! [`RawBlock`] is the loosely-typed wire shape UI layers send
//! (`{"type": "weekday", "date": "2024-03-04", "repeat": true}`). It is
//! converted once, at ingestion, by [`ingest_blocks`], which rejects malformed
//! blocks up front so evaluation never has to.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{parse_instant, parse_time_of_day, time_to_minute};
use crate::error::{PickerError, Result};

/// A calendar condition on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DayScope {
    /// One date, or the same day and month every year when `repeats`.
    FixedDate { date: NaiveDate, repeats: bool },
    Weekday { weekday: Weekday },
    IsoWeek { year: i32, week: u32 },
    /// One month of one year, or the same month every year when `repeats`.
    Month { year: i32, month: u32, repeats: bool },
    Year { year: i32 },
}

impl DayScope {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DayScope::FixedDate { date: anchor, repeats: true } => {
                anchor.month() == date.month() && anchor.day() == date.day()
            }
            DayScope::FixedDate { date: anchor, repeats: false } => anchor == date,
            DayScope::Weekday { weekday } => date.weekday() == weekday,
            DayScope::IsoWeek { year, week } => {
                let iso = date.iso_week();
                iso.year() == year && iso.week() == week
            }
            DayScope::Month { year, month, repeats } => {
                date.month() == month && (repeats || date.year() == year)
            }
            DayScope::Year { year } => date.year() == year,
        }
    }

    /// Whether this condition covers the whole of `month` in `year`.
    pub fn covers_month(&self, year: i32, month: u32) -> bool {
        match *self {
            DayScope::Month { year: y, month: m, repeats } => m == month && (repeats || y == year),
            DayScope::Year { year: y } => y == year,
            _ => false,
        }
    }

    /// Whether this condition covers the whole of `year`.
    pub fn covers_year(&self, year: i32) -> bool {
        matches!(*self, DayScope::Year { year: y } if y == year)
    }
}

/// A declarative rule marking instants as unselectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockRule {
    FixedDate { date: NaiveDate, repeats: bool },
    Weekday { weekday: Weekday },
    IsoWeek { year: i32, week: u32 },
    Month { year: i32, month: u32, repeats: bool },
    Year { year: i32 },
    /// A time-of-day window, inclusive at both ends. Applies every day unless
    /// `on` restricts it. `from > to` wraps past midnight.
    FixedTimeRange {
        from: NaiveTime,
        to: NaiveTime,
        on: Option<DayScope>,
    },
}

impl BlockRule {
    pub fn fixed_date(date: NaiveDate, repeats: bool) -> Self {
        BlockRule::FixedDate { date, repeats }
    }

    pub fn weekday(weekday: Weekday) -> Self {
        BlockRule::Weekday { weekday }
    }

    /// The ISO week containing `date`.
    pub fn iso_week_of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        BlockRule::IsoWeek {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn month(year: i32, month: u32, repeats: bool) -> Self {
        BlockRule::Month {
            year,
            month,
            repeats,
        }
    }

    pub fn year(year: i32) -> Self {
        BlockRule::Year { year }
    }

    /// A daily window. Seconds are dropped; windows resolve to the minute.
    pub fn time_range(from: NaiveTime, to: NaiveTime) -> Self {
        BlockRule::FixedTimeRange {
            from: time_to_minute(from),
            to: time_to_minute(to),
            on: None,
        }
    }

    /// The calendar condition of a date-mode rule. `None` for time ranges.
    pub fn day_scope(&self) -> Option<DayScope> {
        match *self {
            BlockRule::FixedDate { date, repeats } => Some(DayScope::FixedDate { date, repeats }),
            BlockRule::Weekday { weekday } => Some(DayScope::Weekday { weekday }),
            BlockRule::IsoWeek { year, week } => Some(DayScope::IsoWeek { year, week }),
            BlockRule::Month {
                year,
                month,
                repeats,
            } => Some(DayScope::Month {
                year,
                month,
                repeats,
            }),
            BlockRule::Year { year } => Some(DayScope::Year { year }),
            BlockRule::FixedTimeRange { .. } => None,
        }
    }

    pub fn is_time_rule(&self) -> bool {
        matches!(self, BlockRule::FixedTimeRange { .. })
    }

    /// Check field ranges that the type system cannot.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let scope = match self {
            BlockRule::FixedTimeRange { on, .. } => *on,
            other => other.day_scope(),
        };
        match scope {
            Some(DayScope::IsoWeek { week, .. }) if !(1..=53).contains(&week) => {
                Err(format!("ISO week {} is out of range 1-53", week))
            }
            Some(DayScope::Month { month, .. }) if !(1..=12).contains(&month) => {
                Err(format!("month {} is out of range 1-12", month))
            }
            _ => Ok(()),
        }
    }
}

/// A time window as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTimeRange {
    pub from: String,
    pub to: String,
}

/// Loosely-typed block as sent by a UI layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Weekday name, accepted for `weekday` blocks in place of `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<RawTimeRange>,
    #[serde(default)]
    pub repeat: bool,
}

/// Convert raw blocks into typed rules, failing on the first malformed block.
///
/// A calendar block (`date`, `week`, `weekday`, `month`, `year`) without a
/// `time` window blocks whole days. With a `time` window it blocks only that
/// window, on the days the calendar condition matches. A `time` block blocks
/// its window every day.
pub fn ingest_blocks(blocks: &[RawBlock]) -> Result<Vec<BlockRule>> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let rule = ingest_block(block).map_err(|reason| PickerError::InvalidRule { index, reason })?;
            rule.validate()
                .map_err(|reason| PickerError::InvalidRule { index, reason })?;
            Ok(rule)
        })
        .collect()
}

/// Parse a JSON array of raw blocks and ingest it.
pub fn parse_blocks_json(json: &str) -> Result<Vec<BlockRule>> {
    let blocks: Vec<RawBlock> = serde_json::from_str(json)?;
    ingest_blocks(&blocks)
}

fn ingest_block(block: &RawBlock) -> std::result::Result<BlockRule, String> {
    let kind = block.kind.to_ascii_lowercase();

    let window = block
        .time
        .as_ref()
        .map(|range| -> std::result::Result<_, String> {
            let from = parse_time_of_day(&range.from).map_err(|e| e.to_string())?;
            let to = parse_time_of_day(&range.to).map_err(|e| e.to_string())?;
            Ok((time_to_minute(from), time_to_minute(to)))
        })
        .transpose()?;

    if kind == "time" {
        let (from, to) = window.ok_or("`time` block requires a `time` range")?;
        return Ok(BlockRule::FixedTimeRange { from, to, on: None });
    }

    let scope = day_scope_for(&kind, block)?;

    match window {
        Some((from, to)) => Ok(BlockRule::FixedTimeRange {
            from,
            to,
            on: Some(scope),
        }),
        None => Ok(match scope {
            DayScope::FixedDate { date, repeats } => BlockRule::FixedDate { date, repeats },
            DayScope::Weekday { weekday } => BlockRule::Weekday { weekday },
            DayScope::IsoWeek { year, week } => BlockRule::IsoWeek { year, week },
            DayScope::Month {
                year,
                month,
                repeats,
            } => BlockRule::Month {
                year,
                month,
                repeats,
            },
            DayScope::Year { year } => BlockRule::Year { year },
        }),
    }
}

/// Resolve the calendar condition of a block. The anchor date is `date`,
/// falling back to the date part of `time.from`.
fn day_scope_for(kind: &str, block: &RawBlock) -> std::result::Result<DayScope, String> {
    if kind == "weekday" {
        if let Some(name) = &block.day {
            let weekday = name
                .parse::<Weekday>()
                .map_err(|_| format!("unknown weekday '{}'", name))?;
            return Ok(DayScope::Weekday { weekday });
        }
    }

    let anchor = anchor_date(block)
        .ok_or_else(|| format!("`{}` block requires a `date` anchor", kind))??;

    match kind {
        "date" => Ok(DayScope::FixedDate {
            date: anchor,
            repeats: block.repeat,
        }),
        "week" => {
            let iso = anchor.iso_week();
            Ok(DayScope::IsoWeek {
                year: iso.year(),
                week: iso.week(),
            })
        }
        "weekday" => Ok(DayScope::Weekday {
            weekday: anchor.weekday(),
        }),
        "month" => Ok(DayScope::Month {
            year: anchor.year(),
            month: anchor.month(),
            repeats: block.repeat,
        }),
        "year" => Ok(DayScope::Year {
            year: anchor.year(),
        }),
        other => Err(format!("unknown block type '{}'", other)),
    }
}

fn anchor_date(block: &RawBlock) -> Option<std::result::Result<NaiveDate, String>> {
    if let Some(date) = &block.date {
        return Some(parse_instant(date).map(|dt| dt.date()).map_err(|e| e.to_string()));
    }
    // `time.from` only anchors a day when it is a full instant.
    let from = &block.time.as_ref()?.from;
    parse_instant(from).ok().map(|dt| Ok(dt.date()))
}
