//! Granularities, comparison precisions and the AM/PM cycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PickerError;

/// Which widget a granularity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Date,
    Time,
}

/// The unit a grid shows and a pick is interpreted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Year,
    Hour,
    Minute,
    Cycle,
}

/// The resolution at which two instants are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Day,
    Month,
    Year,
    Minute,
}

impl Granularity {
    pub fn mode(self) -> Mode {
        match self {
            Granularity::Day | Granularity::Week | Granularity::Month | Granularity::Year => {
                Mode::Date
            }
            Granularity::Hour | Granularity::Minute | Granularity::Cycle => Mode::Time,
        }
    }

    /// Comparison precision implied by this granularity.
    ///
    /// Week compares whole days; every time granularity compares minutes.
    pub fn precision(self) -> Precision {
        match self {
            Granularity::Day | Granularity::Week => Precision::Day,
            Granularity::Month => Precision::Month,
            Granularity::Year => Precision::Year,
            Granularity::Hour | Granularity::Minute | Granularity::Cycle => Precision::Minute,
        }
    }

    /// The next coarser date granularity a zoom-out leads to.
    pub fn coarser(self) -> Option<Granularity> {
        match self {
            Granularity::Day | Granularity::Week => Some(Granularity::Month),
            Granularity::Month => Some(Granularity::Year),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
            Granularity::Hour => "hour",
            Granularity::Minute => "minute",
            Granularity::Cycle => "cycle",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "date" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            "hour" => Ok(Granularity::Hour),
            "minute" | "min" => Ok(Granularity::Minute),
            "cycle" => Ok(Granularity::Cycle),
            other => Err(PickerError::InvalidConfig(format!(
                "unknown granularity '{}'",
                other
            ))),
        }
    }
}

/// AM/PM half of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cycle {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Cycle {
    pub fn of_hour(hour: u32) -> Cycle {
        if hour < 12 {
            Cycle::Am
        } else {
            Cycle::Pm
        }
    }

    /// The 24-hour clock hours covered by this half.
    pub fn hours(self) -> std::ops::Range<u32> {
        match self {
            Cycle::Am => 0..12,
            Cycle::Pm => 12..24,
        }
    }

    /// Map a 12-hour clock numeral (1..=12) onto a 24-hour clock hour.
    pub fn to_24h(self, numeral: u32) -> u32 {
        match (self, numeral) {
            (Cycle::Am, 12) => 0,
            (Cycle::Am, n) => n,
            (Cycle::Pm, 12) => 12,
            (Cycle::Pm, n) => n + 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cycle::Am => "AM",
            Cycle::Pm => "PM",
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cycle {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AM" => Ok(Cycle::Am),
            "PM" => Ok(Cycle::Pm),
            other => Err(PickerError::InvalidPick(format!("unknown cycle '{}'", other))),
        }
    }
}

/// Convert a 24-hour clock hour to its 12-hour numeral (0 → 12, 13 → 1).
pub fn twelve_hour_numeral(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_compares_at_day_precision() {
        assert_eq!(Granularity::Week.precision(), Precision::Day);
        assert_eq!(Granularity::Cycle.precision(), Precision::Minute);
    }

    #[test]
    fn twelve_hour_round_trip() {
        for hour in 0..24 {
            let cycle = Cycle::of_hour(hour);
            assert_eq!(cycle.to_24h(twelve_hour_numeral(hour)), hour);
        }
    }

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("Month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("fortnight".parse::<Granularity>().is_err());
    }
}
