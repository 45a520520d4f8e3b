//! Widget configuration as received from a UI layer.
//!
//! Field names and defaults follow the picker widgets' props: no bounds, no
//! blocks, day end granularity, zoom unlocked, date and time selectors both
//! shown. "Now" is never read here; callers pass it in so results stay
//! deterministic.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::blocklist::{Bounds, Constraints};
use crate::calendar::parse_instant;
use crate::error::{PickerError, Result};
use crate::granularity::{Granularity, Mode};
use crate::rules::{ingest_blocks, BlockRule, RawBlock};

/// Which selectors a date-time picker shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorMode {
    Date,
    Time,
    #[default]
    #[serde(alias = "date_time")]
    DateTime,
}

impl SelectorMode {
    pub fn includes_date(self) -> bool {
        matches!(self, SelectorMode::Date | SelectorMode::DateTime)
    }

    pub fn includes_time(self) -> bool {
        matches!(self, SelectorMode::Time | SelectorMode::DateTime)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    /// Initial value; `None` starts at the caller's "now".
    pub value: Option<String>,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub blocks: Vec<RawBlock>,
    /// Finest granularity of a final date pick.
    pub end_mode: Granularity,
    /// Lock the date grid at `end_mode`.
    pub fixed: bool,
    pub selector_mode: SelectorMode,
    /// Year the 12-year pages align on; defaults to the year of "now".
    pub reference_year: Option<i32>,
}

/// Date picker settings resolved from a [`PickerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePickerOptions {
    pub end: Granularity,
    pub fixed: bool,
    pub reference_year: i32,
}

impl PickerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PickerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no picker can run with: a time granularity as
    /// the end of a date grid, unparseable or inverted bounds, a reference
    /// year outside the calendar, or malformed blocks.
    pub fn validate(&self) -> Result<()> {
        if self.end_mode.mode() != Mode::Date {
            return Err(PickerError::InvalidConfig(format!(
                "endMode '{}' is not a date granularity",
                self.end_mode
            )));
        }
        let bounds = self.bounds()?;
        if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
            if min > max {
                return Err(PickerError::InvalidConfig(format!(
                    "minDate {} is after maxDate {}",
                    min, max
                )));
            }
        }
        if let Some(value) = &self.value {
            parse_instant(value)?;
        }
        if let Some(year) = self.reference_year {
            let supported = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
            if !supported.contains(&year) {
                return Err(PickerError::InvalidConfig(format!(
                    "referenceYear {} is outside {}..={}",
                    year,
                    supported.start(),
                    supported.end()
                )));
            }
        }
        self.rules()?;
        Ok(())
    }

    pub fn bounds(&self) -> Result<Bounds> {
        let min = self.min_date.as_deref().map(parse_instant).transpose()?;
        let max = self.max_date.as_deref().map(parse_instant).transpose()?;
        Ok(Bounds::new(min, max))
    }

    pub fn rules(&self) -> Result<Vec<BlockRule>> {
        ingest_blocks(&self.blocks)
    }

    pub fn constraints(&self) -> Result<Arc<Constraints>> {
        Ok(Constraints::new(self.bounds()?, self.rules()?)?.shared())
    }

    /// The configured value, or `now` when none is set.
    pub fn initial_value(&self, now: NaiveDateTime) -> Result<NaiveDateTime> {
        self.value
            .as_deref()
            .map(parse_instant)
            .transpose()
            .map(|value| value.unwrap_or(now))
    }

    pub fn date_options(&self, now: NaiveDateTime) -> DatePickerOptions {
        DatePickerOptions {
            end: self.end_mode,
            fixed: self.fixed,
            reference_year: self.reference_year.unwrap_or_else(|| now.year()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_widget_defaults() {
        let config = PickerConfig::from_json("{}").unwrap();
        assert_eq!(config.end_mode, Granularity::Day);
        assert!(!config.fixed);
        assert_eq!(config.selector_mode, SelectorMode::DateTime);
        assert!(config.blocks.is_empty());
    }

    #[test]
    fn camel_case_fields_are_read() {
        let json = r#"{
            "minDate": "2024-01-10",
            "endMode": "month",
            "selectorMode": "date",
            "blocks": [{"type": "weekday", "day": "Mon", "repeat": true}]
        }"#;
        let config = PickerConfig::from_json(json).unwrap();
        assert_eq!(config.end_mode, Granularity::Month);
        assert_eq!(config.selector_mode, SelectorMode::Date);
        assert!(config.bounds().unwrap().min.is_some());
        assert_eq!(config.rules().unwrap().len(), 1);
    }

    #[test]
    fn time_end_mode_is_rejected() {
        assert!(matches!(
            PickerConfig::from_json(r#"{"endMode": "minute"}"#),
            Err(PickerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let json = r#"{"minDate": "2024-02-01", "maxDate": "2024-01-01"}"#;
        assert!(PickerConfig::from_json(json).is_err());
    }

    #[test]
    fn reference_year_outside_the_calendar_is_rejected() {
        for year in [i32::MIN, i32::MAX, NaiveDate::MAX.year() + 1] {
            let json = format!(r#"{{"referenceYear": {}}}"#, year);
            assert!(matches!(
                PickerConfig::from_json(&json),
                Err(PickerError::InvalidConfig(_))
            ));
        }
        let config = PickerConfig::from_json(r#"{"referenceYear": 1900}"#).unwrap();
        assert_eq!(config.reference_year, Some(1900));
    }
}
