//! Decide whether an instant is selectable under bounds and block rules.
//!
//! Evaluation is precision-gated: the granularity picks the resolution the
//! bounds are compared at and the rule kinds allowed to fire. Calendar rules
//! only fire for date comparisons, time ranges only for minute comparisons.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime};

use crate::calendar::{time_to_minute, truncate_to_minute};
use crate::error::{PickerError, Result};
use crate::granularity::{Granularity, Precision};
use crate::rules::BlockRule;

/// Optional inclusive bounds on the selectable range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
}

impl Bounds {
    pub fn new(min: Option<NaiveDateTime>, max: Option<NaiveDateTime>) -> Self {
        Self { min, max }
    }

    /// Whether `instant` lies outside the bounds at `precision`.
    pub fn excludes(&self, instant: NaiveDateTime, precision: Precision) -> bool {
        let before_min = self
            .min
            .is_some_and(|min| compare_at(instant, min, precision) == Ordering::Less);
        let after_max = self
            .max
            .is_some_and(|max| compare_at(instant, max, precision) == Ordering::Greater);
        before_min || after_max
    }
}

/// Bounds plus rules: everything that decides availability.
///
/// Shared as `Arc<Constraints>`; caches compare the `Arc` by pointer to tell
/// whether they were built from the constraints currently in force.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub bounds: Bounds,
    pub rules: Vec<BlockRule>,
}

impl Constraints {
    /// Bundle bounds and rules, rejecting the first rule with an out-of-range
    /// field (month 13, ISO week 54).
    pub fn new(bounds: Bounds, rules: Vec<BlockRule>) -> Result<Self> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate()
                .map_err(|reason| PickerError::InvalidRule { index, reason })?;
        }
        Ok(Self { bounds, rules })
    }

    pub fn unconstrained() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_disabled(&self, instant: NaiveDateTime, granularity: Granularity) -> bool {
        is_disabled(instant, granularity, &self.bounds, &self.rules)
    }
}

/// Compare two instants at `precision`.
pub fn compare_at(a: NaiveDateTime, b: NaiveDateTime, precision: Precision) -> Ordering {
    match precision {
        Precision::Day => a.date().cmp(&b.date()),
        Precision::Month => (a.year(), a.month()).cmp(&(b.year(), b.month())),
        Precision::Year => a.year().cmp(&b.year()),
        Precision::Minute => truncate_to_minute(a).cmp(&truncate_to_minute(b)),
    }
}

/// Whether `instant` is unselectable at `granularity`.
///
/// Out-of-bounds instants are always disabled. Otherwise the first rule that
/// fires at this precision disables the instant.
pub fn is_disabled(
    instant: NaiveDateTime,
    granularity: Granularity,
    bounds: &Bounds,
    rules: &[BlockRule],
) -> bool {
    let precision = granularity.precision();
    if bounds.excludes(instant, precision) {
        return true;
    }
    rules.iter().any(|rule| rule_fires(rule, instant, precision))
}

fn rule_fires(rule: &BlockRule, instant: NaiveDateTime, precision: Precision) -> bool {
    match (rule, precision) {
        (BlockRule::FixedTimeRange { from, to, on }, Precision::Minute) => {
            if on.is_some_and(|scope| !scope.contains(instant.date())) {
                return false;
            }
            // Rules resolve to the minute, like the spans built from them.
            let time = time_to_minute(instant.time());
            let (from, to) = (time_to_minute(*from), time_to_minute(*to));
            if from <= to {
                from <= time && time <= to
            } else {
                // Wraps past midnight.
                time >= from || time <= to
            }
        }
        (BlockRule::FixedTimeRange { .. }, _) | (_, Precision::Minute) => false,
        (rule, Precision::Day) => rule
            .day_scope()
            .is_some_and(|scope| scope.contains(instant.date())),
        (rule, Precision::Month) => rule
            .day_scope()
            .is_some_and(|scope| scope.covers_month(instant.year(), instant.month())),
        (rule, Precision::Year) => rule
            .day_scope()
            .is_some_and(|scope| scope.covers_year(instant.year())),
    }
}
