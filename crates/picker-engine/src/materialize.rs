//! Expand time-range rules into concrete blocked spans on one calendar day.
//!
//! Every applicable [`BlockRule::FixedTimeRange`] is remapped onto the day,
//! split at midnight if it wraps, then sorted and merged so that the result is
//! a minimal, sorted list of disjoint spans. Spans are inclusive and minute
//! resolution, so `[09:00, 09:59]` and `[10:00, 10:30]` are adjacent and merge.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{time_to_minute, truncate_to_minute};
use crate::rules::BlockRule;

/// An inclusive blocked interval on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedSpan {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl BlockedSpan {
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        let t = truncate_to_minute(instant);
        self.from <= t && t <= self.to
    }

    /// Length in whole minutes, counting both ends.
    pub fn minutes(&self) -> i64 {
        (self.to - self.from).num_minutes() + 1
    }
}

/// Materialize the blocked spans of `date`.
pub fn materialize(rules: &[BlockRule], date: NaiveDate) -> Vec<BlockedSpan> {
    let last_minute = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);

    let mut spans: Vec<BlockedSpan> = Vec::new();
    for rule in rules {
        let BlockRule::FixedTimeRange { from, to, on } = rule else {
            continue;
        };
        if on.is_some_and(|scope| !scope.contains(date)) {
            continue;
        }
        let from = time_to_minute(*from);
        let to = time_to_minute(*to);
        if from <= to {
            spans.push(span_on(date, from, to));
        } else {
            spans.push(span_on(date, from, last_minute));
            spans.push(span_on(date, NaiveTime::MIN, to));
        }
    }

    if spans.is_empty() {
        return spans;
    }

    spans.sort_by_key(|span| (span.from, span.to));

    let mut merged: Vec<BlockedSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(last) = merged.last_mut() {
            if span.from <= last.to + Duration::minutes(1) {
                // Overlapping, contained or adjacent: grow the current span.
                last.to = last.to.max(span.to);
                continue;
            }
        }
        merged.push(span);
    }

    log::trace!("materialized {} blocked span(s) on {}", merged.len(), date);
    merged
}

/// Whether any span contains `instant`. Spans must come from [`materialize`].
pub fn spans_contain(spans: &[BlockedSpan], instant: NaiveDateTime) -> bool {
    let t = truncate_to_minute(instant);
    // Spans are sorted and disjoint, so the candidate is the last one that
    // starts at or before `t`.
    let idx = spans.partition_point(|span| span.from <= t);
    idx > 0 && spans[idx - 1].to >= t
}

fn span_on(date: NaiveDate, from: NaiveTime, to: NaiveTime) -> BlockedSpan {
    BlockedSpan {
        from: date.and_time(from),
        to: date.and_time(to),
    }
}
