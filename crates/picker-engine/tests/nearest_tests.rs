//! Tests for nearest-selectable-value search in both modes.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use picker_engine::rules::parse_blocks_json;
use picker_engine::{
    find_nearest, AvailabilityIndex, BlockRule, Bounds, Constraints, Granularity, Mode, TimeIndex,
    YEAR_LOOKAHEAD,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn constraints(bounds: Bounds, rules: Vec<BlockRule>) -> Arc<Constraints> {
    Constraints::new(bounds, rules).unwrap().shared()
}

fn nearest(current: NaiveDateTime, granularity: Granularity, c: &Arc<Constraints>) -> Option<NaiveDateTime> {
    let index = AvailabilityIndex::build(current, granularity.mode(), c);
    find_nearest(current, granularity, &index, c)
}

// ── Date mode ───────────────────────────────────────────────────────────────

#[test]
fn selectable_value_is_returned_unchanged() {
    let c = Constraints::unconstrained();
    let value = at(2024, 3, 5, 10, 20);
    assert_eq!(nearest(value, Granularity::Day, &c), Some(value));
}

#[test]
fn value_before_min_moves_to_min() {
    let c = constraints(Bounds::new(Some(at(2024, 1, 10, 0, 0)), None), vec![]);
    let found = nearest(at(2024, 1, 5, 0, 0), Granularity::Day, &c);
    assert_eq!(found, Some(at(2024, 1, 10, 0, 0)));
}

#[test]
fn blocked_monday_moves_to_tuesday() {
    let c = constraints(Bounds::default(), vec![BlockRule::weekday(Weekday::Mon)]);
    let found = nearest(at(2024, 3, 4, 0, 0), Granularity::Day, &c);
    assert_eq!(found, Some(at(2024, 3, 5, 0, 0)));
}

#[test]
fn end_of_month_escalates_to_next_month() {
    // Everything from the 30th onward in March is blocked, and April 1 too.
    let c = constraints(
        Bounds::default(),
        vec![
            BlockRule::fixed_date(NaiveDate::from_ymd_opt(2024, 3, 30).unwrap(), false),
            BlockRule::fixed_date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), false),
            BlockRule::fixed_date(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), false),
        ],
    );
    let found = nearest(at(2024, 3, 30, 7, 0), Granularity::Day, &c);
    assert_eq!(found, Some(at(2024, 4, 2, 7, 0)));
}

#[test]
fn blocked_rest_of_year_escalates_to_next_year() {
    let c = constraints(
        Bounds::default(),
        vec![BlockRule::month(2024, 11, false), BlockRule::month(2024, 12, false)],
    );
    let found = nearest(at(2024, 11, 3, 0, 0), Granularity::Day, &c);
    assert_eq!(found, Some(at(2025, 1, 1, 0, 0)));
}

#[test]
fn month_granularity_searches_remaining_days_of_the_month() {
    let c = constraints(Bounds::default(), vec![BlockRule::weekday(Weekday::Wed)]);
    // 2024-03-06 is a Wednesday.
    let found = nearest(at(2024, 3, 6, 0, 0), Granularity::Month, &c);
    assert_eq!(found, Some(at(2024, 3, 7, 0, 0)));
}

#[test]
fn date_search_never_moves_backward() {
    let c = constraints(Bounds::new(None, Some(at(2024, 6, 1, 0, 0))), vec![]);
    assert_eq!(nearest(at(2024, 6, 2, 0, 0), Granularity::Day, &c), None);
}

#[test]
fn date_search_gives_up_past_lookahead() {
    let years: Vec<BlockRule> = (2024..=2024 + YEAR_LOOKAHEAD).map(BlockRule::year).collect();
    let c = constraints(Bounds::default(), years);
    assert_eq!(nearest(at(2024, 1, 1, 0, 0), Granularity::Day, &c), None);

    let years: Vec<BlockRule> = (2024..2024 + YEAR_LOOKAHEAD).map(BlockRule::year).collect();
    let c = constraints(Bounds::default(), years);
    assert_eq!(
        nearest(at(2024, 1, 1, 0, 0), Granularity::Day, &c),
        Some(at(2024 + YEAR_LOOKAHEAD, 1, 1, 0, 0))
    );
}

#[test]
fn mismatched_index_is_rebuilt_for_the_search() {
    let c = constraints(Bounds::default(), vec![BlockRule::weekday(Weekday::Mon)]);
    let time_index = AvailabilityIndex::build(at(2024, 3, 4, 0, 0), Mode::Time, &c);
    let found = find_nearest(at(2024, 3, 4, 0, 0), Granularity::Day, &time_index, &c);
    assert_eq!(found, Some(at(2024, 3, 5, 0, 0)));
}

// ── Time mode ───────────────────────────────────────────────────────────────

#[test]
fn minute_search_stays_in_the_hour_when_possible() {
    let c = constraints(Bounds::default(), vec![BlockRule::time_range(hm(10, 0), hm(10, 20))]);
    let found = nearest(at(2024, 3, 4, 10, 5), Granularity::Minute, &c);
    assert_eq!(found, Some(at(2024, 3, 4, 10, 21)));
}

#[test]
fn cycle_search_scans_the_half_then_the_day() {
    let c = constraints(Bounds::default(), vec![BlockRule::time_range(hm(0, 0), hm(11, 59))]);
    let found = nearest(at(2024, 3, 4, 9, 0), Granularity::Cycle, &c);
    assert_eq!(found, Some(at(2024, 3, 4, 12, 0)));
}

#[test]
fn hour_search_takes_first_enabled_minute_of_the_day() {
    let c = constraints(
        Bounds::new(Some(at(2024, 3, 4, 8, 45)), None),
        vec![BlockRule::time_range(hm(14, 0), hm(15, 0))],
    );
    let found = nearest(at(2024, 3, 4, 14, 30), Granularity::Hour, &c);
    assert_eq!(found, Some(at(2024, 3, 4, 8, 45)));
}

#[test]
fn all_day_block_has_no_nearest_time() {
    let c = constraints(Bounds::default(), vec![BlockRule::time_range(hm(0, 0), hm(23, 59))]);
    assert_eq!(nearest(at(2024, 3, 4, 9, 0), Granularity::Hour, &c), None);
    assert_eq!(nearest(at(2024, 3, 4, 9, 0), Granularity::Minute, &c), None);
}

#[test]
fn time_search_never_leaves_the_day() {
    let c = constraints(Bounds::new(Some(at(2024, 3, 5, 0, 0)), None), vec![]);
    assert_eq!(nearest(at(2024, 3, 4, 12, 0), Granularity::Hour, &c), None);
}

#[test]
fn window_with_seconds_resolves_to_the_minute() {
    let rules = parse_blocks_json(r#"[{"type": "time", "time": {"from": "09:00:30", "to": "09:10"}}]"#).unwrap();
    assert_eq!(rules, vec![BlockRule::time_range(hm(9, 0), hm(9, 10))]);
    let c = constraints(Bounds::default(), rules);
    let index = TimeIndex::build(at(2024, 3, 4, 9, 0), &c);

    for minute in [at(2024, 3, 4, 8, 59), at(2024, 3, 4, 9, 0), at(2024, 3, 4, 9, 10), at(2024, 3, 4, 9, 11)] {
        assert_eq!(
            c.is_disabled(minute, Granularity::Minute),
            index.is_minute_disabled(minute).unwrap(),
            "{}",
            minute
        );
    }
    assert!(c.is_disabled(at(2024, 3, 4, 9, 0), Granularity::Minute));
    assert_eq!(nearest(at(2024, 3, 4, 9, 0), Granularity::Minute, &c), Some(at(2024, 3, 4, 9, 11)));
    assert_eq!(nearest(at(2024, 3, 4, 8, 59), Granularity::Minute, &c), Some(at(2024, 3, 4, 8, 59)));
}

#[test]
fn hand_built_window_with_seconds_agrees_with_the_index() {
    let rule = BlockRule::FixedTimeRange {
        from: NaiveTime::from_hms_opt(9, 0, 30).unwrap(),
        to: NaiveTime::from_hms_opt(9, 10, 45).unwrap(),
        on: None,
    };
    let c = constraints(Bounds::default(), vec![rule]);
    let index = TimeIndex::build(at(2024, 3, 4, 9, 0), &c);

    assert!(c.is_disabled(at(2024, 3, 4, 9, 0), Granularity::Minute));
    assert_eq!(index.is_minute_disabled(at(2024, 3, 4, 9, 0)), Some(true));
    assert!(c.is_disabled(at(2024, 3, 4, 9, 10), Granularity::Minute));
    assert!(!c.is_disabled(at(2024, 3, 4, 9, 11), Granularity::Minute));
    assert_eq!(index.is_minute_disabled(at(2024, 3, 4, 9, 11)), Some(false));
}
