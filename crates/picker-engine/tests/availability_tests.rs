//! Tests for materialized spans and the availability indexes: the cached
//! answers must agree with direct evaluation, and grids must lay out the way
//! a calendar widget renders them.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use picker_engine::index::{year_grid, year_page_start, YEARS_PER_PAGE};
use picker_engine::{
    materialize, AvailabilityIndex, BlockRule, BlockedSpan, Bounds, CellKind, Constraints, Cycle,
    DateIndex, DayScope, Granularity, Mode, TimeIndex,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn constraints(bounds: Bounds, rules: Vec<BlockRule>) -> Arc<Constraints> {
    Constraints::new(bounds, rules).unwrap().shared()
}

fn span(from: NaiveDateTime, to: NaiveDateTime) -> BlockedSpan {
    BlockedSpan { from, to }
}

// ── Materialization ─────────────────────────────────────────────────────────

#[test]
fn overlapping_ranges_merge_into_one_span() {
    let rules = vec![
        BlockRule::time_range(hm(1, 0), hm(2, 0)),
        BlockRule::time_range(hm(1, 30), hm(2, 30)),
    ];
    let spans = materialize(&rules, date(2024, 3, 4));
    assert_eq!(spans, vec![span(at(2024, 3, 4, 1, 0), at(2024, 3, 4, 2, 30))]);
}

#[test]
fn disjoint_ranges_stay_sorted_and_separate() {
    let rules = vec![
        BlockRule::time_range(hm(15, 0), hm(16, 0)),
        BlockRule::time_range(hm(8, 0), hm(9, 0)),
    ];
    let spans = materialize(&rules, date(2024, 3, 4));
    assert_eq!(
        spans,
        vec![
            span(at(2024, 3, 4, 8, 0), at(2024, 3, 4, 9, 0)),
            span(at(2024, 3, 4, 15, 0), at(2024, 3, 4, 16, 0)),
        ]
    );
}

#[test]
fn adjacent_minutes_merge() {
    let rules = vec![
        BlockRule::time_range(hm(9, 0), hm(9, 59)),
        BlockRule::time_range(hm(10, 0), hm(10, 30)),
    ];
    let spans = materialize(&rules, date(2024, 3, 4));
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].minutes(), 91);
}

#[test]
fn wrapping_range_splits_at_midnight() {
    let rules = vec![BlockRule::time_range(hm(22, 0), hm(2, 0))];
    let spans = materialize(&rules, date(2024, 3, 4));
    assert_eq!(
        spans,
        vec![
            span(at(2024, 3, 4, 0, 0), at(2024, 3, 4, 2, 0)),
            span(at(2024, 3, 4, 22, 0), at(2024, 3, 4, 23, 59)),
        ]
    );
}

#[test]
fn scoped_ranges_materialize_only_on_their_days() {
    let rules = vec![BlockRule::FixedTimeRange {
        from: hm(12, 0),
        to: hm(13, 0),
        on: Some(DayScope::Weekday {
            weekday: Weekday::Mon,
        }),
    }];
    assert_eq!(materialize(&rules, date(2024, 3, 4)).len(), 1);
    assert!(materialize(&rules, date(2024, 3, 5)).is_empty());
}

// ── Date index ──────────────────────────────────────────────────────────────

#[test]
fn date_index_agrees_with_direct_evaluation() {
    let c = constraints(
        Bounds::new(Some(at(2024, 2, 10, 0, 0)), Some(at(2024, 11, 20, 0, 0))),
        vec![
            BlockRule::weekday(Weekday::Sat),
            BlockRule::month(2024, 6, false),
            BlockRule::fixed_date(date(2020, 12, 25), true),
        ],
    );
    let index = DateIndex::build_year(2024, &c);
    let mut day = date(2024, 1, 1);
    while day.year() == 2024 {
        let direct = c.is_disabled(day.and_time(NaiveTime::MIN), Granularity::Day);
        assert_eq!(index.is_day_disabled(day), Some(direct), "{day}");
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn month_is_disabled_iff_every_day_is() {
    let c = constraints(
        Bounds::new(Some(at(2024, 3, 31, 0, 0)), None),
        vec![BlockRule::month(2024, 5, false)],
    );
    let index = DateIndex::build_year(2024, &c);
    for month in index.months() {
        let all = month.days.iter().all(|cell| cell.disabled);
        assert_eq!(month.disabled, all, "month {}", month.month);
    }
    // March keeps only its last day.
    assert!(!index.month(3).unwrap().disabled);
    assert!(index.month(2).unwrap().disabled);
    assert!(index.month(5).unwrap().disabled);
}

#[test]
fn out_of_year_lookups_are_unanswered() {
    let index = DateIndex::build_year(2024, &Constraints::unconstrained());
    assert_eq!(index.is_day_disabled(date(2025, 1, 1)), None);
}

#[test]
fn day_grid_is_padded_to_whole_weeks() {
    let index = DateIndex::build_year(2024, &Constraints::unconstrained());
    for month in 1..=12 {
        let grid = index.day_grid(month);
        assert_eq!(grid.len() % 7, 0, "month {month}");
        let headers: Vec<_> = grid[..7].iter().map(|c| c.kind).collect();
        assert_eq!(headers[0], CellKind::Header(Weekday::Sun));
        assert_eq!(headers[6], CellKind::Header(Weekday::Sat));
        let values = grid.iter().filter(|c| c.kind == CellKind::Value).count();
        assert_eq!(values, index.month(month).unwrap().days.len());
        assert!(grid.iter().filter(|c| c.kind != CellKind::Value).all(|c| !c.is_selectable()));
    }
}

#[test]
fn february_of_leap_year_has_29_days() {
    let index = DateIndex::build_year(2024, &Constraints::unconstrained());
    assert_eq!(index.month(2).unwrap().days.len(), 29);
    let index = DateIndex::build_year(2023, &Constraints::unconstrained());
    assert_eq!(index.month(2).unwrap().days.len(), 28);
}

#[test]
fn month_grid_flags_fully_blocked_months() {
    let c = constraints(Bounds::default(), vec![BlockRule::month(2024, 7, true)]);
    let grid = DateIndex::build_year(2024, &c).month_grid();
    assert_eq!(grid.len(), 12);
    for cell in &grid {
        assert_eq!(cell.disabled, cell.value.month() == 7);
        assert_eq!(cell.value.day(), 1);
    }
}

#[test]
fn year_grid_covers_one_page() {
    let c = constraints(Bounds::new(None, Some(at(2030, 6, 1, 0, 0))), vec![BlockRule::year(2028)]);
    let index = DateIndex::build_year(2026, &c);
    let start = year_page_start(2026, 2026);
    let grid = year_grid(start, &index);
    assert_eq!(grid.len(), YEARS_PER_PAGE as usize);
    let disabled: Vec<i32> = grid.iter().filter(|c| c.disabled).map(|c| c.value.year()).collect();
    assert_eq!(disabled, vec![2028, 2031, 2032, 2033, 2034, 2035, 2036, 2037]);
}

#[test]
fn year_page_start_handles_extreme_reference_years() {
    assert_eq!(year_page_start(2024, i32::MIN), 2020);
    assert_eq!(year_page_start(2024, i32::MAX), 2023);
    for reference in [i32::MIN, -1, 0, 2024, i32::MAX] {
        let start = year_page_start(2024, reference);
        assert!((2024 - 11..=2024).contains(&start), "reference {}", reference);
    }

    let c = Constraints::unconstrained();
    let index = DateIndex::build_year(2024, &c);
    assert!(year_grid(i32::MAX - 3, &index).is_empty());
}

#[test]
fn index_freshness_tracks_year_and_constraints_identity() {
    let c = constraints(Bounds::default(), vec![]);
    let index = DateIndex::build(at(2024, 5, 1, 0, 0), &c);
    assert!(index.is_fresh_for(at(2024, 12, 31, 23, 59), &c));
    assert!(!index.is_fresh_for(at(2025, 1, 1, 0, 0), &c));
    // Equal but distinct constraints still invalidate.
    let copy = Arc::new((*c).clone());
    assert!(!index.is_fresh_for(at(2024, 5, 1, 0, 0), &copy));
}

// ── Time index ──────────────────────────────────────────────────────────────

#[test]
fn time_index_agrees_with_direct_evaluation() {
    let c = constraints(
        Bounds::new(Some(at(2024, 3, 4, 6, 30)), Some(at(2024, 3, 4, 21, 15))),
        vec![
            BlockRule::time_range(hm(12, 0), hm(13, 0)),
            BlockRule::time_range(hm(23, 0), hm(1, 0)),
        ],
    );
    let index = TimeIndex::build(at(2024, 3, 4, 9, 0), &c);
    for hour in index.hours() {
        for cell in &hour.minutes {
            let direct = c.is_disabled(cell.value, Granularity::Minute);
            assert_eq!(cell.disabled, direct, "{}", cell.value);
        }
    }
}

#[test]
fn all_day_block_disables_every_hour() {
    let c = constraints(Bounds::default(), vec![BlockRule::time_range(hm(0, 0), hm(23, 59))]);
    let index = TimeIndex::build(at(2024, 3, 4, 9, 0), &c);
    assert!(index.hours().iter().all(|h| h.disabled));
    assert!(index.cycle_column().iter().all(|c| c.disabled));
    assert!(index.hour_column(Cycle::Am).iter().all(|c| c.disabled));
}

#[test]
fn cycle_disabled_only_when_whole_half_is() {
    let c = constraints(Bounds::default(), vec![BlockRule::time_range(hm(0, 0), hm(11, 59))]);
    let index = TimeIndex::build(at(2024, 3, 4, 9, 0), &c);
    let cycles = index.cycle_column();
    assert_eq!(cycles.len(), 2);
    assert!(cycles[0].disabled);
    assert!(!cycles[1].disabled);
    assert_eq!(cycles[1].value.hour(), 12);
}

#[test]
fn minute_column_has_sixty_cells() {
    let c = constraints(Bounds::default(), vec![BlockRule::time_range(hm(10, 15), hm(10, 44))]);
    let index = TimeIndex::build(at(2024, 3, 4, 10, 0), &c);
    let minutes = index.minute_column(10);
    assert_eq!(minutes.len(), 60);
    let blocked = minutes.iter().filter(|m| m.disabled).count();
    assert_eq!(blocked, 30);
    assert!(!index.hour(10).unwrap().disabled);
    assert!(index.minute_column(24).is_empty());
}

#[test]
fn availability_index_dispatches_on_mode() {
    let c = Constraints::unconstrained();
    let anchor = at(2024, 3, 4, 9, 0);
    let date = AvailabilityIndex::build(anchor, Mode::Date, &c);
    let time = AvailabilityIndex::build(anchor, Mode::Time, &c);
    assert_eq!(date.mode(), Mode::Date);
    assert!(date.as_date().is_some() && date.as_time().is_none());
    assert_eq!(time.mode(), Mode::Time);
    assert!(time.is_fresh_for(at(2024, 3, 4, 23, 0), &c));
    assert!(!time.is_fresh_for(at(2024, 3, 5, 0, 0), &c));
}
