//! WASM bindings for picker-engine.
//!
//! Exposes availability checks, nearest-value search, grid rendering and
//! block ingestion to JavaScript via `wasm-bindgen`. Every call is stateless:
//! the widget configuration travels as the same JSON object the picker
//! components take as props (`value`, `minDate`, `maxDate`, `blocks`, ...), and
//! results come back as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p picker-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/picker-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/picker_engine_wasm.wasm
//! ```

use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};
use picker_engine::calendar::parse_instant;
use picker_engine::index::{year_grid, year_page_start};
use picker_engine::{
    find_nearest, materialize, AvailabilityIndex, BlockRule, BlockedSpan, Cell, CellKind, Cycle,
    DateIndex, Granularity, PickerConfig, PickerError, TimeIndex,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

type Result<T> = std::result::Result<T, PickerError>;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CellDto {
    value: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    weekday: Option<String>,
    disabled: bool,
}

impl From<&Cell> for CellDto {
    fn from(cell: &Cell) -> Self {
        let (kind, weekday) = match cell.kind {
            CellKind::Header(weekday) => ("header", Some(weekday.to_string())),
            CellKind::Value => ("value", None),
            CellKind::Empty => ("empty", None),
        };
        Self {
            value: format_instant(cell.value),
            kind,
            weekday,
            disabled: cell.disabled,
        }
    }
}

#[derive(Serialize)]
struct GridDto {
    granularity: Granularity,
    columns: usize,
    cells: Vec<CellDto>,
}

#[derive(Serialize)]
struct TimeColumnsDto {
    hours: Vec<CellDto>,
    minutes: Vec<CellDto>,
    cycles: Vec<CellDto>,
}

#[derive(Serialize)]
struct SpanDto {
    from: String,
    to: String,
    minutes: i64,
}

impl From<&BlockedSpan> for SpanDto {
    fn from(span: &BlockedSpan) -> Self {
        Self {
            from: format_instant(span.from),
            to: format_instant(span.to),
            minutes: span.minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn format_instant(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn to_js(err: PickerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn cells(cells: &[Cell]) -> Vec<CellDto> {
    cells.iter().map(CellDto::from).collect()
}

// ---------------------------------------------------------------------------
// JSON-in / JSON-out operations, callable from native code and tests
// ---------------------------------------------------------------------------

pub fn is_disabled_json(value: &str, granularity: &str, config_json: &str) -> Result<bool> {
    let config = PickerConfig::from_json(config_json)?;
    let granularity = Granularity::from_str(granularity)?;
    let value = parse_instant(value)?;
    Ok(config.constraints()?.is_disabled(value, granularity))
}

pub fn find_nearest_json(value: &str, granularity: &str, config_json: &str) -> Result<Option<String>> {
    let config = PickerConfig::from_json(config_json)?;
    let granularity = Granularity::from_str(granularity)?;
    let value = parse_instant(value)?;
    let constraints = config.constraints()?;
    let index = AvailabilityIndex::build(value, granularity.mode(), &constraints);
    Ok(find_nearest(value, granularity, &index, &constraints).map(format_instant))
}

pub fn date_grid_json(
    anchor: &str,
    granularity: &str,
    config_json: &str,
    reference_year: Option<i32>,
) -> Result<String> {
    let config = PickerConfig::from_json(config_json)?;
    let granularity = Granularity::from_str(granularity)?;
    let anchor = parse_instant(anchor)?;
    let index = DateIndex::build(anchor, &config.constraints()?);

    let (columns, grid) = match granularity {
        Granularity::Day | Granularity::Week => (7, index.day_grid(anchor.month())),
        Granularity::Month => (4, index.month_grid()),
        Granularity::Year => {
            let reference = reference_year.or(config.reference_year).unwrap_or(anchor.year());
            (4, year_grid(year_page_start(anchor.year(), reference), &index))
        }
        other => {
            return Err(PickerError::InvalidConfig(format!(
                "'{}' is not a date granularity",
                other
            )))
        }
    };

    let dto = GridDto {
        granularity,
        columns,
        cells: cells(&grid),
    };
    Ok(serde_json::to_string(&dto)?)
}

pub fn time_columns_json(anchor: &str, config_json: &str) -> Result<String> {
    let config = PickerConfig::from_json(config_json)?;
    let anchor = parse_instant(anchor)?;
    let index = TimeIndex::build(anchor, &config.constraints()?);

    let dto = TimeColumnsDto {
        hours: cells(&index.hour_column(Cycle::of_hour(anchor.hour()))),
        minutes: cells(&index.minute_column(anchor.hour())),
        cycles: cells(&index.cycle_column()),
    };
    Ok(serde_json::to_string(&dto)?)
}

pub fn materialize_ranges_json(config_json: &str, date: &str) -> Result<String> {
    let config = PickerConfig::from_json(config_json)?;
    let date = parse_instant(date)?.date();
    let spans = materialize(&config.rules()?, date);
    let dtos: Vec<SpanDto> = spans.iter().map(SpanDto::from).collect();
    Ok(serde_json::to_string(&dtos)?)
}

pub fn ingest_blocks_json(blocks_json: &str) -> Result<String> {
    let rules: Vec<BlockRule> = picker_engine::rules::parse_blocks_json(blocks_json)?;
    Ok(serde_json::to_string(&rules)?)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether `value` is unselectable at `granularity` under the widget config.
///
/// # Arguments
/// - `value` -- instant string (e.g., "2024-03-04T09:00:00" or "2024-03-04")
/// - `granularity` -- one of day, week, month, year, hour, minute, cycle
/// - `config_json` -- picker config JSON; `{}` means unconstrained
#[wasm_bindgen(js_name = "isDisabled")]
pub fn is_disabled(value: &str, granularity: &str, config_json: &str) -> std::result::Result<bool, JsValue> {
    is_disabled_json(value, granularity, config_json).map_err(to_js)
}

/// Nearest selectable value to `value`, or `undefined` when none exists
/// within the search horizon.
#[wasm_bindgen(js_name = "findNearest")]
pub fn find_nearest_value(
    value: &str,
    granularity: &str,
    config_json: &str,
) -> std::result::Result<Option<String>, JsValue> {
    find_nearest_json(value, granularity, config_json).map_err(to_js)
}

/// The date grid shown for `anchor` at `granularity`.
///
/// Returns `{granularity, columns, cells}`, where each cell is
/// `{value, kind, weekday?, disabled}` and `kind` is header, value or empty.
#[wasm_bindgen(js_name = "dateGrid")]
pub fn date_grid(
    anchor: &str,
    granularity: &str,
    config_json: &str,
    reference_year: Option<i32>,
) -> std::result::Result<String, JsValue> {
    date_grid_json(anchor, granularity, config_json, reference_year).map_err(to_js)
}

/// Hour, minute and AM/PM columns for the day and hour of `anchor`.
#[wasm_bindgen(js_name = "timeColumns")]
pub fn time_columns(anchor: &str, config_json: &str) -> std::result::Result<String, JsValue> {
    time_columns_json(anchor, config_json).map_err(to_js)
}

/// Merged blocked time spans of `date`, as `{from, to, minutes}` objects.
#[wasm_bindgen(js_name = "materializeRanges")]
pub fn materialize_ranges(config_json: &str, date: &str) -> std::result::Result<String, JsValue> {
    materialize_ranges_json(config_json, date).map_err(to_js)
}

/// Validate a JSON array of raw blocks and return the typed rules.
#[wasm_bindgen(js_name = "ingestBlocks")]
pub fn ingest_blocks(blocks_json: &str) -> std::result::Result<String, JsValue> {
    ingest_blocks_json(blocks_json).map_err(to_js)
}
