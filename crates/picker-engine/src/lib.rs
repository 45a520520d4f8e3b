//! # picker-engine
//!
//! Date/time availability engine for calendar and clock picker widgets.
//!
//! Given a value, optional min/max bounds and a set of block rules, the engine
//! decides which calendar cells and time slots can be picked, moves a value
//! that became unselectable to the nearest selectable one, and keeps the zoom
//! and paging state of a date grid consistent. Everything is synchronous and
//! framework-independent; rendering stays with the UI layer.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use picker_engine::{find_nearest, AvailabilityIndex, BlockRule, Bounds, Constraints, Granularity, Mode};
//!
//! let constraints = Constraints::new(Bounds::default(), vec![BlockRule::weekday(Weekday::Mon)]).unwrap().shared();
//! let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap();
//!
//! assert!(constraints.is_disabled(monday, Granularity::Day));
//!
//! let index = AvailabilityIndex::build(monday, Mode::Date, &constraints);
//! let tuesday = find_nearest(monday, Granularity::Day, &index, &constraints).unwrap();
//! assert_eq!(tuesday.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`calendar`]: clamped month/year arithmetic, instant parsing
//! - [`granularity`]: granularities, comparison precisions, AM/PM
//! - [`rules`]: typed block rules and raw-block ingestion
//! - [`blocklist`]: `is_disabled`, bounds, constraints
//! - [`materialize`]: time-range rules → merged blocked spans of a day
//! - [`index`]: per-year and per-day availability caches, grid cells
//! - [`nearest`]: nearest selectable value search
//! - [`navigation`]: zoom/paging state machine of the date grid
//! - [`selection`]: pick reducers
//! - [`picker`]: date, time and date-time picker sessions
//! - [`config`]: widget configuration
//! - [`error`]: error types

pub mod blocklist;
pub mod calendar;
pub mod config;
pub mod error;
pub mod granularity;
pub mod index;
pub mod materialize;
pub mod navigation;
pub mod nearest;
pub mod picker;
pub mod rules;
pub mod selection;

pub use blocklist::{is_disabled, Bounds, Constraints};
pub use config::{DatePickerOptions, PickerConfig, SelectorMode};
pub use error::PickerError;
pub use granularity::{Cycle, Granularity, Mode, Precision};
pub use index::{AvailabilityIndex, Cell, CellKind, DateIndex, TimeIndex};
pub use materialize::{materialize, BlockedSpan};
pub use navigation::{ChangeEvent, DateView, PageDirection};
pub use nearest::{find_nearest, YEAR_LOOKAHEAD};
pub use picker::{DatePicker, DateTimeChange, DateTimePicker, TimePicker};
pub use rules::{ingest_blocks, BlockRule, DayScope, RawBlock};
pub use selection::{select_date, select_time, Selection, SelectionState, TimePick};
