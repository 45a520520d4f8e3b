//! Picker sessions: the state a single widget instance owns.
//!
//! A session holds the current constraints, its availability index and its
//! selection state. The UI layer forwards every input (mount, value change,
//! constraints change, pick, zoom, page) as a method call. A call that
//! commits a change returns a [`ChangeEvent`] for the caller to deliver as its
//! `onChange` notification. Indexes are rebuilt inside these calls, before
//! anything reads them.

use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::blocklist::Constraints;
use crate::calendar::start_of_week;
use crate::config::{DatePickerOptions, SelectorMode};
use crate::error::{PickerError, Result};
use crate::granularity::{twelve_hour_numeral, Cycle, Granularity};
use crate::index::{year_grid, year_page_start, Cell, DateIndex, TimeIndex};
use crate::navigation::{ChangeEvent, DateView, PageDirection};
use crate::nearest::{find_nearest_date, find_nearest_time};
use crate::selection::{select_date, select_time, SelectionState, TimePick};

/// Calendar grid session.
#[derive(Debug, Clone)]
pub struct DatePicker {
    options: DatePickerOptions,
    constraints: Arc<Constraints>,
    view: DateView,
    selected: Option<NaiveDateTime>,
    index: DateIndex,
}

impl DatePicker {
    /// Mount on `value`. When `value` is not selectable it is replaced by
    /// the nearest selectable date and the returned event reports it.
    pub fn mount(
        value: NaiveDateTime,
        constraints: Arc<Constraints>,
        options: DatePickerOptions,
    ) -> Result<(Self, Option<ChangeEvent>)> {
        let view = DateView::new(value, options.end, options.fixed)?;
        let index = DateIndex::build(value, &constraints);
        let mut picker = Self {
            options,
            constraints,
            view,
            selected: Some(value),
            index,
        };
        let event = picker.sync();
        Ok((picker, event))
    }

    /// The value prop changed.
    pub fn set_value(&mut self, value: NaiveDateTime) -> Option<ChangeEvent> {
        self.selected = Some(value);
        self.view.set_anchor(value);
        self.refresh_index();
        self.sync()
    }

    /// Bounds or rules changed.
    pub fn set_constraints(&mut self, constraints: Arc<Constraints>) -> Option<ChangeEvent> {
        self.constraints = constraints;
        self.refresh_index();
        self.sync()
    }

    /// Pick a grid cell.
    ///
    /// Picks coarser than the end granularity zoom the grid back in unless the
    /// view is fixed, so the next pick refines this one.
    pub fn pick(&mut self, cell: &Cell) -> Result<ChangeEvent> {
        if !cell.is_selectable() {
            return Err(PickerError::InvalidPick(format!(
                "{:?} cell at {} is not selectable",
                cell.kind, cell.value
            )));
        }
        let at = self.view.granularity();
        let anchor = self.view.anchor();
        let existing = self.selected.unwrap_or(anchor);
        let selection = select_date(existing, anchor, cell.value, at, self.options.end)?;

        if !self.options.fixed && !self.view.is_at_end() {
            self.view.zoom_in();
        }
        self.view.set_anchor(selection.value);
        self.refresh_index();
        self.selected = Some(selection.value);

        Ok(ChangeEvent {
            granularity: at,
            value: Some(selection.value),
            is_final: selection.is_final,
        })
    }

    /// Show the next coarser grid. Clears the selection until a finer pick
    /// is made again.
    pub fn zoom_out(&mut self) -> Option<ChangeEvent> {
        let event = self.view.zoom_out()?;
        self.selected = None;
        Some(event)
    }

    pub fn page(&mut self, direction: PageDirection) {
        if self.view.page(direction) {
            self.refresh_index();
        }
    }

    /// Cells of the grid currently shown.
    pub fn cells(&self) -> Vec<Cell> {
        let anchor = self.view.anchor();
        match self.view.granularity() {
            Granularity::Month => self.index.month_grid(),
            Granularity::Year => year_grid(
                year_page_start(anchor.year(), self.options.reference_year),
                &self.index,
            ),
            _ => self.index.day_grid(anchor.month()),
        }
    }

    /// Whether `value` is highlighted as selected in the current grid.
    pub fn is_selected(&self, value: NaiveDateTime) -> bool {
        let Some(selected) = self.selected else {
            return false;
        };
        match self.view.granularity() {
            Granularity::Week => {
                start_of_week(value.date()) == start_of_week(selected.date())
                    && !self.day_disabled(value)
            }
            Granularity::Month => {
                (value.year(), value.month()) == (selected.year(), selected.month())
            }
            Granularity::Year => value.year() == selected.year(),
            _ => value.date() == selected.date(),
        }
    }

    pub fn state(&self) -> SelectionState {
        SelectionState {
            anchor: self.view.anchor(),
            granularity: self.view.granularity(),
            selected: self.selected,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.view.granularity()
    }

    pub fn anchor(&self) -> NaiveDateTime {
        self.view.anchor()
    }

    pub fn selected(&self) -> Option<NaiveDateTime> {
        self.selected
    }

    pub fn columns(&self) -> usize {
        self.view.columns()
    }

    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    pub fn constraints(&self) -> &Arc<Constraints> {
        &self.constraints
    }

    fn refresh_index(&mut self) {
        if !self.index.is_fresh_for(self.view.anchor(), &self.constraints) {
            self.index = DateIndex::build(self.view.anchor(), &self.constraints);
        }
    }

    fn day_disabled(&self, value: NaiveDateTime) -> bool {
        self.index
            .is_day_disabled(value.date())
            .unwrap_or_else(|| self.constraints.is_disabled(value, Granularity::Day))
    }

    /// Whether the committed value is unusable at the end granularity: a
    /// disabled day, or a month/year without any enabled day.
    fn value_disabled(&self, value: NaiveDateTime) -> bool {
        let fresh;
        let index = if self.index.year() == value.year() {
            &self.index
        } else {
            fresh = DateIndex::build(value, &self.constraints);
            &fresh
        };
        match self.options.end {
            Granularity::Month => index.month(value.month()).is_none_or(|m| m.disabled),
            Granularity::Year => !index.has_enabled_day(),
            _ => index.is_day_disabled(value.date()).unwrap_or(true),
        }
    }

    /// Move a disabled selection to the nearest selectable date.
    fn sync(&mut self) -> Option<ChangeEvent> {
        let value = self.selected?;
        if !self.value_disabled(value) {
            return None;
        }

        let granularity = self.view.granularity();
        let nearest = find_nearest_date(value, self.options.end, &self.index, &self.constraints);
        if let Some(found) = nearest {
            log::debug!("moved disabled date {} to {}", value, found);
            self.view.set_anchor(found);
            self.refresh_index();
        }
        self.selected = nearest;

        Some(ChangeEvent {
            granularity,
            value: nearest,
            is_final: nearest.is_some() && self.view.is_at_end(),
        })
    }
}

/// Hour / minute / AM-PM column session.
#[derive(Debug, Clone)]
pub struct TimePicker {
    constraints: Arc<Constraints>,
    anchor: NaiveDateTime,
    selected: Option<NaiveDateTime>,
    index: TimeIndex,
}

impl TimePicker {
    /// Mount on `value`, moving it to the nearest selectable time of its day
    /// when needed.
    pub fn mount(value: NaiveDateTime, constraints: Arc<Constraints>) -> (Self, Option<ChangeEvent>) {
        let index = TimeIndex::build(value, &constraints);
        let mut picker = Self {
            constraints,
            anchor: value,
            selected: Some(value),
            index,
        };
        let event = picker.sync(Granularity::Hour);
        (picker, event)
    }

    /// The value prop changed. Moving to another day rebuilds the index.
    pub fn set_value(&mut self, value: NaiveDateTime) -> Option<ChangeEvent> {
        self.anchor = value;
        self.selected = Some(value);
        self.refresh_index();
        self.sync(Granularity::Hour)
    }

    pub fn set_constraints(&mut self, constraints: Arc<Constraints>) -> Option<ChangeEvent> {
        self.constraints = constraints;
        self.refresh_index();
        self.sync(Granularity::Hour)
    }

    /// Pick a value in one of the columns.
    ///
    /// Disabled hours, minutes and halves are rejected. A pick that lands on a
    /// disabled minute is moved: hour picks take the next enabled minute of
    /// that hour (wrapping to its start), AM/PM picks search the new half.
    pub fn pick(&mut self, pick: TimePick) -> Result<ChangeEvent> {
        let existing = self.selected.unwrap_or(self.anchor);
        let selection = select_time(existing, pick)?;
        let target = selection.value;

        let column_disabled = match pick {
            TimePick::Hour(_) => self.index.hour(target.hour()).is_none_or(|h| h.disabled),
            TimePick::Minute(_) => self.index.is_minute_disabled(target).unwrap_or(true),
            TimePick::Cycle(cycle) => cycle
                .hours()
                .all(|h| self.index.hour(h).is_none_or(|a| a.disabled)),
        };
        if column_disabled {
            return Err(PickerError::InvalidPick(format!("{:?} is disabled", pick)));
        }

        let value = match pick {
            TimePick::Minute(_) => Some(target),
            TimePick::Hour(_) => self.index.hour(target.hour()).and_then(|h| {
                h.first_enabled_from(target.minute())
                    .or_else(|| h.first_enabled_from(0))
            }),
            TimePick::Cycle(_) => {
                find_nearest_time(target, Granularity::Cycle, &self.index, &self.constraints)
            }
        };
        self.selected = value;
        if let Some(v) = value {
            self.anchor = v;
        }

        Ok(ChangeEvent {
            granularity: selection.granularity,
            value,
            is_final: value.is_some(),
        })
    }

    pub fn hour_cells(&self) -> Vec<Cell> {
        self.index.hour_column(Cycle::of_hour(self.anchor.hour()))
    }

    pub fn minute_cells(&self) -> Vec<Cell> {
        self.index.minute_column(self.anchor.hour())
    }

    pub fn cycle_cells(&self) -> Vec<Cell> {
        self.index.cycle_column()
    }

    /// Whether `pick` names the currently selected hour, minute or half.
    pub fn is_selected(&self, pick: TimePick) -> bool {
        let Some(selected) = self.selected else {
            return false;
        };
        match pick {
            TimePick::Hour(numeral) => twelve_hour_numeral(selected.hour()) == numeral,
            TimePick::Minute(minute) => selected.minute() == minute,
            TimePick::Cycle(cycle) => Cycle::of_hour(selected.hour()) == cycle,
        }
    }

    pub fn selected(&self) -> Option<NaiveDateTime> {
        self.selected
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    fn refresh_index(&mut self) {
        if !self.index.is_fresh_for(self.anchor, &self.constraints) {
            self.index = TimeIndex::build(self.anchor, &self.constraints);
        }
    }

    fn sync(&mut self, granularity: Granularity) -> Option<ChangeEvent> {
        let value = self.selected?;
        if self.index.is_minute_disabled(value) == Some(false) {
            return None;
        }
        let nearest = find_nearest_time(value, granularity, &self.index, &self.constraints);
        if let Some(found) = nearest {
            log::debug!("moved disabled time {} to {}", value, found);
            self.anchor = found;
        }
        self.selected = nearest;
        Some(ChangeEvent {
            granularity,
            value: nearest,
            is_final: nearest.is_some(),
        })
    }
}

/// Outcome of a date-side edit of a [`DateTimePicker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeChange {
    /// The date selector's own event.
    pub date: ChangeEvent,
    /// The combined value after an accepted date change, for the caller's
    /// `onFinalChange` notification. `None` when the change disabled confirm.
    pub final_value: Option<NaiveDateTime>,
}

/// A date grid and time columns editing one combined value.
///
/// Date changes replace the calendar date and keep the time of day. Time
/// changes replace hour and minute and keep the date. The combined value can
/// only be confirmed while the date side holds a usable value.
#[derive(Debug, Clone)]
pub struct DateTimePicker {
    mode: SelectorMode,
    date: Option<DatePicker>,
    time: Option<TimePicker>,
    value: NaiveDateTime,
    confirm_enabled: bool,
}

impl DateTimePicker {
    pub fn mount(
        value: NaiveDateTime,
        constraints: Arc<Constraints>,
        options: DatePickerOptions,
        mode: SelectorMode,
    ) -> Result<Self> {
        let mut picker = Self {
            mode,
            date: None,
            time: None,
            value,
            confirm_enabled: true,
        };

        if mode.includes_date() {
            let (date, event) = DatePicker::mount(value, Arc::clone(&constraints), options)?;
            picker.date = Some(date);
            if let Some(event) = event {
                picker.apply_date_event(event);
            }
        }
        if mode.includes_time() {
            let (time, event) = TimePicker::mount(picker.value, constraints);
            picker.time = Some(time);
            if let Some(event) = event {
                picker.apply_time_event(event);
            }
        }
        Ok(picker)
    }

    /// The value prop changed: reset the combined value and re-sync both
    /// sides onto it. Returns the date side's change, if re-syncing made one.
    pub fn set_value(&mut self, value: NaiveDateTime) -> Option<DateTimeChange> {
        self.value = value;
        self.confirm_enabled = true;
        let event = self.date.as_mut().and_then(|d| d.set_value(value));
        let change = event.map(|event| self.apply_date_event(event));
        if let Some(event) = self.time.as_mut().and_then(|t| t.set_value(self.value)) {
            self.apply_time_event(event);
        }
        change
    }

    pub fn pick_date(&mut self, cell: &Cell) -> Result<DateTimeChange> {
        let event = self
            .date
            .as_mut()
            .ok_or_else(|| PickerError::InvalidPick("date selector is not shown".into()))?
            .pick(cell)?;
        Ok(self.apply_date_event(event))
    }

    pub fn pick_time(&mut self, pick: TimePick) -> Result<ChangeEvent> {
        let event = self
            .time
            .as_mut()
            .ok_or_else(|| PickerError::InvalidPick("time selector is not shown".into()))?
            .pick(pick)?;
        self.apply_time_event(event);
        Ok(event)
    }

    pub fn zoom_out_date(&mut self) -> Option<DateTimeChange> {
        let event = self.date.as_mut()?.zoom_out()?;
        Some(self.apply_date_event(event))
    }

    pub fn page_date(&mut self, direction: PageDirection) {
        if let Some(date) = self.date.as_mut() {
            date.page(direction);
        }
    }

    /// Replace the constraints of both sides.
    pub fn set_constraints(&mut self, constraints: Arc<Constraints>) {
        if let Some(event) = self
            .date
            .as_mut()
            .and_then(|d| d.set_constraints(Arc::clone(&constraints)))
        {
            self.apply_date_event(event);
        }
        if let Some(event) = self.time.as_mut().and_then(|t| t.set_constraints(constraints)) {
            self.apply_time_event(event);
        }
    }

    pub fn date_picker(&self) -> Option<&DatePicker> {
        self.date.as_ref()
    }

    pub fn time_picker(&self) -> Option<&TimePicker> {
        self.time.as_ref()
    }

    pub fn mode(&self) -> SelectorMode {
        self.mode
    }

    /// The combined value being edited.
    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    /// Time columns are hidden while the date side has no usable value.
    pub fn time_visible(&self) -> bool {
        self.mode.includes_time() && self.confirm_enabled
    }

    pub fn can_confirm(&self) -> bool {
        self.confirm_enabled
    }

    /// The value to commit, if confirmation is currently possible.
    pub fn confirm(&self) -> Option<NaiveDateTime> {
        self.confirm_enabled.then_some(self.value)
    }

    fn apply_date_event(&mut self, event: ChangeEvent) -> DateTimeChange {
        let final_value = match event.value {
            Some(date) if event.is_final || event.granularity == Granularity::Month => {
                self.confirm_enabled = true;
                self.value = date.date().and_time(self.value.time());
                if let Some(event) = self.time.as_mut().and_then(|t| t.set_value(self.value)) {
                    self.apply_time_event(event);
                }
                Some(self.value)
            }
            _ => {
                self.confirm_enabled = false;
                None
            }
        };
        DateTimeChange {
            date: event,
            final_value,
        }
    }

    fn apply_time_event(&mut self, event: ChangeEvent) {
        let Some(time) = event.value else {
            return;
        };
        let merged = self
            .value
            .with_hour(time.hour())
            .and_then(|v| v.with_minute(time.minute()));
        if let Some(merged) = merged {
            self.value = merged;
        }
    }
}
