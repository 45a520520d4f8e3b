//! Zoom and paging state of a date picker.
//!
//! The view starts at the widget's end granularity (the finest unit a final
//! pick is made at). Zooming out goes day/week → month → year, zooming in walks
//! back down but never past the end granularity. Paging moves the anchor by one
//! unit of the next coarser granularity.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{add_months, add_years};
use crate::error::{PickerError, Result};
use crate::granularity::{Granularity, Mode};
use crate::index::YEARS_PER_PAGE;

/// Direction of a page move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    Back,
    Next,
}

impl PageDirection {
    fn sign(self) -> i32 {
        match self {
            PageDirection::Back => -1,
            PageDirection::Next => 1,
        }
    }
}

/// Payload of the widget's change notification.
///
/// `value: None` means the selection was cleared while the user zooms out
/// to pick a coarser unit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub granularity: Granularity,
    pub value: Option<NaiveDateTime>,
    pub is_final: bool,
}

impl ChangeEvent {
    pub fn cleared(granularity: Granularity) -> Self {
        Self {
            granularity,
            value: None,
            is_final: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateView {
    granularity: Granularity,
    anchor: NaiveDateTime,
    end: Granularity,
    fixed: bool,
}

impl DateView {
    /// Start a view at `end`. Fails when `end` is not a date granularity.
    pub fn new(anchor: NaiveDateTime, end: Granularity, fixed: bool) -> Result<Self> {
        if end.mode() != Mode::Date {
            return Err(PickerError::InvalidConfig(format!(
                "end granularity '{}' is not a date granularity",
                end
            )));
        }
        Ok(Self {
            granularity: end,
            anchor,
            end,
            fixed,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn anchor(&self) -> NaiveDateTime {
        self.anchor
    }

    pub fn end(&self) -> Granularity {
        self.end
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_at_end(&self) -> bool {
        self.granularity == self.end
    }

    /// Grid column count for the current granularity.
    pub fn columns(&self) -> usize {
        match self.granularity {
            Granularity::Month | Granularity::Year => 4,
            _ => 7,
        }
    }

    /// Move to the next coarser grid.
    ///
    /// Locked views and the year grid do not move. The returned event clears
    /// the selection whenever the new grid is coarser than the end granularity.
    pub fn zoom_out(&mut self) -> Option<ChangeEvent> {
        if self.fixed {
            return None;
        }
        let coarser = self.granularity.coarser()?;
        log::debug!("zoom out {} -> {}", self.granularity, coarser);
        self.granularity = coarser;
        (coarser != self.end).then(|| ChangeEvent::cleared(coarser))
    }

    /// Move one step back toward the end granularity. Returns whether the
    /// view changed.
    pub fn zoom_in(&mut self) -> bool {
        let finer = match self.granularity {
            Granularity::Year if self.end != Granularity::Year => Granularity::Month,
            Granularity::Month if matches!(self.end, Granularity::Day | Granularity::Week) => self.end,
            _ => return false,
        };
        log::debug!("zoom in {} -> {}", self.granularity, finer);
        self.granularity = finer;
        true
    }

    /// Shift the anchor one page. Returns whether the anchor moved into a
    /// different year, which invalidates a year-scoped availability index.
    pub fn page(&mut self, direction: PageDirection) -> bool {
        let step = direction.sign();
        let moved = match self.granularity {
            Granularity::Month => add_years(self.anchor, step),
            Granularity::Year => add_years(self.anchor, step * YEARS_PER_PAGE),
            _ => add_months(self.anchor, step),
        };
        let Some(moved) = moved else {
            return false;
        };
        let crossed_year = moved.year() != self.anchor.year();
        self.anchor = moved;
        crossed_year
    }

    /// Re-anchor the view, e.g. on the value after a pick or a re-sync.
    pub fn set_anchor(&mut self, anchor: NaiveDateTime) {
        self.anchor = anchor;
    }
}
