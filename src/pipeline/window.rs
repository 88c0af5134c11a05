//! Inclusive date windows and the previous/next period shift
use crate::error::DashboardError;
use crate::pipeline::dates::DISPLAY_DATE_FORMAT;
use crate::table::Table;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Direction of a period shift.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

/// Inclusive `[start, end]` range of calendar dates, `start <= end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Builds a window, rejecting `start > end` with `InvalidWindow`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start > end {
            Err(invalid_window(start, end))?
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Days between start and end; zero for a single-day window.
    pub fn span_days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs()
    }

    /// Moves the window by `span + 1` days so the new window is adjacent to this one.
    /// The result is not clamped to any data range.
    pub fn shift(&self, direction: Direction) -> Result<Self, DashboardError> {
        let step = Days::new(self.span_days() + 1);
        let shifted = match direction {
            Direction::Previous => self.start.checked_sub_days(step).zip(self.end.checked_sub_days(step)),
            Direction::Next => self.start.checked_add_days(step).zip(self.end.checked_add_days(step)),
        };
        let (start, end) = shifted.ok_or_else(|| invalid_window(self.start, self.end))?;
        debug!(?direction, %start, %end, "shifted date window");
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub(crate) fn invalid_window(start: NaiveDate, end: NaiveDate) -> DashboardError {
    DashboardError::InvalidWindow {
        start: start.format(DISPLAY_DATE_FORMAT).to_string(),
        end: end.format(DISPLAY_DATE_FORMAT).to_string(),
    }
}

/// Keeps the rows whose date in `column` falls inside `window`, ignoring the time of day.
///
/// Rows without a date never match, and an unknown column matches nothing; an empty
/// result is a normal outcome.
pub fn filter_range(table: &Table, column: &str, window: &DateWindow) -> Table {
    let mask: Vec<bool> = match table.column(column) {
        Some(dates) => dates
            .values
            .iter()
            .map(|value| value.as_datetime().map(|datetime| window.contains(datetime.date())).unwrap_or(false))
            .collect(),
        None => {
            warn!(column, "date column not found while filtering");
            vec![false; table.row_count()]
        }
    };
    let filtered = table.retain_rows(&mask);
    debug!(
        start = %window.start,
        end = %window.end,
        rows = filtered.row_count(),
        total = table.row_count(),
        "filtered date window"
    );
    filtered
}
