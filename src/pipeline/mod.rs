//! # Pipeline Stages
//!
//! Pure table transformations applied after ingestion, in this order:
//!
//! 1. [`normalize_dates`]: day-first date parsing of the chosen column, unparseable rows dropped
//! 2. [`coerce_numeric`]: per-column, all-or-nothing text to number conversion
//! 3. [`filter_range`]: inclusive date window, moved with [`DateWindow::shift`]
pub mod dates;
pub mod numeric;
pub mod window;

pub use dates::{normalize_dates, parse_day_first, DISPLAY_DATE_FORMAT, FORMATTED_DATE_COLUMN};
pub use numeric::{coerce_column, coerce_numeric, Unchanged};
pub use window::{filter_range, DateWindow, Direction};
