//! # Spreadsheet Processing Module
//!
//! Reads one worksheet of an Excel 2007+ workbook (`.xlsx`, `.xlsm`) straight from the
//! uploaded bytes. The package is a ZIP of XML parts; cell values are resolved through
//! the shared string table and number formats, so date-formatted serials come out as
//! ISO dates ready for the date normalizer.
use crate::error::DashboardError;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use std::io::Cursor;
use tracing::{debug, warn};

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

/// Sheet read when the caller does not name one
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Reads the rows of `sheet_name` (header row first) from workbook bytes.
pub(crate) fn read_sheet_rows(bytes: &[u8], sheet_name: &str) -> Result<Vec<Vec<Option<String>>>, DashboardError> {
    let mut workbook = XlsxWorkbook::open(Cursor::new(bytes))?;
    let sheet = match workbook.read_sheet(sheet_name) {
        Err(DashboardError::SheetNotFound(name)) => {
            warn!(sheet = %name, available = ?workbook.sheet_names(), "sheet not found");
            return Err(DashboardError::SheetNotFound(name));
        }
        result => result?,
    };
    if sheet.is_empty() {
        debug!(sheet = sheet_name, "sheet has no cells");
    }
    Ok(sheet.rows())
}
