use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

/// Types of cell data in workbook files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers
    NumberTime,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values (`#DIV/0!`, `#N/A`, ...)
    Error,
}

impl CellType {
    /// Parses built-in number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Quoted literals, escaped characters and bracketed sections (colors, locales) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, _) => Self::NumberTime,
            (false, false, _) => Self::Number,
        }
    }
}

/// Represents a single cell in a sheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the sheet XML (shared strings already resolved)
    pub(crate) value: String,
}

impl Cell {
    /// Renders the cell as the text the table ingests.
    /// Date-formatted numbers become ISO dates so the date normalizer can read them;
    /// a serial that cannot be converted is kept as the raw number.
    pub(crate) fn to_text(&self) -> String {
        let converted = match self.kind {
            CellType::Boolean => Some(if self.value == "1" { "true" } else { "false" }.to_owned()),
            CellType::NumberDate1900 => to_date(&self.value, false).map(|date| date.format("%Y-%m-%d").to_string()),
            CellType::NumberDate1904 => to_date(&self.value, true).map(|date| date.format("%Y-%m-%d").to_string()),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberTime => to_time(&self.value).map(|time| time.format("%H:%M:%S").to_string()),
            CellType::IsoDateTime => Some(self.value.replace('T', " ")),
            _ => None,
        };
        converted.unwrap_or_else(|| self.value.to_owned())
    }
}

/// Converts a serial day number to a calendar date.
/// Serials before 60 are shifted by one day for the fictitious 1900-02-29 of the 1900 system.
fn to_date(value: &str, is_1904: bool) -> Option<NaiveDate> {
    let days = value.trim().parse::<f64>().ok()?.trunc() as i64;
    if days < 0 {
        return None;
    }
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days + offset))
}

/// Converts the fractional part of a serial number to a time of day, rounded to seconds.
fn to_time(value: &str) -> Option<NaiveTime> {
    let factor = value.trim().parse::<f64>().ok()?.fract();
    let seconds = (factor * 86_400f64).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)
}

fn to_datetime_string(value: &str, is_1904: bool) -> Option<String> {
    let date = to_date(value, is_1904)?;
    let time = to_time(value)?;
    Some(NaiveDateTime::new(date, time).format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 0, col: 0, kind, value: value.to_owned() }
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy hh:mm", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("[Red]#,##0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("0.00\" days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("hh:mm", false), CellType::NumberTime);
    }

    #[test]
    fn serial_dates() {
        assert_eq!(cell(CellType::NumberDate1900, "1").to_text(), "1900-01-01");
        assert_eq!(cell(CellType::NumberDate1900, "61").to_text(), "1900-03-01");
        assert_eq!(cell(CellType::NumberDate1900, "45292").to_text(), "2024-01-01");
        assert_eq!(cell(CellType::NumberDate1904, "0").to_text(), "1904-01-01");
        assert_eq!(cell(CellType::NumberDateTime1900, "45292.5").to_text(), "2024-01-01 12:00:00");
        assert_eq!(cell(CellType::NumberTime, "0.75").to_text(), "18:00:00");
    }

    #[test]
    fn other_cells() {
        assert_eq!(cell(CellType::Boolean, "1").to_text(), "true");
        assert_eq!(cell(CellType::IsoDateTime, "2024-01-02T03:04:05").to_text(), "2024-01-02 03:04:05");
        assert_eq!(cell(CellType::Error, "#DIV/0!").to_text(), "#DIV/0!");
        assert_eq!(cell(CellType::NumberDate1900, "-5").to_text(), "-5");
    }
}
