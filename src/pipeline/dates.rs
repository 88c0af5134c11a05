//! Day-first date normalization of the chosen date column
use crate::error::DashboardError;
use crate::table::{Column, Table, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::info;

/// Name of the derived `dd/mm/yyyy` column
pub const FORMATTED_DATE_COLUMN: &str = "Formatted Date";

/// Display format of [`FORMATTED_DATE_COLUMN`]
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

const TIME: &str = r"(?:[ T](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?";

/// `31/12/2024`, `31-12-24`, `31.12.2024 10:30`
static DAY_FIRST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(\d{{1,2}})[/.-](\d{{1,2}})[/.-](\d{{4}}|\d{{2}}){}$", TIME)).expect("Hardcode regex pattern")
});

/// `2024-12-31`, `2024/12/31T10:30:00`
static YEAR_FIRST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(\d{{4}})[/.-](\d{{1,2}})[/.-](\d{{1,2}}){}$", TIME)).expect("Hardcode regex pattern")
});

/// `31 Dec 2024`, `31-Dec-24`, `31 December, 2024`
static DAY_MONTH_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[ -]([A-Za-z]{3,9})\.?,?[ -](\d{4}|\d{2})$").expect("Hardcode regex pattern")
});

/// `Dec 31, 2024`, `December 31 2024`
static MONTH_NAME_DAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{3,9})\.? (\d{1,2}),? (\d{4})$").expect("Hardcode regex pattern")
});

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Parses a date written day first.
///
/// When the day-first reading is not a calendar date but the month-first one is
/// (`12/25/2024`), the month-first reading is used.
pub fn parse_day_first(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Some(captures) = DAY_FIRST_PATTERN.captures(text) {
        let first = number(&captures, 1)?;
        let second = number(&captures, 2)?;
        let year = year(&captures[3])?;
        let date = NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))?;
        return Some(NaiveDateTime::new(date, time(&captures, 4)?));
    }
    if let Some(captures) = YEAR_FIRST_PATTERN.captures(text) {
        let date = NaiveDate::from_ymd_opt(number(&captures, 1)? as i32, number(&captures, 2)?, number(&captures, 3)?)?;
        return Some(NaiveDateTime::new(date, time(&captures, 4)?));
    }
    if let Some(captures) = DAY_MONTH_NAME_PATTERN.captures(text) {
        let date = NaiveDate::from_ymd_opt(year(&captures[3])?, month(&captures[2])?, number(&captures, 1)?)?;
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Some(captures) = MONTH_NAME_DAY_PATTERN.captures(text) {
        let date = NaiveDate::from_ymd_opt(year(&captures[3])?, month(&captures[1])?, number(&captures, 2)?)?;
        return Some(date.and_time(NaiveTime::MIN));
    }
    None
}

fn number(captures: &Captures, index: usize) -> Option<u32> {
    captures.get(index)?.as_str().parse().ok()
}

/// Two-digit years land in 1969..=2068.
fn year(text: &str) -> Option<i32> {
    let year = text.parse::<i32>().ok()?;
    match text.len() {
        2 if year < 69 => Some(2000 + year),
        2 => Some(1900 + year),
        _ => Some(year),
    }
}

/// Full English month name or any prefix of at least three letters (`Sept` included).
fn month(text: &str) -> Option<u32> {
    let text = text.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&text) && text.len() >= 3)
        .map(|index| index as u32 + 1)
}

/// Optional time part starting at capture group `first`; midnight when absent.
fn time(captures: &Captures, first: usize) -> Option<NaiveTime> {
    let Some(hour) = captures.get(first) else {
        return Some(NaiveTime::MIN);
    };
    let hour = hour.as_str().parse::<u32>().ok()?;
    let minute = number(captures, first + 1)?;
    let second = captures.get(first + 2).map(|it| it.as_str().parse::<u32>()).transpose().ok()?.unwrap_or(0);
    let nano = match captures.get(first + 3) {
        Some(fraction) => format!("{:0<9}", fraction.as_str()).parse::<u32>().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nano)
}

fn parse_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(datetime) => Some(*datetime),
        Value::Text(text) => parse_day_first(text),
        Value::Null | Value::Number(_) => None,
    }
}

/// Converts `column` to dates, drops the rows that do not parse and adds the
/// [`FORMATTED_DATE_COLUMN`]. Returns the normalized table with its first and last date.
///
/// Already normalized cells pass through, so normalizing twice changes nothing.
///
/// # Errors
///
/// * `ColumnNotFound` when `column` is not in the table
/// * `ColumnClassMismatch` when `column` is the derived formatted column itself
/// * `NoValidDates` when no row survives
pub fn normalize_dates(table: &Table, column: &str) -> Result<(Table, NaiveDate, NaiveDate), DashboardError> {
    let source = table.require_column(column)?;
    if column == FORMATTED_DATE_COLUMN {
        Err(DashboardError::ColumnClassMismatch {
            name: column.to_owned(),
            expected: "a source date column",
        })?
    }

    let parsed: Vec<Option<NaiveDateTime>> = source.values.iter().map(parse_value).collect();
    let mask: Vec<bool> = parsed.iter().map(Option::is_some).collect();
    let dates: Vec<NaiveDateTime> = parsed.iter().flatten().copied().collect();
    if dates.is_empty() {
        Err(DashboardError::NoValidDates(column.to_owned()))?
    }

    let mut converted = table.clone();
    converted.set_column(Column::new(
        column,
        parsed.into_iter().map(|date| date.map(Value::DateTime).unwrap_or_default()).collect(),
    ))?;
    let mut normalized = converted.retain_rows(&mask);
    let formatted = dates
        .iter()
        .map(|date| Value::Text(date.format(DISPLAY_DATE_FORMAT).to_string()))
        .collect();
    normalized.set_column(Column::new(FORMATTED_DATE_COLUMN, formatted))?;

    let (min_date, max_date) = dates
        .iter()
        .map(NaiveDateTime::date)
        .fold((NaiveDate::MAX, NaiveDate::MIN), |(min, max), date| (min.min(date), max.max(date)));
    info!(
        column,
        kept = dates.len(),
        dropped = table.row_count() - dates.len(),
        %min_date,
        %max_date,
        "normalized date column"
    );
    Ok((normalized, min_date, max_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn parsed_date(text: &str) -> Option<NaiveDate> {
        parse_day_first(text).map(|datetime| datetime.date())
    }

    #[test]
    fn parse_numeric_day_first() {
        assert_eq!(parsed_date("05/01/2024"), Some(date(2024, 1, 5)));
        assert_eq!(parsed_date(" 5-1-2024 "), Some(date(2024, 1, 5)));
        assert_eq!(parsed_date("31.12.99"), Some(date(1999, 12, 31)));
        assert_eq!(parsed_date("01/02/30"), Some(date(2030, 2, 1)));
        assert_eq!(parsed_date("12/25/2024"), Some(date(2024, 12, 25)));
        assert_eq!(parsed_date("31/02/2024"), None);
        assert_eq!(parsed_date("13/25/2024"), None);
    }

    #[test]
    fn parse_year_first_and_times() {
        assert_eq!(parsed_date("2024-01-31"), Some(date(2024, 1, 31)));
        assert_eq!(
            parse_day_first("2024-01-31T10:20:30"),
            Some(date(2024, 1, 31).and_hms_opt(10, 20, 30).unwrap())
        );
        assert_eq!(
            parse_day_first("02/01/2024 08:15"),
            Some(date(2024, 1, 2).and_hms_opt(8, 15, 0).unwrap())
        );
        assert_eq!(
            parse_day_first("2024-01-31 10:20:30.5"),
            Some(date(2024, 1, 31).and_hms_milli_opt(10, 20, 30, 500).unwrap())
        );
        assert_eq!(parse_day_first("2024-01-31 25:00"), None);
    }

    #[test]
    fn parse_month_names() {
        assert_eq!(parsed_date("1 Jan 2024"), Some(date(2024, 1, 1)));
        assert_eq!(parsed_date("05-Sept-24"), Some(date(2024, 9, 5)));
        assert_eq!(parsed_date("Jan 5, 2024"), Some(date(2024, 1, 5)));
        assert_eq!(parsed_date("5 January 2024"), Some(date(2024, 1, 5)));
        assert_eq!(parsed_date("5 Janvier 2024"), None);
    }

    #[test]
    fn parse_rejects_other_text() {
        for text in ["", "abc", "2024", "01/2024", "45292"] {
            assert_eq!(parse_day_first(text), None, "text {:?}", text);
        }
    }

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new(
                "Data",
                vec![
                    Value::text("01/01/2024"),
                    Value::text("not a date"),
                    Value::text("05/01/2024"),
                    Value::Null,
                    Value::Number(45292.0),
                    Value::text("02/01/2024"),
                ],
            ),
            Column::new("Qtd", (1..=6).map(|n| Value::Number(n as f64)).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn drops_exactly_the_unparseable_rows() {
        let (table, min_date, max_date) = normalize_dates(&sample(), "Data").unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_names(), vec!["Data", "Qtd", FORMATTED_DATE_COLUMN]);
        assert_eq!(
            table.column("Qtd").unwrap().values,
            vec![Value::Number(1.0), Value::Number(3.0), Value::Number(6.0)]
        );
        assert_eq!(
            table.column(FORMATTED_DATE_COLUMN).unwrap().values,
            vec![Value::text("01/01/2024"), Value::text("05/01/2024"), Value::text("02/01/2024")]
        );
        assert!(table.column("Data").unwrap().values.iter().all(|value| value.as_datetime().is_some()));
        assert_eq!(min_date, date(2024, 1, 1));
        assert_eq!(max_date, date(2024, 1, 5));
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let (once, _, _) = normalize_dates(&sample(), "Data").unwrap();
        let (twice, _, _) = normalize_dates(&once, "Data").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn replaces_existing_formatted_column() {
        let table = Table::from_columns(vec![
            Column::new(FORMATTED_DATE_COLUMN, vec![Value::text("x")]),
            Column::new("Data", vec![Value::text("2024-03-04")]),
        ])
        .unwrap();
        let (table, _, _) = normalize_dates(&table, "Data").unwrap();
        assert_eq!(table.column_names(), vec![FORMATTED_DATE_COLUMN, "Data"]);
        assert_eq!(table.column(FORMATTED_DATE_COLUMN).unwrap().values, vec![Value::text("04/03/2024")]);
    }

    #[test]
    fn errors() {
        let table = Table::from_columns(vec![Column::new("Data", vec![Value::text("abc"), Value::Null])]).unwrap();
        assert_eq!(normalize_dates(&table, "Data").unwrap_err().kind(), ErrorKind::NoValidDates);
        assert_eq!(normalize_dates(&table, "Missing").unwrap_err().kind(), ErrorKind::InvalidInput);
        let (normalized, _, _) = normalize_dates(&sample(), "Data").unwrap();
        assert_eq!(
            normalize_dates(&normalized, FORMATTED_DATE_COLUMN).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }
}
