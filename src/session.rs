//! # Dashboard Session
//!
//! Explicit state of one dashboard: the ingested table, the chosen date column with its
//! normalized table, and the current date window. Every interaction is a method call that
//! recomputes what it needs from this state; a failing call leaves the state untouched.
use crate::error::DashboardError;
use crate::ingest::{ingest, PREVIEW_ROWS};
use crate::pipeline::window::invalid_window;
use crate::pipeline::{coerce_numeric, filter_range, normalize_dates, DateWindow, Direction};
use crate::report::{export_pdf, render_chart, ChartImages, ChartKind};
use crate::table::{ColumnClass, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Result of an interaction that depends on the rows inside the date window.
#[derive(Debug)]
pub enum Windowed<T> {
    Ready(T),
    /// No row falls inside the window: a normal state, nothing is rendered.
    EmptyWindow,
}

impl<T> Windowed<T> {
    pub fn is_empty_window(&self) -> bool {
        matches!(self, Windowed::EmptyWindow)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Windowed::Ready(value) => Some(value),
            Windowed::EmptyWindow => None,
        }
    }
}

/// Column picked for each chart; `None` picks the first column of the matching class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartChoices {
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub bar: Option<String>,
    #[serde(default)]
    pub pie: Option<String>,
}

impl ChartChoices {
    fn choice(&self, kind: ChartKind) -> Option<&str> {
        match kind {
            ChartKind::Line => self.line.as_deref(),
            ChartKind::Bar => self.bar.as_deref(),
            ChartKind::Pie => self.pie.as_deref(),
        }
    }

    /// Resolves the column of every chart against `table`. Charts without a column of the
    /// required class are left out.
    pub fn resolve(&self, table: &Table) -> Vec<(ChartKind, String)> {
        [ChartKind::Line, ChartKind::Bar, ChartKind::Pie]
            .into_iter()
            .filter_map(|kind| {
                let column = self
                    .choice(kind)
                    .map(str::to_owned)
                    .or_else(|| table.columns_of_class(kind.required_class()).first().map(|name| name.to_string()));
                if column.is_none() {
                    info!(chart = ?kind, class = kind.required_class().as_str(), "no column available, chart skipped");
                }
                column.map(|column| (kind, column))
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
struct DateSelection {
    column: String,
    /// Normalized and coerced table, before the window filter
    table: Table,
    min_date: NaiveDate,
    max_date: NaiveDate,
    window: DateWindow,
}

/// State of one dashboard interaction sequence.
#[derive(Clone, Debug)]
pub struct Session {
    table: Table,
    selection: Option<DateSelection>,
}

impl Session {
    /// Starts a session from an uploaded file.
    pub fn upload(bytes: &[u8], extension: &str, sheet_name: Option<&str>) -> Result<Self, DashboardError> {
        Ok(Self::from_table(ingest(bytes, extension, sheet_name)?))
    }

    pub fn from_table(table: Table) -> Self {
        Self { table, selection: None }
    }

    /// The table as ingested.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// First rows of the ingested table.
    pub fn preview(&self) -> Table {
        self.table.head(PREVIEW_ROWS)
    }

    /// Columns that may be picked as the date column. The choice is only offered when the
    /// table has rows and at least one text column.
    pub fn date_candidates(&self) -> Vec<&str> {
        if self.table.is_empty() || self.table.columns_of_class(ColumnClass::Categorical).is_empty() {
            Vec::new()
        } else {
            self.table.column_names()
        }
    }

    /// Picks the date column: normalizes it, coerces the other columns to numbers and
    /// resets the window to the full date range, which is returned.
    pub fn select_date_column(&mut self, column: &str) -> Result<DateWindow, DashboardError> {
        let (normalized, min_date, max_date) = normalize_dates(&self.table, column)?;
        let window = DateWindow::new(min_date, max_date)?;
        self.selection = Some(DateSelection {
            column: column.to_owned(),
            table: coerce_numeric(&normalized),
            min_date,
            max_date,
            window,
        });
        Ok(window)
    }

    fn selection(&self) -> Result<&DateSelection, DashboardError> {
        self.selection.as_ref().ok_or(DashboardError::NoDateColumn)
    }

    pub fn date_column(&self) -> Option<&str> {
        self.selection.as_ref().map(|selection| selection.column.as_str())
    }

    /// First and last date of the date column.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.selection.as_ref().map(|selection| (selection.min_date, selection.max_date))
    }

    pub fn window(&self) -> Option<DateWindow> {
        self.selection.as_ref().map(|selection| selection.window)
    }

    /// The normalized table the window is applied to.
    pub fn normalized(&self) -> Option<&Table> {
        self.selection.as_ref().map(|selection| &selection.table)
    }

    /// Picks a window by hand; both ends must lie within the date bounds.
    pub fn set_window(&mut self, start: NaiveDate, end: NaiveDate) -> Result<DateWindow, DashboardError> {
        let selection = self.selection()?;
        let window = DateWindow::new(start, end)?;
        if start < selection.min_date || end > selection.max_date {
            Err(invalid_window(start, end))?
        }
        self.set_current_window(window)
    }

    /// Moves the window to the previous or next period of the same length.
    pub fn shift(&mut self, direction: Direction) -> Result<DateWindow, DashboardError> {
        let window = self.selection()?.window.shift(direction)?;
        self.set_current_window(window)
    }

    fn set_current_window(&mut self, window: DateWindow) -> Result<DateWindow, DashboardError> {
        let selection = self.selection.as_mut().ok_or(DashboardError::NoDateColumn)?;
        selection.window = window;
        Ok(window)
    }

    /// Rows of the normalized table inside the current window.
    pub fn filtered(&self) -> Result<Windowed<Table>, DashboardError> {
        let selection = self.selection()?;
        let filtered = filter_range(&selection.table, &selection.column, &selection.window);
        if filtered.is_empty() {
            info!(start = %selection.window.start(), end = %selection.window.end(), "no data in the selected window");
            Ok(Windowed::EmptyWindow)
        } else {
            Ok(Windowed::Ready(filtered))
        }
    }

    /// Class of every column of the normalized table (the ingested one before a date
    /// column is picked).
    pub fn column_classes(&self) -> Vec<(&str, ColumnClass)> {
        let table = self.normalized().unwrap_or(&self.table);
        table
            .columns()
            .iter()
            .map(|column| (column.name.as_str(), column.class()))
            .collect()
    }

    /// Renders the chosen charts from the rows inside the window.
    /// Chart classes are resolved on the whole normalized table so they do not change as
    /// the window moves.
    pub fn render_charts(&self, choices: &ChartChoices) -> Result<Windowed<ChartImages>, DashboardError> {
        let selection = self.selection()?;
        let filtered = match self.filtered()? {
            Windowed::Ready(filtered) => filtered,
            Windowed::EmptyWindow => return Ok(Windowed::EmptyWindow),
        };
        let mut images = ChartImages::new();
        for (kind, column) in choices.resolve(&selection.table) {
            images.push(render_chart(&filtered, kind, &column)?);
        }
        Ok(Windowed::Ready(images))
    }

    /// Renders the charts and writes them to a PDF at `output`, one chart per page.
    /// Returns the number of pages. The chart images are removed on every path.
    pub fn export(&self, choices: &ChartChoices, output: &Path) -> Result<Windowed<usize>, DashboardError> {
        let images = match self.render_charts(choices)? {
            Windowed::Ready(images) => images,
            Windowed::EmptyWindow => return Ok(Windowed::EmptyWindow),
        };
        if images.is_empty() {
            info!("no chart to export");
            images.release()?;
            return Ok(Windowed::Ready(0));
        }
        export_pdf(images.images(), output)?;
        let pages = images.len();
        images.release()?;
        Ok(Windowed::Ready(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::FORMATTED_DATE_COLUMN;
    use crate::table::Value;

    const SALES: &[u8] = b"Data,Vendas\n01/01/2024,\"1.234,56\"\n02/01/2024,abc\n05/01/2024,\"2.000,00\"\n";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn end_to_end_sales_window() {
        let mut session = Session::upload(SALES, "csv", None).unwrap();
        assert_eq!(session.preview().row_count(), 3);
        assert_eq!(session.date_candidates(), vec!["Data", "Vendas"]);

        let window = session.select_date_column("Data").unwrap();
        assert_eq!((window.start(), window.end()), (date(2024, 1, 1), date(2024, 1, 5)));
        session.set_window(date(2024, 1, 1), date(2024, 1, 2)).unwrap();

        let filtered = session.filtered().unwrap().ready().unwrap();
        assert_eq!(filtered.row_count(), 2);
        let sales = filtered.column("Vendas").unwrap();
        assert_eq!(sales.class(), ColumnClass::Categorical);
        assert!(sales.values.iter().all(|value| value.as_text().is_some()));
        assert_eq!(
            filtered.column(FORMATTED_DATE_COLUMN).unwrap().values,
            vec![Value::text("01/01/2024"), Value::text("02/01/2024")]
        );
    }

    #[test]
    fn shifting_out_of_the_data_is_an_empty_window() {
        let mut session = Session::upload(SALES, "csv", None).unwrap();
        session.select_date_column("Data").unwrap();
        session.set_window(date(2024, 1, 1), date(2024, 1, 2)).unwrap();

        let next = session.shift(Direction::Next).unwrap();
        assert_eq!((next.start(), next.end()), (date(2024, 1, 3), date(2024, 1, 4)));
        assert!(session.filtered().unwrap().is_empty_window());
        assert!(session.render_charts(&ChartChoices::default()).unwrap().is_empty_window());

        session.shift(Direction::Next).unwrap();
        assert_eq!(session.filtered().unwrap().ready().unwrap().row_count(), 1);
    }

    #[test]
    fn failures_keep_the_last_good_state() {
        let mut session = Session::upload(SALES, "csv", None).unwrap();
        assert_eq!(session.shift(Direction::Next).unwrap_err().kind(), ErrorKind::InvalidInput);

        session.select_date_column("Data").unwrap();
        assert_eq!(session.select_date_column("Vendas").unwrap_err().kind(), ErrorKind::NoValidDates);
        assert_eq!(session.date_column(), Some("Data"));

        let error = session.set_window(date(2023, 12, 31), date(2024, 1, 2)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        let error = session.set_window(date(2024, 1, 3), date(2024, 1, 2)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(session.window().unwrap().start(), date(2024, 1, 1));
        assert_eq!(session.window().unwrap().end(), date(2024, 1, 5));
    }

    #[test]
    fn numeric_table_has_no_date_candidates() {
        let session = Session::upload(b"a,b\n1,2\n", "csv", None).unwrap();
        assert!(session.date_candidates().is_empty());
    }

    #[test]
    fn classes_and_chart_defaults() {
        let csv = "Data;Loja;Taxa;Qtd\n01/01/2024;Sul;1,5%;3\n02/01/2024;Norte;2%;\n";
        let mut session = Session::upload(csv.as_bytes(), "csv", None).unwrap();
        session.select_date_column("Data").unwrap();
        assert_eq!(
            session.column_classes(),
            vec![
                ("Data", ColumnClass::Temporal),
                ("Loja", ColumnClass::Categorical),
                ("Taxa", ColumnClass::Numeric),
                ("Qtd", ColumnClass::Numeric),
                (FORMATTED_DATE_COLUMN, ColumnClass::Categorical),
            ]
        );
        let resolved = ChartChoices::default().resolve(session.normalized().unwrap());
        assert_eq!(
            resolved,
            vec![
                (ChartKind::Line, "Taxa".to_owned()),
                (ChartKind::Bar, "Taxa".to_owned()),
                (ChartKind::Pie, "Loja".to_owned()),
            ]
        );
        let choices = ChartChoices { bar: Some("Qtd".to_owned()), ..ChartChoices::default() };
        assert_eq!(choices.resolve(session.normalized().unwrap())[1], (ChartKind::Bar, "Qtd".to_owned()));
    }

    #[test]
    fn charts_without_a_matching_column_are_skipped() {
        let table = Table::from_columns(vec![crate::table::Column::new(
            "Data",
            vec![Value::text("01/01/2024")],
        )])
        .unwrap();
        let mut session = Session::from_table(table);
        session.select_date_column("Data").unwrap();
        let resolved = ChartChoices::default().resolve(session.normalized().unwrap());
        assert_eq!(resolved, vec![(ChartKind::Pie, FORMATTED_DATE_COLUMN.to_owned())]);
    }

    #[test]
    fn export_writes_one_page_per_chart() {
        let csv = "Data;Loja;Qtd\n01/01/2024;Sul;3\n02/01/2024;Norte;4\n03/01/2024;Sul;5\n";
        let mut session = Session::upload(csv.as_bytes(), "csv", None).unwrap();
        session.select_date_column("Data").unwrap();

        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("relatorio.pdf");
        let pages = session.export(&ChartChoices::default(), &output).unwrap().ready().unwrap();
        assert_eq!(pages, 3);
        assert_eq!(lopdf::Document::load(&output).unwrap().get_pages().len(), 3);
    }

    #[test]
    fn export_failure_is_reported() {
        let csv = "Data;Qtd\n01/01/2024;3\n";
        let mut session = Session::upload(csv.as_bytes(), "csv", None).unwrap();
        session.select_date_column("Data").unwrap();
        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("missing").join("relatorio.pdf");
        let error = session.export(&ChartChoices::default(), &output).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);

        let choices = ChartChoices { pie: Some("Qtd".to_owned()), ..ChartChoices::default() };
        let error = session.render_charts(&choices).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }
}
