//! # Ingestion
//!
//! Turns uploaded bytes into a [`Table`], dispatching on the declared file extension:
//!
//! - `csv`, `txt`: delimited UTF-8 text, delimiter sniffed from the first lines
//! - `xlsx`, `xlsm`: one worksheet of a workbook (default `Sheet1`)
//! - `docx`: one row per non-blank body paragraph in a single `Content` column
//!
//! Any failure aborts ingestion; there is no partial result.
use crate::error::{DashboardError, ResultMessage};
use crate::spreadsheet;
use crate::table::{Column, Table, Value};
use std::collections::HashSet;
use tracing::info;

pub(crate) mod delimited;
pub(crate) mod docx;

/// Rows shown in a table preview
pub const PREVIEW_ROWS: usize = 5;

/// Name of the single column produced from a document
pub const CONTENT_COLUMN: &str = "Content";

/// Supported upload formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Txt,
    Xlsx,
    Xlsm,
    Docx,
}

impl FileKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Xlsx => "xlsx",
            Self::Xlsm => "xlsm",
            Self::Docx => "docx",
        }
    }

    /// Parses a declared extension (case-insensitive, leading dot allowed).
    pub fn parse(extension: &str) -> Result<Self, DashboardError> {
        let trimmed = extension.trim().trim_start_matches('.');
        match trimmed.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            "xlsx" => Ok(Self::Xlsx),
            "xlsm" => Ok(Self::Xlsm),
            "docx" => Ok(Self::Docx),
            _ => Err(DashboardError::UnsupportedType(trimmed.to_owned())),
        }
    }

    /// Parses the extension of a file name (the text after the last `.`).
    pub fn from_file_name(file_name: &str) -> Result<Self, DashboardError> {
        match file_name.rsplit_once('.') {
            Some((_, extension)) => Self::parse(extension),
            None => Err(DashboardError::UnsupportedType(String::new())),
        }
    }

    /// Whether the format reads a worksheet and therefore takes a sheet name.
    pub const fn is_workbook(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xlsm)
    }
}

/// Ingests uploaded bytes declared with `extension`.
///
/// `sheet_name` only applies to workbooks and defaults to
/// [`DEFAULT_SHEET_NAME`](crate::spreadsheet::DEFAULT_SHEET_NAME).
///
/// # Errors
///
/// * `UnsupportedType` for an extension outside `csv`, `txt`, `xlsx`, `xlsm`, `docx`
/// * `ParseError` for malformed content, bad encoding or a missing sheet
pub fn ingest(bytes: &[u8], extension: &str, sheet_name: Option<&str>) -> Result<Table, DashboardError> {
    let kind = FileKind::parse(extension)?;
    let table = match kind {
        FileKind::Csv | FileKind::Txt => {
            let rows = delimited::read_rows(bytes).with_prefix("read delimited text")?;
            table_from_rows(rows)
        }
        FileKind::Xlsx | FileKind::Xlsm => {
            let sheet_name = sheet_name.unwrap_or(spreadsheet::DEFAULT_SHEET_NAME);
            let rows = spreadsheet::read_sheet_rows(bytes, sheet_name).with_prefix("read workbook")?;
            table_from_rows(rows)
        }
        FileKind::Docx => {
            let paragraphs = docx::read_paragraphs(bytes).with_prefix("read document")?;
            let values = paragraphs.into_iter().map(Value::Text).collect();
            Table::from_columns(vec![Column::new(CONTENT_COLUMN, values)])
        }
    }?;
    info!(
        kind = kind.as_str(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "ingested file"
    );
    Ok(table)
}

/// Builds a table from raw rows whose first row is the header.
fn table_from_rows(mut rows: Vec<Vec<Option<String>>>) -> Result<Table, DashboardError> {
    if rows.is_empty() {
        Err(DashboardError::ParseError("no columns to parse from file".to_owned()))?
    }
    let header = rows.remove(0);
    let names = header_names(header);
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); names.len()];
    for row in rows {
        let mut row = row.into_iter();
        for column in cells.iter_mut() {
            column.push(row.next().flatten());
        }
    }
    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();
    Table::from_columns(columns)
}

/// Cleans header cells: blanks become `Unnamed: {index}` and repeats get `.1`, `.2`, ... suffixes.
fn header_names(header: Vec<Option<String>>) -> Vec<String> {
    let mut seen = HashSet::<String>::new();
    header
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let base = name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("Unnamed: {}", index));
            let mut name = base.clone();
            let mut suffix = 0usize;
            while seen.contains(&name) {
                suffix += 1;
                name = format!("{}.{}", base, suffix);
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}
