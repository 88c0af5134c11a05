//! # Rusty Dashboard
//!
//! Date-windowed dashboard pipeline over uploaded tabular and document files.
//!
//! ## Pipeline
//!
//! - **Ingestion**: `csv`/`txt` (delimiter sniffed), `xlsx`/`xlsm` (one worksheet) and
//!   `docx` (one row per paragraph) into a column-oriented [`Table`]
//! - **Date normalization**: day-first parsing of a chosen column; rows that do not parse
//!   are dropped and a `dd/mm/yyyy` column is added
//! - **Numeric coercion**: per-column, all-or-nothing conversion of text such as `1,5` or `20%`
//! - **Date window**: inclusive filter, moved by whole periods
//! - **Reports**: line, bar and pie charts as temporary PNG files, exported to a PDF with
//!   one chart per page
//!
//! [`Session`] holds the state between interactions.
mod helpers;
mod spreadsheet;

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod table;

pub use error::{DashboardError, ErrorKind};
pub use ingest::{ingest, FileKind};
pub use session::{ChartChoices, Session, Windowed};
pub use spreadsheet::DEFAULT_SHEET_NAME;
pub use table::{Column, ColumnClass, Table, Value};
