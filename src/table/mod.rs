//! # Table Model
//!
//! Column-oriented in-memory table produced by the ingestors and transformed by the
//! pipeline stages. Column names are unique and every column has the same length.
use crate::error::DashboardError;

pub mod column;
pub mod value;

pub use column::{Column, ColumnClass};
pub use value::Value;

/// Ordered set of equally long, uniquely named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns, rejecting duplicate names and ragged lengths.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DashboardError> {
        let mut table = Table::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Appends a column at the end of the table.
    pub fn push_column(&mut self, column: Column) -> Result<(), DashboardError> {
        if self.column(&column.name).is_some() {
            return Err(DashboardError::DuplicateColumn(column.name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            Err(DashboardError::ParseError(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count()
            )))?
        }
        self.columns.push(column);
        Ok(())
    }

    /// Replaces the column with the same name in place, or appends it.
    pub fn set_column(&mut self, column: Column) -> Result<(), DashboardError> {
        match self.columns.iter().position(|it| it.name == column.name) {
            Some(index) if column.len() == self.row_count() => {
                self.columns[index] = column;
                Ok(())
            }
            Some(_) => Err(DashboardError::ParseError(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count()
            ))),
            None => self.push_column(column),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Like [`Table::column`] but fails with `ColumnNotFound`.
    pub fn require_column(&self, name: &str) -> Result<&Column, DashboardError> {
        self.column(name)
            .ok_or_else(|| DashboardError::ColumnNotFound(name.to_owned()))
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index < self.row_count() {
            Some(self.columns.iter().map(|column| &column.values[index]).collect())
        } else {
            None
        }
    }

    /// Keeps the rows whose mask entry is true. The mask must cover every row.
    pub fn retain_rows(&self, mask: &[bool]) -> Table {
        debug_assert_eq!(mask.len(), self.row_count());
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = column
                    .values
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(value, _)| value.clone())
                    .collect();
                Column::new(column.name.clone(), values)
            })
            .collect();
        Table { columns }
    }

    /// Rebuilds every column through `transform`, which must keep names and lengths.
    pub(crate) fn map_columns<F: FnMut(&Column) -> Column>(&self, transform: F) -> Table {
        let columns: Vec<Column> = self.columns.iter().map(transform).collect();
        debug_assert!(columns.iter().all(|column| column.len() == self.row_count()));
        Table { columns }
    }

    /// First `limit` rows, used for the preview.
    pub fn head(&self, limit: usize) -> Table {
        let mask: Vec<bool> = (0..self.row_count()).map(|index| index < limit).collect();
        self.retain_rows(&mask)
    }

    /// Names of the columns with the given class, in column order.
    pub fn columns_of_class(&self, class: ColumnClass) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| column.class() == class)
            .map(|column| column.name.as_str())
            .collect()
    }
}
