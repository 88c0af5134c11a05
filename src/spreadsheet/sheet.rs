use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::index_to_reference;
use std::collections::BTreeMap;

/// Cells read from one worksheet plus the bounds of the data they cover.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells in sheet order (row-major)
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(super) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Used range as an A1 reference such as `B2:D4`, `None` when the sheet is empty.
    pub(crate) fn dimension(&self) -> Option<String> {
        Some(format!(
            "{}:{}",
            index_to_reference(self.row_lower_bound?, self.col_lower_bound?),
            index_to_reference(self.row_upper_bound?, self.col_upper_bound?)
        ))
    }

    /// Lays the cells out as rows over the column range, in row order. Missing cells are
    /// `None` and rows without any cell are left out.
    pub(crate) fn rows(&self) -> Vec<Vec<Option<String>>> {
        let (Some(col_lower), Some(col_upper)) = (self.col_lower_bound, self.col_upper_bound) else {
            return Vec::new();
        };

        let width = col_upper - col_lower + 1;
        let mut records: BTreeMap<usize, Vec<Option<String>>> = BTreeMap::new();
        for cell in &self.cells {
            let record = records.entry(cell.row).or_insert_with(|| vec![None; width]);
            record[cell.col - col_lower] = Some(cell.to_text());
        }
        records.into_values().collect()
    }
}
