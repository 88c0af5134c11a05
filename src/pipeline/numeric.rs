//! All-or-nothing numeric coercion of text columns
use crate::table::column::DECIMAL_PATTERN;
use crate::table::{Column, ColumnClass, Table, Value};
use thiserror::Error;
use tracing::debug;

/// Why a column was left as it is.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Unchanged {
    #[error("column holds dates")]
    Temporal,

    #[error("row {row} holds non-numeric text '{value}'")]
    NotNumeric { row: usize, value: String },
}

/// Reads a text cell as a number after mapping `,` to `.` and dropping `%`.
/// Blank text becomes `Null`; anything that is not a plain decimal number fails.
fn coerce_text(text: &str) -> Option<Value> {
    let cleaned = text.replace(',', ".").replace('%', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        Some(Value::Null)
    } else if DECIMAL_PATTERN.is_match(cleaned) {
        cleaned.parse::<f64>().ok().map(Value::Number)
    } else {
        None
    }
}

/// Converts every text cell of `column` to a number, or reports the first cell that
/// prevents it. Number and null cells are kept as they are.
pub fn coerce_column(column: &Column) -> Result<Column, Unchanged> {
    if column.class() == ColumnClass::Temporal {
        return Err(Unchanged::Temporal);
    }
    let values = column
        .values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Value::Text(text) => coerce_text(text).ok_or_else(|| Unchanged::NotNumeric {
                row,
                value: text.to_owned(),
            }),
            other => Ok(other.clone()),
        })
        .collect::<Result<Vec<Value>, Unchanged>>()?;
    Ok(Column::new(column.name.clone(), values))
}

/// Coerces each column independently; a column that cannot be fully converted keeps
/// its original cells. Never fails and applying it twice changes nothing.
pub fn coerce_numeric(table: &Table) -> Table {
    table.map_columns(|column| match coerce_column(column) {
        Ok(coerced) => coerced,
        Err(reason) => {
            debug!(column = %column.name, %reason, "column left unchanged");
            column.clone()
        }
    })
}
