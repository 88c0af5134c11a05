use crate::table::value::Value;
use regex::Regex;
use std::sync::LazyLock;

/// Plain decimal notation accepted when typing ingested columns and coercing text.
pub(crate) static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("Hardcode regex pattern")
});

/// Derived classification of a column; never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnClass {
    /// Every non-null cell is a number
    Numeric,
    /// At least one cell is text
    Categorical,
    /// Holds parsed dates (the normalized date column)
    Temporal,
}

impl ColumnClass {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnClass::Numeric => "numeric",
            ColumnClass::Categorical => "categorical",
            ColumnClass::Temporal => "temporal",
        }
    }
}

/// Represents a named column of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name (from the header row or generated)
    pub name: String,
    /// Cells in row order
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Classifies the column from its cells.
    pub fn class(&self) -> ColumnClass {
        if self.values.iter().any(|value| matches!(value, Value::DateTime(_))) {
            ColumnClass::Temporal
        } else if self.values.iter().all(|value| matches!(value, Value::Null | Value::Number(_))) {
            ColumnClass::Numeric
        } else {
            ColumnClass::Categorical
        }
    }

    /// Types a freshly ingested text column: if every non-null cell is a plain decimal
    /// number the whole column becomes numbers, otherwise it is kept as text.
    pub(crate) fn infer(name: String, cells: Vec<Option<String>>) -> Self {
        let is_numeric = cells
            .iter()
            .flatten()
            .all(|cell| DECIMAL_PATTERN.is_match(cell.trim()));
        let values = cells
            .into_iter()
            .map(|cell| match cell {
                None => Value::Null,
                Some(cell) if is_numeric => cell.trim().parse::<f64>().map(Value::Number).unwrap_or(Value::Null),
                Some(cell) => Value::text(cell),
            })
            .collect();
        Column::new(name, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|value| value.map(str::to_owned)).collect()
    }

    #[test]
    fn infer_numeric_column() {
        let column = Column::infer("Qtd".to_owned(), cells(&[Some("1"), None, Some(" 2.5 "), Some("-3e2")]));
        assert_eq!(column.values, vec![Value::Number(1.0), Value::Null, Value::Number(2.5), Value::Number(-300.0)]);
        assert_eq!(column.class(), ColumnClass::Numeric);
    }

    #[test]
    fn infer_mixed_column_keeps_text() {
        let column = Column::infer("Vendas".to_owned(), cells(&[Some("1"), Some("abc"), None]));
        assert_eq!(column.values, vec![Value::Text("1".to_owned()), Value::Text("abc".to_owned()), Value::Null]);
        assert_eq!(column.class(), ColumnClass::Categorical);
    }

    #[test]
    fn decimal_comma_is_not_a_number_at_ingestion() {
        let column = Column::infer("Vendas".to_owned(), cells(&[Some("1.234,56")]));
        assert_eq!(column.class(), ColumnClass::Categorical);
    }

    #[test]
    fn all_null_column_is_numeric() {
        let column = Column::new("Empty", vec![Value::Null, Value::Null]);
        assert_eq!(column.class(), ColumnClass::Numeric);
    }
}
