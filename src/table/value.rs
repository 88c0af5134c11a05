use chrono::NaiveDateTime;
use std::fmt::Display;

/// A single cell of a [`Table`](crate::table::Table).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing cell (empty field, gap in a sheet, failed conversion)
    #[default]
    Null,
    /// Numeric cell
    Number(f64),
    /// Free text cell
    Text(String),
    /// Parsed calendar date, only present in a normalized date column
    DateTime(NaiveDateTime),
}

impl Value {
    /// Builds a text cell, mapping empty text to `Null`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Value::Null
        } else {
            Value::Text(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(datetime) => Some(*datetime),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            Value::Number(number) => write!(f, "{}", number),
            Value::Text(text) => write!(f, "{}", text),
            Value::DateTime(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_text_is_null() {
        assert_eq!(Value::text(""), Value::Null);
        assert_eq!(Value::text("abc"), Value::Text("abc".to_owned()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Number(2000.0).to_string(), "2000");
        assert_eq!(Value::Number(1234.56).to_string(), "1234.56");
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Value::DateTime(datetime).to_string(), "2024-01-05 00:00:00");
    }
}
