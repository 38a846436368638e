//! Typed table cells.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single positional row of a table. Row 0 of a table is its header.
pub type Row = Vec<Cell>;

/// A table cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// `Empty` for an empty string, `Text` otherwise.
    pub fn text_or_empty(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::text("   ").is_blank());
        assert!(!Cell::text("x").is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn test_cell_serializes_tagged() {
        let cell = Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"type":"date","value":"2024-03-01"}"#);

        let empty: Cell = serde_json::from_str(r#"{"type":"empty"}"#).unwrap();
        assert_eq!(empty, Cell::Empty);
    }
}
