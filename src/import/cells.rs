use serde::{Deserialize, Serialize};
use std::fmt;

use crate::renewal::dates;

/// A loosely typed spreadsheet cell, as produced by a tabular decoder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// True for missing cells and cells holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell contents as text. Whole numbers print without a fraction.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Cell contents as date text. Numeric cells are spreadsheet serial
    /// dates and become `YYYY-MM-DD`; anything else is passed through.
    pub fn to_date_text(&self) -> String {
        match self {
            Cell::Number(n) => dates::from_serial_day(*n)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| self.to_text()),
            _ => self.to_text(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}
