use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Placeholder for missing or semantically empty categorical data.
pub const SENTINEL: &str = "-";

/// A single cell as read from a source file, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    /// Build a cell from CSV text, treating blank text as empty.
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(value.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Empty => Ok(()),
            RawCell::Text(s) => write!(f, "{}", s),
            RawCell::Number(n) => write!(f, "{}", n),
            RawCell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Untyped rows x labeled columns, exactly as found in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

static EMPTY_CELL: RawCell = RawCell::Empty;

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row unless every cell in it is blank.
    pub fn push_row(&mut self, row: Vec<RawCell>) {
        if row.iter().all(RawCell::is_blank) {
            return;
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, column); short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Canonical vehicle row produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    /// Zero-based position of the source row
    pub row: usize,
    pub make: String,
    pub model: String,
    pub search_name: String,
    pub cc: u64,
    pub fuel: String,
    pub transmission: String,
    pub drive: String,
    pub category: String,
    pub seating: String,
    pub crsp: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_code: Option<String>,
}
