use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;

/// A single scalar cell: string, number, boolean, or null.
pub type CellValue = Value;

/// An ordered sequence of cells.
pub type Row = Vec<CellValue>;

/// A snapshot of the tabular dataset.
///
/// Row 0 is the header (column names); rows `1..N` are data rows. A grid
/// serializes as a plain JSON array of arrays, which is also the format of
/// the persisted baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    /// Create a grid from raw rows (header first).
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Create a grid with no header and no data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a grid from a header and data rows.
    pub fn with_header(header: Row, data: Vec<Row>) -> Self {
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Self { rows }
    }

    /// The header row, if the grid has one.
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Header cells rendered as column names.
    pub fn header_names(&self) -> Vec<String> {
        self.header()
            .map(|h| h.iter().map(cell_to_string).collect())
            .unwrap_or_default()
    }

    /// All data rows (everything after the header).
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// All rows including the header.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the grid and return its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the grid has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of data rows.
    pub fn data_len(&self) -> usize {
        self.data_rows().len()
    }

    /// Width of the header row (0 for an empty grid).
    pub fn width(&self) -> usize {
        self.header().map_or(0, Vec::len)
    }

    /// Encode as compact JSON (array of arrays).
    pub fn to_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode from JSON (array of arrays).
    pub fn from_json(s: &str) -> Result<Self, TypeError> {
        serde_json::from_str(s).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

impl From<Vec<Row>> for Grid {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

/// The tracked identity of a data row: its first cell.
///
/// Returns `None` when the row has no first cell, or when that cell is null
/// or the empty string. Untracked rows cannot be matched across snapshots.
pub fn row_identity(row: &[CellValue]) -> Option<&CellValue> {
    match row.first()? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        v => Some(v),
    }
}

/// Render a cell as text: strings verbatim, null as empty, everything else
/// in its JSON form.
pub fn cell_to_string(cell: &CellValue) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
