//! JSON workbook files.
//!
//! A workbook file holds either a bare grid:
//!
//! ```json
//! [["id", "val"], [1, "a"]]
//! ```
//!
//! or a set of named sheets:
//!
//! ```json
//! { "active": "Sheet1",
//!   "sheets": [ { "name": "data", "rows": [["id", "val"], [1, "a"]] } ] }
//! ```
//!
//! Rows are read as a rectangular data range: every row is padded with empty
//! strings to the width of the widest row, the way a spreadsheet reports
//! blank cells.

use std::path::{Path, PathBuf};

use gridhook_types::{CellValue, Grid, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::traits::GridSource;

/// Name of the sheet read when no other name is configured.
pub const DEFAULT_SHEET: &str = "data";

/// One named sheet in a workbook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetData {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A collection of named sheets with an optional active sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub sheets: Vec<WorksheetData>,
}

impl Workbook {
    /// Look up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&WorksheetData> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// The active sheet, or the first sheet when none is marked active.
    pub fn active_sheet(&self) -> Option<&WorksheetData> {
        self.active
            .as_deref()
            .and_then(|name| self.sheet(name))
            .or_else(|| self.sheets.first())
    }
}

/// On-disk shape: a bare grid or a workbook.
#[derive(Deserialize)]
#[serde(untagged)]
enum WorkbookFile {
    Grid(Vec<Row>),
    Workbook(Workbook),
}

/// Chooses which sheet of a workbook holds the dataset.
///
/// The named sheet wins; otherwise the workbook's active sheet is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSelector {
    pub name: String,
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self {
            name: DEFAULT_SHEET.to_string(),
        }
    }
}

impl SheetSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Pick the sheet from `workbook`.
    pub fn select<'a>(&self, workbook: &'a Workbook) -> SourceResult<&'a WorksheetData> {
        if let Some(sheet) = workbook.sheet(&self.name) {
            return Ok(sheet);
        }
        let fallback = workbook.active_sheet().ok_or(SourceError::NoSheet)?;
        debug!(wanted = %self.name, using = %fallback.name, "sheet not found; using active sheet");
        Ok(fallback)
    }
}

/// Reads the dataset from a JSON workbook file on every call.
#[derive(Clone, Debug)]
pub struct WorkbookFileSource {
    path: PathBuf,
    selector: SheetSelector,
}

impl WorkbookFileSource {
    /// Read `path`, selecting the default `data` sheet for workbooks.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_selector(path, SheetSelector::default())
    }

    pub fn with_selector(path: impl Into<PathBuf>, selector: SheetSelector) -> Self {
        Self {
            path: path.into(),
            selector,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn selector(&self) -> &SheetSelector {
        &self.selector
    }

    fn load(&self) -> SourceResult<Vec<Row>> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let file: WorkbookFile =
            serde_json::from_str(&text).map_err(|e| SourceError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        match file {
            WorkbookFile::Grid(rows) => Ok(rows),
            WorkbookFile::Workbook(workbook) => {
                Ok(self.selector.select(&workbook)?.rows.clone())
            }
        }
    }
}

impl GridSource for WorkbookFileSource {
    fn read_grid(&self) -> SourceResult<Grid> {
        let rows = self.load()?;
        Ok(Grid::new(rectangular(rows)))
    }
}

/// Pad every row with empty strings to the widest row's length.
fn rectangular(mut rows: Vec<Row>) -> Vec<Row> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, CellValue::String(String::new()));
    }
    rows
}
