use std::sync::RwLock;

use gridhook_types::{CellValue, Grid, Row};

use crate::error::{SourceError, SourceResult};
use crate::traits::GridSource;

/// A mutable grid held in memory.
///
/// Intended for tests and embedding. Edits are visible to the next read.
/// Reads can be made to fail with [`set_unavailable`](Self::set_unavailable)
/// to simulate an unreachable source.
#[derive(Debug, Default)]
pub struct InMemoryGridSource {
    grid: RwLock<Grid>,
    unavailable: RwLock<Option<String>>,
}

impl InMemoryGridSource {
    /// Create a source holding the given grid.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid: RwLock::new(grid),
            unavailable: RwLock::new(None),
        }
    }

    /// Replace the whole grid.
    pub fn set_grid(&self, grid: Grid) {
        *self.grid.write().expect("lock poisoned") = grid;
    }

    /// Overwrite one cell. Grows the row with nulls when `col` is past its
    /// end. Returns `false` if `row` does not exist.
    pub fn set_cell(&self, row: usize, col: usize, value: CellValue) -> bool {
        let mut grid = self.grid.write().expect("lock poisoned");
        let mut rows = std::mem::take(&mut *grid).into_rows();
        let found = match rows.get_mut(row) {
            Some(r) => {
                if r.len() <= col {
                    r.resize(col + 1, CellValue::Null);
                }
                r[col] = value;
                true
            }
            None => false,
        };
        *grid = Grid::new(rows);
        found
    }

    /// Append a row at the bottom.
    pub fn push_row(&self, row: Row) {
        let mut grid = self.grid.write().expect("lock poisoned");
        let mut rows = std::mem::take(&mut *grid).into_rows();
        rows.push(row);
        *grid = Grid::new(rows);
    }

    /// Remove the row at `index` (0 is the header). Returns the removed row.
    pub fn remove_row(&self, index: usize) -> Option<Row> {
        let mut grid = self.grid.write().expect("lock poisoned");
        let mut rows = std::mem::take(&mut *grid).into_rows();
        let removed = (index < rows.len()).then(|| rows.remove(index));
        *grid = Grid::new(rows);
        removed
    }

    /// Make every subsequent read fail with `reason`; `None` restores reads.
    pub fn set_unavailable(&self, reason: Option<String>) {
        *self.unavailable.write().expect("lock poisoned") = reason;
    }

    fn check_available(&self) -> SourceResult<()> {
        match self.unavailable.read().expect("lock poisoned").as_ref() {
            Some(reason) => Err(SourceError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl GridSource for InMemoryGridSource {
    fn read_grid(&self) -> SourceResult<Grid> {
        self.check_available()?;
        Ok(self.grid.read().expect("lock poisoned").clone())
    }

    fn read_header(&self) -> SourceResult<Row> {
        self.check_available()?;
        let grid = self.grid.read().expect("lock poisoned");
        Ok(grid.header().cloned().unwrap_or_default())
    }
}
