use gridhook_types::{Grid, Row};

use crate::error::SourceResult;

/// Read access to the live tabular dataset.
///
/// Implementations must re-read live state on every call and must not
/// mutate the dataset. Failures are returned to the caller and never
/// retried here.
pub trait GridSource: Send + Sync {
    /// Read the entire dataset, header first, top-to-bottom and
    /// left-to-right.
    fn read_grid(&self) -> SourceResult<Grid>;

    /// Read only the header row.
    ///
    /// The default reads the full grid and keeps row 0; an empty grid has
    /// an empty header. The reconciler does not call this: it keys row
    /// objects by the header of the same `read_grid` snapshot it diffs, so
    /// the header and the rows always come from one read. This is for
    /// hosts that only need the column names.
    fn read_header(&self) -> SourceResult<Row> {
        Ok(self.read_grid()?.header().cloned().unwrap_or_default())
    }
}

impl<T: GridSource + ?Sized> GridSource for std::sync::Arc<T> {
    fn read_grid(&self) -> SourceResult<Grid> {
        (**self).read_grid()
    }

    fn read_header(&self) -> SourceResult<Row> {
        (**self).read_header()
    }
}
