//! Grid snapshot readers for gridhook.
//!
//! A [`GridSource`] returns the live state of the tabular dataset on every
//! call. Nothing is cached: two reads in a row observe any edit made between
//! them.
//!
//! # Backends
//!
//! - [`InMemoryGridSource`] -- a mutable grid held in memory, for tests and embedding
//! - [`WorkbookFileSource`] -- a JSON grid or multi-sheet workbook file on disk

pub mod error;
pub mod memory;
pub mod traits;
pub mod workbook;

pub use error::{SourceError, SourceResult};
pub use memory::InMemoryGridSource;
pub use traits::GridSource;
pub use workbook::{SheetSelector, Workbook, WorkbookFileSource, WorksheetData, DEFAULT_SHEET};
