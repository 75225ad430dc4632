//! Foundation types for gridhook.
//!
//! This crate provides the tabular data model shared by every other gridhook
//! crate: the [`Grid`] read from a data source, the row identity rule used to
//! match rows across snapshots, the [`ChangeSet`] produced by the differ, and
//! the [`EventKind`] tags carried on the wire.
//!
//! # Key Types
//!
//! - [`Grid`] -- Header row plus ordered data rows
//! - [`Row`] / [`CellValue`] -- A row of scalar JSON cells
//! - [`ChangeSet`] / [`ChangeKind`] -- Add/delete/update partitions from one diff
//! - [`EventKind`] -- Outbound event tag (`initialLoad`, `add`, `delete`, `update`)
//! - [`RowObject`] -- A row flattened into a column-name keyed map

pub mod change;
pub mod error;
pub mod grid;
pub mod row_object;

pub use change::{ChangeKind, ChangeSet, EventKind};
pub use error::TypeError;
pub use grid::{cell_to_string, row_identity, CellValue, Grid, Row};
pub use row_object::{to_row_objects, RowObject};
