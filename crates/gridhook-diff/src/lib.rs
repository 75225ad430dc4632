//! Row-level diff engine for gridhook.
//!
//! Compares a baseline [`Grid`](gridhook_types::Grid) with the current one
//! and partitions data rows into a [`ChangeSet`](gridhook_types::ChangeSet)
//! using the first column as the row identity.
//!
//! # Key Functions
//!
//! - [`diff_grids`] -- Classify every data row into add/delete/update

pub mod grid_diff;

pub use grid_diff::diff_grids;
