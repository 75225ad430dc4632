//! Grid-level diff: compare two snapshots row by row.
//!
//! Rows are matched across snapshots by their identity (the first cell).
//! Rows whose identity is null or the empty string cannot be matched and are
//! left out of every category.

use std::collections::HashSet;

use gridhook_types::{row_identity, CellValue, ChangeSet, Grid, Row};

/// Compute the change set between `previous` and `current`.
///
/// - `delete`: previous rows whose identity is missing from `current`.
/// - `add`: current rows whose identity is missing from `previous`.
/// - `update`: current rows whose identity exists in `previous` and whose
///   first matching previous row differs in any cell.
///
/// Header rows are never classified. Output order follows the source grid
/// (previous for deletes, current for adds and updates). Rows sharing an
/// identity are kept as-is; updates compare against the first match.
pub fn diff_grids(previous: &Grid, current: &Grid) -> ChangeSet {
    let previous_ids = identities(previous.data_rows());
    let current_ids = identities(current.data_rows());

    let delete = previous
        .data_rows()
        .iter()
        .filter(|row| row_identity(row).is_some_and(|id| !current_ids.contains(&Key(id))))
        .cloned()
        .collect();

    let add = current
        .data_rows()
        .iter()
        .filter(|row| row_identity(row).is_some_and(|id| !previous_ids.contains(&Key(id))))
        .cloned()
        .collect();

    let update = current
        .data_rows()
        .iter()
        .filter(|row| {
            row_identity(row)
                .and_then(|id| first_match(previous.data_rows(), id))
                .is_some_and(|old| old != *row)
        })
        .cloned()
        .collect();

    ChangeSet { add, delete, update }
}

/// The first row in `rows` whose tracked identity equals `id`.
fn first_match<'a>(rows: &'a [Row], id: &CellValue) -> Option<&'a Row> {
    rows.iter().find(|row| row_identity(row) == Some(id))
}

fn identities(rows: &[Row]) -> HashSet<Key<'_>> {
    rows.iter().filter_map(|row| row_identity(row)).map(Key).collect()
}

/// Hashable view of a cell used as a set key.
///
/// `serde_json::Value` is `Eq` but not `Hash`; cells are scalars, so the
/// compact JSON text is a faithful key.
#[derive(PartialEq, Eq)]
struct Key<'a>(&'a CellValue);

impl std::hash::Hash for Key<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_string().hash(state);
    }
}
