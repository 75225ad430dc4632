//! Flattening rows into column-name keyed objects.

use serde_json::{Map, Value};

use crate::grid::Row;

/// A data row keyed by header column names.
pub type RowObject = Map<String, Value>;

/// Flatten rows into objects keyed by `header`.
///
/// Column `i` of each row is stored under `header[i]`, and keys keep the
/// header's column order. Cells beyond the
/// header width are dropped and header columns the row does not reach are
/// left out of that row's object. When two columns share a name, the later
/// column wins.
pub fn to_row_objects(header: &[String], rows: &[Row]) -> Vec<RowObject> {
    rows.iter()
        .map(|row| {
            let mut object = Map::new();
            for (key, cell) in header.iter().zip(row.iter()) {
                object.insert(key.clone(), cell.clone());
            }
            object
        })
        .collect()
}
