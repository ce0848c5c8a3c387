//! Field name to column index resolution
//!
//! Maps a caller's selected field names onto positions in the log header so
//! that each data row can be projected without name lookups.

use std::collections::HashMap;

use super::header::LogHeader;
use crate::app::models::Row;
use crate::{Error, Result};

/// Resolved column positions for a field selection
///
/// `indices[i]` is the column of `names[i]` in every data row. Order and
/// duplicates follow the selection as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIndex {
    names: Vec<String>,
    indices: Vec<usize>,
}

impl FieldIndex {
    /// Resolve selected field names against a header
    ///
    /// Fails on the first name that does not appear verbatim in the header;
    /// no partial index is returned.
    pub fn resolve(header: &LogHeader, selected: &[String]) -> Result<Self> {
        let mut name_to_index: HashMap<&str, usize> = HashMap::with_capacity(header.len());
        for (index, name) in header.fields().iter().enumerate() {
            // first occurrence wins for duplicated header names
            name_to_index.entry(name.as_str()).or_insert(index);
        }

        let indices = selected
            .iter()
            .map(|field| {
                name_to_index
                    .get(field.as_str())
                    .copied()
                    .ok_or_else(|| Error::not_found(field.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(Self {
            names: selected.to_vec(),
            indices,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Minimum number of columns a row needs for this projection
    pub fn required_columns(&self) -> usize {
        self.indices.iter().max().map_or(0, |max| max + 1)
    }

    /// Pick the selected values out of a split data line
    ///
    /// Returns `None` when the row is too short for one of the indices.
    pub fn project(&self, values: &[&str]) -> Option<Row> {
        self.indices
            .iter()
            .map(|&index| values.get(index).map(|value| value.to_string()))
            .collect()
    }
}
