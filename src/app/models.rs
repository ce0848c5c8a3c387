//! Core data structures for Bro log processing
//!
//! Rows are raw text: no value is coerced to a typed representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed data line, one value per active field in field order
pub type Row = Vec<String>;

/// Which columns a scan extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// Every header column; rows must match the header column count
    AllFields,
    /// Only the caller's selected columns, via resolved indices
    SelectedFields,
}

impl ScanMode {
    pub fn from_all_fields(all_fields: bool) -> Self {
        if all_fields {
            Self::AllFields
        } else {
            Self::SelectedFields
        }
    }

    pub fn is_all_fields(&self) -> bool {
        matches!(self, Self::AllFields)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllFields => write!(f, "all fields"),
            Self::SelectedFields => write!(f, "selected fields"),
        }
    }
}

/// Replace `.` with `_` so field names can be used as identifiers
///
/// Bro names nested record fields with dots (`id.orig_h`), which most
/// downstream schemas reject.
pub fn underscore_field_name(field: &str) -> String {
    field.replace('.', "_")
}
