//! Empty required values (SPT-002).

use super::RowDetector;
use crate::data::{CanonicalField, NormalizedRow};
use crate::engine::result::{ErrorCategory, ErrorEntry};

/// Flags each required column whose cell is missing or blank.
#[derive(Debug, Default)]
pub struct EmptyValueDetector {
    entries: Vec<ErrorEntry>,
}

impl EmptyValueDetector {
    pub fn new() -> Self {
        EmptyValueDetector::default()
    }
}

impl RowDetector for EmptyValueDetector {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::EmptyValues
    }

    fn inspect(&mut self, row: &NormalizedRow) {
        for field in CanonicalField::REQUIRED {
            if row.present(field).is_none() {
                self.entries.push(ErrorEntry::EmptyValue {
                    row: row.row_number,
                    column: field.as_str().to_string(),
                });
            }
        }
    }

    fn finish(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}
