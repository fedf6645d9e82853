//! Coordinate range (SPT-003).

use super::RowDetector;
use crate::data::{CanonicalField, NormalizedRow, Parsed};
use crate::engine::result::{ErrorCategory, ErrorEntry};

const LATITUDE_LIMIT: f64 = 90.0;
const LONGITUDE_LIMIT: f64 = 180.0;

/// Flags numeric coordinates outside the valid degree range. Non-numeric
/// cells are not range-checked.
#[derive(Debug, Default)]
pub struct CoordinateRangeDetector {
    entries: Vec<ErrorEntry>,
}

impl CoordinateRangeDetector {
    pub fn new() -> Self {
        CoordinateRangeDetector::default()
    }

    fn check(&mut self, row: usize, field: CanonicalField, parsed: Parsed<f64>, limit: f64) {
        if let Parsed::Value(value) = parsed {
            if !(-limit..=limit).contains(&value) {
                self.entries.push(ErrorEntry::OutOfRange {
                    row,
                    field: field.as_str().to_string(),
                    value,
                });
            }
        }
    }
}

impl RowDetector for CoordinateRangeDetector {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::CoordinateRange
    }

    fn inspect(&mut self, row: &NormalizedRow) {
        self.check(row.row_number, CanonicalField::Latitud, row.latitude(), LATITUDE_LIMIT);
        self.check(row.row_number, CanonicalField::Longitud, row.longitude(), LONGITUDE_LIMIT);
    }

    fn finish(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}
