//! Duplicate detectors (SPT-004, SPT-005, SPT-006).
//!
//! All three keep per-pass maps keyed by tuples, so `("1_2", "3")` and
//! `("1", "2_3")` never collide. The first row to present a key owns it.

use super::RowDetector;
use crate::data::{CanonicalField, NormalizedRow, Parsed};
use crate::engine::result::{CellValue, ErrorCategory, ErrorEntry};
use std::collections::HashMap;

/// Position component of a duplicate key.
///
/// Numeric positions compare by value, so `"12"` and `"12.0"` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PositionKey {
    Number(i64),
    Text(String),
    Absent,
}

impl PositionKey {
    pub fn of(row: &NormalizedRow) -> Self {
        match row.position() {
            Parsed::Value(v) => PositionKey::Number(v),
            Parsed::Invalid => match row.present(CanonicalField::Posicion) {
                Some(text) => PositionKey::Text(text.to_string()),
                None => PositionKey::Absent,
            },
            Parsed::Absent => PositionKey::Absent,
        }
    }

    /// Value echoed in error entries; `None` for the absent sentinel.
    pub fn to_cell(&self) -> Option<CellValue> {
        match self {
            PositionKey::Number(v) => Some(CellValue::Integer(*v)),
            PositionKey::Text(t) => Some(CellValue::Text(t.clone())),
            PositionKey::Absent => None,
        }
    }
}

fn coordinate_cell(parsed: Parsed<f64>, text: &str) -> CellValue {
    match parsed {
        Parsed::Value(v) => CellValue::Number(v),
        _ => CellValue::Text(text.to_string()),
    }
}

/// Same latitude/longitude text on more than one row.
#[derive(Debug, Default)]
pub struct CoordinateDuplicateDetector {
    seen: HashMap<(String, String), usize>,
    entries: Vec<ErrorEntry>,
}

impl CoordinateDuplicateDetector {
    pub fn new() -> Self {
        CoordinateDuplicateDetector::default()
    }
}

impl RowDetector for CoordinateDuplicateDetector {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::DuplicateCoordinates
    }

    fn inspect(&mut self, row: &NormalizedRow) {
        let (Some(lat), Some(lon)) = (
            row.present(CanonicalField::Latitud),
            row.present(CanonicalField::Longitud),
        ) else {
            return;
        };
        let first = *self
            .seen
            .entry((lat.to_string(), lon.to_string()))
            .or_insert(row.row_number);
        if first != row.row_number {
            self.entries.push(ErrorEntry::DuplicateCoordinates {
                row: row.row_number,
                duplicate_of_row: first,
                lat: coordinate_cell(row.latitude(), lat),
                lon: coordinate_cell(row.longitude(), lon),
            });
        }
    }

    fn finish(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}

/// Same `(lote, linea, posicion)` within a lot. A missing position is its
/// own key value, so two position-less rows on one line collide.
#[derive(Debug, Default)]
pub struct LineDuplicateDetector {
    seen: HashMap<(String, String, PositionKey), usize>,
    entries: Vec<ErrorEntry>,
}

impl LineDuplicateDetector {
    pub fn new() -> Self {
        LineDuplicateDetector::default()
    }
}

impl RowDetector for LineDuplicateDetector {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::DuplicateLineInLot
    }

    fn inspect(&mut self, row: &NormalizedRow) {
        let (Some(lote), Some(linea)) = (
            row.present(CanonicalField::Lote),
            row.present(CanonicalField::Linea),
        ) else {
            return;
        };
        let position = PositionKey::of(row);
        let first = *self
            .seen
            .entry((lote.to_string(), linea.to_string(), position.clone()))
            .or_insert(row.row_number);
        if first != row.row_number {
            self.entries.push(ErrorEntry::LineConflict {
                lote: lote.to_string(),
                linea: linea.to_string(),
                posicion: position.to_cell(),
                row: row.row_number,
                duplicate_of_row: first,
            });
        }
    }

    fn finish(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}

/// Same position twice within one `(lote, linea)`. Rows without a position
/// do not take part.
#[derive(Debug, Default)]
pub struct PositionDuplicateDetector {
    lines: HashMap<(String, String), HashMap<PositionKey, usize>>,
    entries: Vec<ErrorEntry>,
}

impl PositionDuplicateDetector {
    pub fn new() -> Self {
        PositionDuplicateDetector::default()
    }
}

impl RowDetector for PositionDuplicateDetector {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::DuplicatePositionInLine
    }

    fn inspect(&mut self, row: &NormalizedRow) {
        let (Some(lote), Some(linea)) = (
            row.present(CanonicalField::Lote),
            row.present(CanonicalField::Linea),
        ) else {
            return;
        };
        let position = PositionKey::of(row);
        if position == PositionKey::Absent {
            return;
        }
        let first = *self
            .lines
            .entry((lote.to_string(), linea.to_string()))
            .or_default()
            .entry(position.clone())
            .or_insert(row.row_number);
        if first != row.row_number {
            self.entries.push(ErrorEntry::LineConflict {
                lote: lote.to_string(),
                linea: linea.to_string(),
                posicion: position.to_cell(),
                row: row.row_number,
                duplicate_of_row: first,
            });
        }
    }

    fn finish(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}
