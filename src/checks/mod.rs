//! Row-level spot checks.
//!
//! Each detector watches the normalized rows of one validation pass and
//! reports entries for a single error category:
//! - Empty values: required cells that are blank
//! - Range: latitude/longitude outside the valid degree range
//! - Duplicates: repeated coordinates, line/position keys, positions in a line
//! - Lots: lot names the lot authority does not know
//!
//! # Tie-break
//!
//! Duplicate detectors keep the first row seen in file order as the owner of
//! a key. Every later row with the same key is reported and points back to
//! that first row, never to the previous duplicate.
//!
//! Detectors are independent: none reads another's state, so they can be fed
//! the same row in any order within a pass.

pub mod duplicates;
pub mod empty;
pub mod lots;
pub mod range;

use crate::data::NormalizedRow;
use crate::engine::result::{ErrorCategory, ErrorEntry};

pub use lots::LotCheck;

/// A single-category detector fed one row at a time.
pub trait RowDetector {
    fn category(&self) -> ErrorCategory;

    fn inspect(&mut self, row: &NormalizedRow);

    /// Drain collected entries, in the order rows were inspected.
    fn finish(&mut self) -> Vec<ErrorEntry>;
}

/// Static description of a check, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInfo {
    pub id: &'static str,
    pub category: ErrorCategory,
    pub description: &'static str,
}

/// Every check the engine can run, in reporting order.
pub fn check_catalog() -> Vec<CheckInfo> {
    vec![
        CheckInfo {
            id: "SPT-001",
            category: ErrorCategory::MissingColumns,
            description: "Required columns latitud, longitud, linea, posicion, lote are present",
        },
        CheckInfo {
            id: "SPT-002",
            category: ErrorCategory::EmptyValues,
            description: "Required cells are not blank (0 is a value)",
        },
        CheckInfo {
            id: "SPT-003",
            category: ErrorCategory::CoordinateRange,
            description: "Latitude within [-90, 90] and longitude within [-180, 180]",
        },
        CheckInfo {
            id: "SPT-004",
            category: ErrorCategory::DuplicateCoordinates,
            description: "No two rows share the same latitude/longitude",
        },
        CheckInfo {
            id: "SPT-005",
            category: ErrorCategory::DuplicateLineInLot,
            description: "No repeated (lote, linea, posicion) within a lot",
        },
        CheckInfo {
            id: "SPT-006",
            category: ErrorCategory::DuplicatePositionInLine,
            description: "No repeated posicion within a (lote, linea)",
        },
        CheckInfo {
            id: "SPT-007",
            category: ErrorCategory::InvalidLot,
            description: "Lot names are known to the lot authority (when available)",
        },
    ]
}

/// The detector set for one pass.
pub fn standard_detectors(lots: &LotCheck) -> Vec<Box<dyn RowDetector>> {
    let mut detectors: Vec<Box<dyn RowDetector>> = vec![
        Box::new(empty::EmptyValueDetector::new()),
        Box::new(range::CoordinateRangeDetector::new()),
        Box::new(duplicates::CoordinateDuplicateDetector::new()),
        Box::new(duplicates::LineDuplicateDetector::new()),
        Box::new(duplicates::PositionDuplicateDetector::new()),
    ];
    if let LotCheck::Enabled(valid) = lots {
        detectors.push(Box::new(lots::LotValidityDetector::new(valid.clone())));
    }
    detectors
}
