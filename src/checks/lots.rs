//! Lot validity (SPT-007).

use super::RowDetector;
use crate::data::{CanonicalField, NormalizedRow};
use crate::engine::result::{ErrorCategory, ErrorEntry};
use std::collections::BTreeSet;

/// Whether a pass validates lot names, and against which set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LotCheck {
    /// No farm id, authority unavailable, or it returned nothing.
    #[default]
    Disabled,
    Enabled(BTreeSet<String>),
}

impl LotCheck {
    /// An empty set disables the check rather than rejecting every lot.
    pub fn from_set(valid: BTreeSet<String>) -> Self {
        if valid.is_empty() {
            LotCheck::Disabled
        } else {
            LotCheck::Enabled(valid)
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, LotCheck::Enabled(_))
    }
}

/// Flags lots missing from the authority set. Blank lots are left to the
/// empty-value check.
#[derive(Debug)]
pub struct LotValidityDetector {
    valid: BTreeSet<String>,
    entries: Vec<ErrorEntry>,
}

impl LotValidityDetector {
    pub fn new(valid: BTreeSet<String>) -> Self {
        LotValidityDetector {
            valid,
            entries: Vec::new(),
        }
    }
}

impl RowDetector for LotValidityDetector {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidLot
    }

    fn inspect(&mut self, row: &NormalizedRow) {
        if let Some(lote) = row.present(CanonicalField::Lote) {
            if !self.valid.contains(lote) {
                self.entries.push(ErrorEntry::InvalidLot {
                    row: row.row_number,
                    lote: lote.to_string(),
                });
            }
        }
    }

    fn finish(&mut self) -> Vec<ErrorEntry> {
        std::mem::take(&mut self.entries)
    }
}
