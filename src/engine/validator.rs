//! Local validation engine.
//!
//! One pass over the normalized rows feeds every detector from
//! [`crate::checks`]. A schema missing any required column short-circuits
//! the pass before the lot authority is consulted or any row is inspected.
//!
//! # Graceful Degradation
//!
//! - Lot authority unavailable or no farm id: the lot check is disabled
//! - No rows: every required column is reported missing
//! - Malformed cell text: reported through the row checks, never an error

use crate::checks::{standard_detectors, LotCheck};
use crate::data::{CanonicalField, ColumnNormalizer, NormalizedRow, Sheet};
use crate::engine::result::{ResultAggregator, ResultMeta, ValidationResult};
use crate::services::{Availability, LotAuthority};
use tracing::{debug, warn};

/// Decide whether lots are checked for this pass.
pub fn resolve_lots(farm_id: Option<&str>, authority: Option<&dyn LotAuthority>) -> LotCheck {
    let (Some(farm_id), Some(authority)) = (farm_id.filter(|f| !f.trim().is_empty()), authority) else {
        return LotCheck::Disabled;
    };
    match authority.valid_lotes(farm_id) {
        Availability::Ready(lots) => LotCheck::from_set(lots),
        Availability::Unavailable(reason) => {
            warn!(farm_id, reason = %reason, "skipping lot validation");
            LotCheck::Disabled
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine {
    normalizer: ColumnNormalizer,
}

impl ValidationEngine {
    pub fn new() -> Self {
        ValidationEngine::default()
    }

    /// Validate sheets, asking `authority` for lots when a farm id is given.
    pub fn validate(
        &self,
        sheets: &[Sheet],
        farm_id: Option<&str>,
        authority: Option<&dyn LotAuthority>,
    ) -> ValidationResult {
        let rows = self.normalizer.normalize_sheets(sheets);
        let meta = meta_for(sheets, &rows);
        if let Err(result) = check_schema(&rows, meta) {
            return result;
        }
        let lots = resolve_lots(farm_id, authority);
        self.validate_rows(&rows, meta, &lots)
    }

    /// Validate sheets against an already resolved lot check.
    pub fn validate_with_lots(&self, sheets: &[Sheet], lots: &LotCheck) -> ValidationResult {
        let rows = self.normalizer.normalize_sheets(sheets);
        let meta = meta_for(sheets, &rows);
        self.validate_rows(&rows, meta, lots)
    }

    /// Run the schema check and then every row check over normalized rows.
    pub fn validate_rows(&self, rows: &[NormalizedRow], meta: ResultMeta, lots: &LotCheck) -> ValidationResult {
        let columns = match check_schema(rows, meta) {
            Ok(columns) => columns,
            Err(result) => return result,
        };

        let mut detectors = standard_detectors(lots);
        for row in rows {
            for detector in detectors.iter_mut() {
                detector.inspect(row);
            }
        }

        let mut aggregator = ResultAggregator::new();
        for detector in detectors.iter_mut() {
            aggregator.extend(detector.category(), detector.finish());
        }

        let result = aggregator.into_result(meta, columns);
        debug!(
            rows = meta.rows_total,
            ok = result.ok,
            lot_check = lots.is_enabled(),
            categories = result.errors.len(),
            "local validation finished"
        );
        result
    }
}

fn meta_for(sheets: &[Sheet], rows: &[NormalizedRow]) -> ResultMeta {
    ResultMeta {
        rows_total: rows.len(),
        sheets: sheets.len(),
    }
}

/// Columns detected from the first row, or the short-circuit result when a
/// required column is missing.
fn check_schema(rows: &[NormalizedRow], meta: ResultMeta) -> Result<Vec<String>, ValidationResult> {
    let columns = rows.first().map(|r| r.columns.clone()).unwrap_or_default();
    let missing: Vec<String> = CanonicalField::REQUIRED
        .iter()
        .map(|f| f.as_str())
        .filter(|name| !columns.iter().any(|c| c == name))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(columns)
    } else {
        debug!(missing = ?missing, "required columns missing");
        Err(ValidationResult::missing_columns(meta, columns, missing))
    }
}
