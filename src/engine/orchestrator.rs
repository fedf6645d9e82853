//! Validator delegation.
//!
//! Decides per upload whether the remote validator or the local engine
//! produces the result:
//!
//! ```text
//! ProbeHealth -> healthy   -> DelegateToRemote -> ok     -> remote result
//!                                              -> failed -> FallbackToLocal
//!             -> unhealthy -> FallbackToLocal
//! ```
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Remote not configured: local engine, no fallback reason
//! - Health probe fails: local engine, reason recorded on the outcome
//! - Remote errors, non-2xx, error-shaped payload: local engine, reason recorded
//! - Staging the upload copy fails: local engine, reason recorded
//! - Lot authority unavailable: lot check disabled on both paths
//!
//! The staged copy handed to the remote validator is a `NamedTempFile`, so it
//! is removed on every exit path including panics. Only a failure to read the
//! upload locally is returned as an error.

use crate::checks::LotCheck;
use crate::data::{SheetReader, Upload};
use crate::engine::result::{Backend, ValidationOutcome, ValidationResult};
use crate::engine::validator::{resolve_lots, ValidationEngine};
use crate::services::{Availability, LotAuthority, RemoteRequest, RemoteValidator};
use crate::SpotError;
use std::collections::BTreeSet;
use std::io::Write;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub struct ValidatorOrchestrator {
    reader: Box<dyn SheetReader>,
    engine: ValidationEngine,
    remote: Option<Box<dyn RemoteValidator>>,
    lot_authority: Option<Box<dyn LotAuthority>>,
}

impl ValidatorOrchestrator {
    /// Local-only orchestrator reading uploads with `reader`.
    pub fn new(reader: Box<dyn SheetReader>) -> Self {
        ValidatorOrchestrator {
            reader,
            engine: ValidationEngine::new(),
            remote: None,
            lot_authority: None,
        }
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteValidator>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_lot_authority(mut self, authority: Box<dyn LotAuthority>) -> Self {
        self.lot_authority = Some(authority);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Validate an upload. `valid_lotes`, when given, replaces the lot
    /// authority lookup.
    pub fn resolve(
        &self,
        upload: &Upload,
        farm_id: Option<&str>,
        valid_lotes: Option<&BTreeSet<String>>,
    ) -> Result<ValidationOutcome, SpotError> {
        let start = Instant::now();
        let explicit_lots = valid_lotes.map(|l| LotCheck::from_set(l.clone()));

        let mut resolved_lots: Option<LotCheck> = explicit_lots.clone();
        let mut fallback_reason = None;

        if let Some(remote) = self.remote.as_deref() {
            let lots = resolved_lots
                .get_or_insert_with(|| resolve_lots(farm_id, self.lot_authority.as_deref()))
                .clone();
            match delegate(remote, upload, farm_id, &lots) {
                Ok(result) => {
                    info!(file = %upload.file_name, ok = result.ok, "validated by remote validator");
                    return Ok(finish(result, Backend::Remote, None, upload, start));
                }
                Err(reason) => {
                    warn!(file = %upload.file_name, reason = %reason, "remote validator failed, falling back to local engine");
                    fallback_reason = Some(reason);
                }
            }
        }

        let sheets = self.reader.read_sheets(upload)?;
        let result = match resolved_lots {
            Some(lots) => self.engine.validate_with_lots(&sheets, &lots),
            None => self
                .engine
                .validate(&sheets, farm_id, self.lot_authority.as_deref()),
        };
        info!(file = %upload.file_name, ok = result.ok, "validated by local engine");
        Ok(finish(result, Backend::Local, fallback_reason, upload, start))
    }
}

fn finish(
    result: ValidationResult,
    backend: Backend,
    fallback_reason: Option<String>,
    upload: &Upload,
    start: Instant,
) -> ValidationOutcome {
    ValidationOutcome {
        result,
        backend,
        fallback_reason,
        source: upload.file_name.clone(),
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Probe, stage, and submit. `Err` carries the fallback reason.
fn delegate(
    remote: &dyn RemoteValidator,
    upload: &Upload,
    farm_id: Option<&str>,
    lots: &LotCheck,
) -> Result<ValidationResult, String> {
    if let Availability::Unavailable(reason) = remote.health() {
        return Err(format!("health check failed: {}", reason));
    }
    debug!("remote validator healthy");

    let staged = stage_upload(upload).map_err(|e| format!("cannot stage upload: {}", e))?;
    let request = RemoteRequest {
        file_path: staged.path().to_path_buf(),
        file_name: upload.file_name.clone(),
        farm_id: farm_id.map(str::to_string),
        valid_lotes: match lots {
            LotCheck::Enabled(set) => Some(set.clone()),
            LotCheck::Disabled => None,
        },
    };
    let answer = remote.validate(&request);
    drop(staged);

    match answer {
        // Re-derive `ok` and drop empty categories so both backends agree.
        Availability::Ready(r) => Ok(ValidationResult::new(r.meta, r.columns_detected, r.errors)),
        Availability::Unavailable(reason) => Err(reason),
    }
}

/// Write the upload to a temporary file keeping its extension.
fn stage_upload(upload: &Upload) -> std::io::Result<NamedTempFile> {
    let suffix = std::path::Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let mut staged = tempfile::Builder::new()
        .prefix("spot-upload-")
        .suffix(&suffix)
        .tempfile()?;
    staged.write_all(&upload.bytes)?;
    staged.flush()?;
    Ok(staged)
}
