//! Mock remote validator and lot authority.

use spot_validator::engine::result::ValidationResult;
use spot_validator::services::{Availability, LotAuthority, RemoteRequest, RemoteValidator};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// What the remote validator saw on one `validate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub file_name: String,
    pub staged_path: PathBuf,
    /// Contents of the staged copy at call time; `None` if it was missing.
    pub staged_bytes: Option<Vec<u8>>,
    pub farm_id: Option<String>,
    pub valid_lotes: Option<BTreeSet<String>>,
}

/// Shared call log of a [`MockRemoteValidator`].
#[derive(Debug, Clone, Default)]
pub struct RemoteLog {
    pub health_checks: Arc<Mutex<usize>>,
    pub calls: Arc<Mutex<Vec<RemoteCall>>>,
}

impl RemoteLog {
    pub fn health_count(&self) -> usize {
        *self.health_checks.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct MockRemoteValidator {
    health: Availability<()>,
    answer: Availability<ValidationResult>,
    log: RemoteLog,
}

impl MockRemoteValidator {
    /// Healthy and answering with `result`.
    pub fn answering(result: ValidationResult) -> Self {
        MockRemoteValidator {
            health: Availability::Ready(()),
            answer: Availability::Ready(result),
            log: RemoteLog::default(),
        }
    }

    /// Health probe fails.
    pub fn unhealthy(reason: &str) -> Self {
        MockRemoteValidator {
            health: Availability::Unavailable(reason.to_string()),
            answer: Availability::Unavailable("validate must not be called".to_string()),
            log: RemoteLog::default(),
        }
    }

    /// Healthy, but validation fails.
    pub fn failing(reason: &str) -> Self {
        MockRemoteValidator {
            health: Availability::Ready(()),
            answer: Availability::Unavailable(reason.to_string()),
            log: RemoteLog::default(),
        }
    }

    pub fn log(&self) -> RemoteLog {
        self.log.clone()
    }
}

impl RemoteValidator for MockRemoteValidator {
    fn health(&self) -> Availability<()> {
        *self.log.health_checks.lock().unwrap() += 1;
        self.health.clone()
    }

    fn validate(&self, request: &RemoteRequest) -> Availability<ValidationResult> {
        self.log.calls.lock().unwrap().push(RemoteCall {
            file_name: request.file_name.clone(),
            staged_path: request.file_path.clone(),
            staged_bytes: std::fs::read(&request.file_path).ok(),
            farm_id: request.farm_id.clone(),
            valid_lotes: request.valid_lotes.clone(),
        });
        self.answer.clone()
    }
}

/// Lot authority returning a fixed answer and recording farm ids.
pub struct MockLotAuthority {
    answer: Availability<BTreeSet<String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLotAuthority {
    pub fn with_lots(lots: &[&str]) -> Self {
        MockLotAuthority {
            answer: Availability::Ready(lots.iter().map(|l| l.to_string()).collect()),
            calls: Arc::default(),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        MockLotAuthority {
            answer: Availability::Unavailable(reason.to_string()),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl LotAuthority for MockLotAuthority {
    fn valid_lotes(&self, farm_id: &str) -> Availability<BTreeSet<String>> {
        self.calls.lock().unwrap().push(farm_id.to_string());
        self.answer.clone()
    }
}
