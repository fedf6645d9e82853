//! External collaborators: the lot authority and the remote validator.
//!
//! # Graceful Degradation
//!
//! Nothing in this module surfaces a failure to its caller as an error:
//! - Connection refused / DNS failure: `Availability::Unavailable` with the reason
//! - Timeout: `Availability::Unavailable`; each client has its own timeout
//! - Non-2xx status: `Availability::Unavailable` with the status code
//! - Error-shaped or undecodable payload: `Availability::Unavailable`
//!
//! Callers pattern-match on [`Availability`] and pick their degraded path.

pub mod lots;
pub mod remote;

use crate::engine::result::ValidationResult;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

pub use lots::{SiomaLotAuthority, StaticLotAuthority};
pub use remote::HttpRemoteValidator;

/// Result of asking an external collaborator for something.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> Availability<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Availability::Ready(v) => Some(v),
            Availability::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T, ServiceError>> for Availability<T> {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(v) => Availability::Ready(v),
            Err(e) => Availability::Unavailable(e.to_string()),
        }
    }
}

/// Failures inside the HTTP collaborators. Never leaves this module except
/// as the reason string of [`Availability::Unavailable`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("service reported an error: {0}")]
    ErrorPayload(String),
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cannot attach upload: {0}")]
    Attachment(#[from] std::io::Error),
    #[error("{0}")]
    NotConfigured(String),
}

/// Source of valid lot names for a farm.
pub trait LotAuthority {
    fn valid_lotes(&self, farm_id: &str) -> Availability<BTreeSet<String>>;
}

/// What is handed to the remote validator: a staged copy of the upload plus
/// optional context.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    /// Path of the staged copy on disk.
    pub file_path: PathBuf,
    /// Name the upload had originally; the remote uses its extension.
    pub file_name: String,
    pub farm_id: Option<String>,
    pub valid_lotes: Option<BTreeSet<String>>,
}

/// A richer validator reachable over the network.
pub trait RemoteValidator {
    /// Queried before every delegation attempt.
    fn health(&self) -> Availability<()>;

    fn validate(&self, request: &RemoteRequest) -> Availability<ValidationResult>;
}
