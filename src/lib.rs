//! spot-validator library
//!
//! Validation and cleanup of geo-referenced palm spot sheets.
//!
//! This library provides:
//! - Header normalization and the local validation engine (schema, empty
//!   values, coordinate range, duplicates, unknown lots)
//! - Delegation to a remote validator with fallback to the local engine
//! - Correction exports that drop or mark offending rows
//! - Planting line reconstruction, lot perimeters, and GeoJSON export
//!
//! # Example
//!
//! ```no_run
//! use spot_validator::{run_validation, SpotCheckConfig};
//! use std::path::Path;
//!
//! let config = SpotCheckConfig::default();
//! let outcome = run_validation(&config, Path::new("spots.csv"), None, None, true)
//!     .expect("Validation failed");
//! println!("ok: {} ({})", outcome.result.ok, outcome.backend);
//! ```

pub mod checks;
pub mod cli;
pub mod commands;
pub mod correction;
pub mod data;
pub mod engine;
pub mod geometry;
pub mod services;
pub mod version;

use data::{CsvSheetReader, Upload};
use engine::result::ValidationOutcome;
use engine::ValidatorOrchestrator;
use geometry::LineConfig;
use serde::{Deserialize, Serialize};
use services::{HttpRemoteValidator, SiomaLotAuthority};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

// Re-exports for public API
pub use correction::CorrectionFileGenerator;
pub use engine::result::{ErrorCategory, ErrorEntry, ValidationResult};
pub use engine::ValidationEngine;
pub use geometry::SpatialLineReconstructor;

/// Error types for spot-validator operations.
#[derive(Debug, Clone, Error)]
pub enum SpotError {
    /// I/O error
    #[error("I/O error in {context}: {message}")]
    Io { context: String, message: String },
    /// Parse error
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },
    /// Configuration error
    #[error("Configuration error in {context}: {message}")]
    Config { context: String, message: String },
    /// A correction was requested for a result missing required columns
    #[error("Cannot build a correction file, required columns missing ({})", .missing.join(", "))]
    SchemaIncomplete { missing: Vec<String> },
}

/// Remote validator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: String,
    pub health_timeout_secs: u64,
    pub validate_timeout_secs: u64,
    /// When false every upload goes straight to the local engine.
    pub enabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: "http://localhost:8001".to_string(),
            health_timeout_secs: 5,
            validate_timeout_secs: 120,
            enabled: true,
        }
    }
}

/// Lot authority settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotsConfig {
    pub api_base: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LotsConfig {
    fn default() -> Self {
        LotsConfig {
            api_base: "https://api.sioma.dev".to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

/// Top-level configuration: defaults, then an optional TOML file, then the
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotCheckConfig {
    pub remote: RemoteConfig,
    pub lots: LotsConfig,
    pub lines: LineConfig,
}

impl SpotCheckConfig {
    /// Load from `path` (if any) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SpotError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => SpotCheckConfig::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, SpotError> {
        let text = std::fs::read_to_string(path).map_err(|e| SpotError::Io {
            context: format!("reading {}", path.display()),
            message: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            SpotError::Config { message, .. } => SpotError::Config {
                context: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, SpotError> {
        toml::from_str(text).map_err(|e| SpotError::Config {
            context: "toml".to_string(),
            message: e.to_string(),
        })
    }

    pub fn apply_env(&mut self) -> Result<(), SpotError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`. Blank values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), SpotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("SPOT_VALIDATOR_URL") {
            self.remote.url = url;
        }
        if let Some(base) = get("SIOMA_API_BASE") {
            self.lots.api_base = base;
        }
        if let Some(token) = get("SIOMA_API_TOKEN") {
            self.lots.api_token = Some(token);
        }
        if let Some(timeout) = get("SIOMA_API_TIMEOUT") {
            self.lots.timeout_secs = timeout.parse().map_err(|_| SpotError::Config {
                context: "SIOMA_API_TIMEOUT".to_string(),
                message: format!("expected whole seconds, got '{}'", timeout),
            })?;
        }
        Ok(())
    }
}

/// Wire up the orchestrator for `config`.
///
/// The remote validator is attached unless disabled or `local_only`; the lot
/// authority only when a token is configured. A collaborator whose HTTP
/// client cannot be built is left out with a warning.
pub fn build_orchestrator(config: &SpotCheckConfig, local_only: bool) -> ValidatorOrchestrator {
    let mut orchestrator = ValidatorOrchestrator::new(Box::new(CsvSheetReader::new()));

    if config.remote.enabled && !local_only {
        match HttpRemoteValidator::new(&config.remote) {
            Ok(remote) => orchestrator = orchestrator.with_remote(Box::new(remote)),
            Err(e) => warn!(error = %e, "remote validator disabled"),
        }
    } else {
        debug!("remote validator not used");
    }

    if config.lots.api_token.is_some() {
        match SiomaLotAuthority::new(&config.lots) {
            Ok(authority) => orchestrator = orchestrator.with_lot_authority(Box::new(authority)),
            Err(e) => warn!(error = %e, "lot authority disabled"),
        }
    }

    orchestrator
}

/// Validate one file.
///
/// This is the main entry point for validating a spot sheet from disk.
/// `valid_lotes`, when given, is used instead of asking the lot authority.
pub fn run_validation(
    config: &SpotCheckConfig,
    path: &Path,
    farm_id: Option<&str>,
    valid_lotes: Option<&BTreeSet<String>>,
    local_only: bool,
) -> Result<ValidationOutcome, SpotError> {
    let upload = Upload::from_path(path)?;
    build_orchestrator(config, local_only).resolve(&upload, farm_id, valid_lotes)
}
