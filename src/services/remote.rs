//! HTTP client for the remote spot validator.
//!
//! Protocol:
//! - `GET {base}/health` answers 2xx when the service is up
//! - `POST {base}/api/validate-spots` takes a multipart form with `file`,
//!   optional `finca_id`, and optional `valid_lotes` (a JSON array string),
//!   and answers with a `ValidationResult` or `{"error": true, "message": ...}`

use super::{Availability, RemoteRequest, RemoteValidator, ServiceError};
use crate::engine::result::ValidationResult;
use crate::RemoteConfig;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct HttpRemoteValidator {
    base_url: String,
    health_client: Client,
    validate_client: Client,
}

impl HttpRemoteValidator {
    pub fn new(config: &RemoteConfig) -> Result<Self, ServiceError> {
        let build = |secs: u64| {
            Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .map_err(|source| ServiceError::Http {
                    url: config.url.clone(),
                    source,
                })
        };
        Ok(HttpRemoteValidator {
            base_url: config.url.trim_end_matches('/').to_string(),
            health_client: build(config.health_timeout_secs)?,
            validate_client: build(config.validate_timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn probe(&self) -> Result<(), ServiceError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .health_client
            .get(&url)
            .send()
            .map_err(|source| ServiceError::Http {
                url: url.clone(),
                source,
            })?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                url,
                status: response.status().as_u16(),
            })
        }
    }

    fn submit(&self, request: &RemoteRequest) -> Result<ValidationResult, ServiceError> {
        let url = format!("{}/api/validate-spots", self.base_url);

        let file = Part::file(&request.file_path)?.file_name(request.file_name.clone());
        let mut form = Form::new().part("file", file);
        if let Some(farm_id) = request.farm_id.as_deref().filter(|f| !f.is_empty()) {
            form = form.text("finca_id", farm_id.to_string());
        }
        if let Some(lots) = request.valid_lotes.as_ref().filter(|l| !l.is_empty()) {
            form = form.text("valid_lotes", serde_json::to_string(lots)?);
        }

        debug!(url = %url, file = %request.file_name, "submitting upload to remote validator");
        let response = self
            .validate_client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|source| ServiceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(|source| ServiceError::Http {
            url: url.clone(),
            source,
        })?;
        decode_response(&body)
    }
}

impl RemoteValidator for HttpRemoteValidator {
    fn health(&self) -> Availability<()> {
        self.probe().into()
    }

    fn validate(&self, request: &RemoteRequest) -> Availability<ValidationResult> {
        let result = self.submit(request);
        if let Ok(r) = &result {
            info!(ok = r.ok, rows = r.meta.rows_total, "remote validator answered");
        }
        result.into()
    }
}

/// Decode a validate-spots body, treating `{"error": true, ...}` as failure.
pub fn decode_response(body: &str) -> Result<ValidationResult, ServiceError> {
    let value: Value = serde_json::from_str(body)?;
    if let Some(flag) = value.get("error") {
        if flag.as_bool().unwrap_or(true) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("remote validator returned an error")
                .to_string();
            return Err(ServiceError::ErrorPayload(message));
        }
    }
    Ok(serde_json::from_value(value)?)
}
