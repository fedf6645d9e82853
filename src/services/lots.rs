//! Lot authority backed by the Sioma API.

use super::{Availability, LotAuthority, ServiceError};
use crate::LotsConfig;
use reqwest::blocking::Client;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Subject type id the API uses for lots.
const LOT_SUBJECT_TYPE: &str = "[3]";

/// Reads lot names from `GET {base}/4/usuarios/sujetos`.
#[derive(Debug, Clone)]
pub struct SiomaLotAuthority {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl SiomaLotAuthority {
    pub fn new(config: &LotsConfig) -> Result<Self, ServiceError> {
        let url = config.api_base.clone();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ServiceError::Http { url, source })?;
        Ok(SiomaLotAuthority {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    fn fetch(&self) -> Result<BTreeSet<String>, ServiceError> {
        let token = self.token.as_deref().ok_or_else(|| {
            ServiceError::NotConfigured("lot authority token is not set".to_string())
        })?;
        let url = format!("{}/4/usuarios/sujetos", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", token)
            .header("Content-Type", "application/json")
            .header("tipo-sujetos", LOT_SUBJECT_TYPE)
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
        parse_lot_names(&body)
    }
}

impl LotAuthority for SiomaLotAuthority {
    fn valid_lotes(&self, farm_id: &str) -> Availability<BTreeSet<String>> {
        match self.fetch() {
            Ok(lots) => {
                debug!(farm_id, lots = lots.len(), "lot authority answered");
                Availability::Ready(lots)
            }
            Err(e) => {
                warn!(farm_id, error = %e, "lot authority unavailable, lot check disabled");
                Availability::Unavailable(e.to_string())
            }
        }
    }
}

/// Pull `nombre` out of every subject in the response array.
pub fn parse_lot_names(body: &str) -> Result<BTreeSet<String>, ServiceError> {
    let value: Value = serde_json::from_str(body)?;
    if value.get("error").is_some() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("lot authority returned an error")
            .to_string();
        return Err(ServiceError::ErrorPayload(message));
    }
    let items = value
        .as_array()
        .ok_or_else(|| ServiceError::ErrorPayload("expected a list of subjects".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| match item.get("nombre")? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .collect())
}

/// A fixed lot list, e.g. given on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticLotAuthority {
    lots: BTreeSet<String>,
}

impl StaticLotAuthority {
    pub fn new<I, S>(lots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticLotAuthority {
            lots: lots.into_iter().map(Into::into).collect(),
        }
    }
}

impl LotAuthority for StaticLotAuthority {
    fn valid_lotes(&self, _farm_id: &str) -> Availability<BTreeSet<String>> {
        Availability::Ready(self.lots.clone())
    }
}
