use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fallback::fallback_for;

/// Default search endpoint (OpenStreetMap Nominatim).
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim's usage policy requires an identifying client header.
pub const DEFAULT_USER_AGENT: &str = "Nexium/0.1 (gestao de obras)";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const COUNTRY_CODE: &str = "br";
const COUNTRY_QUALIFIER: &str = ", Brasil";
const MIN_ADDRESS_LEN: usize = 5;
const MIN_CONSECUTIVE_LETTERS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Input rejected before any request was made.
    #[error("invalid address: {0}")]
    Validation(String),

    /// The search service was unreachable or answered with something unusable.
    #[error("address lookup failed: {0}")]
    Lookup(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// One hit from the search endpoint. Nominatim returns coordinates as strings.
#[derive(Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Check an address is worth sending: at least 5 characters and at least 3
/// consecutive letters. Returns the trimmed address.
pub fn validate_address(address: &str) -> Result<String, GeocodeError> {
    let trimmed = address.trim();
    if trimmed.chars().count() < MIN_ADDRESS_LEN {
        return Err(GeocodeError::Validation(format!(
            "address must have at least {MIN_ADDRESS_LEN} characters"
        )));
    }

    let mut run = 0usize;
    let mut longest = 0usize;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    if longest < MIN_CONSECUTIVE_LETTERS {
        return Err(GeocodeError::Validation(format!(
            "address must contain at least {MIN_CONSECUTIVE_LETTERS} consecutive letters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Append the country unless the address already names it.
pub fn with_country_qualifier(address: &str) -> String {
    let lower = address.to_lowercase();
    let names_country = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "brasil" || word == "brazil");
    if names_country {
        address.to_string()
    } else {
        format!("{address}{COUNTRY_QUALIFIER}")
    }
}

/// Client for the address search service.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl AddressResolver {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Lookup(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Look up `address`. `Ok(None)` means the service found nothing.
    pub async fn resolve(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let address = validate_address(address)?;
        let query = with_country_qualifier(&address);
        tracing::debug!(%query, endpoint = %self.endpoint, "geocoding address");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
                ("countrycodes", COUNTRY_CODE),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Lookup(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeError::Lookup(format!("search service returned {status}")));
        }

        let hits: Vec<SearchHit> = resp
            .json()
            .await
            .map_err(|e| GeocodeError::Lookup(format!("unexpected response body: {e}")))?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let latitude = hit
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::Lookup(format!("invalid latitude '{}'", hit.lat)))?;
        let longitude = hit
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::Lookup(format!("invalid longitude '{}'", hit.lon)))?;

        Ok(Some(GeocodeResult {
            latitude,
            longitude,
            display_name: hit.display_name,
        }))
    }

    /// Like [`resolve`](Self::resolve), but answers from the static city table
    /// when the service fails or finds nothing. Validation errors still surface.
    pub async fn resolve_or_fallback(
        &self,
        address: &str,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        match self.resolve(address).await {
            Ok(Some(hit)) => Ok(Some(hit)),
            Ok(None) => Ok(fallback_for(address)),
            Err(GeocodeError::Lookup(reason)) => {
                tracing::warn!(%reason, "geocoding failed; trying city fallback");
                match fallback_for(address) {
                    Some(hit) => Ok(Some(hit)),
                    None => Err(GeocodeError::Lookup(reason)),
                }
            }
            Err(e) => Err(e),
        }
    }
}
