//! Process configuration from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `NEXIUM_BIND_ADDR` | `0.0.0.0:8080` |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when `USE_PERSISTENT_STORES=true` |
//! | `NEXIUM_AUDIT_LOG_DIR` | unset: audit log kept in memory |
//! | `NEXIUM_GEOCODER_URL` | Nominatim search endpoint |
//! | `NEXIUM_GEOCODER_USER_AGENT` | `Nexium/0.1 (gestao de obras)` |
//! | `NEXIUM_GEOCODER_TIMEOUT_SECS` | `10` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use nexium_geocoding::GeocoderConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Where entity records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    /// Directory for the audit log file; `None` keeps it in memory.
    pub audit_log_dir: Option<PathBuf>,
    pub geocoder: GeocoderConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("NEXIUM_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "NEXIUM_BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let use_persistent = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => v.parse::<bool>().map_err(|e| ConfigError::Invalid {
                var: "USE_PERSISTENT_STORES",
                value: v.clone(),
                reason: e.to_string(),
            })?,
        };
        let store = if use_persistent {
            StoreConfig::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            }
        } else {
            StoreConfig::InMemory
        };

        let mut geocoder = GeocoderConfig::default();
        if let Some(url) = get("NEXIUM_GEOCODER_URL") {
            geocoder.endpoint = url;
        }
        if let Some(agent) = get("NEXIUM_GEOCODER_USER_AGENT") {
            geocoder.user_agent = agent;
        }
        if let Some(secs) = get("NEXIUM_GEOCODER_TIMEOUT_SECS") {
            let parsed = secs.parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "NEXIUM_GEOCODER_TIMEOUT_SECS",
                value: secs.clone(),
                reason: e.to_string(),
            })?;
            geocoder.timeout = Duration::from_secs(parsed);
        }

        Ok(Self {
            bind_addr,
            store,
            audit_log_dir: get("NEXIUM_AUDIT_LOG_DIR").map(PathBuf::from),
            geocoder,
        })
    }
}
