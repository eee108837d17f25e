//! Process configuration read from the environment.

use std::net::SocketAddr;

use tracing::warn;

use crate::geocode::NominatimConfig;
use crate::tfl::TflConfig;

const DEFAULT_TFL_BASE_URL: &str = "https://api.tfl.gov.uk";
const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_STATIC_DIR: &str = "static";

/// A variable was set to something unusable.
#[derive(Debug, thiserror::Error)]
#[error("invalid {name}: {value:?} ({reason})")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Empty when unset; TfL will then reject every call.
    pub tfl_app_key: String,
    pub tfl_base_url: String,
    pub nominatim_base_url: String,
    pub timeout_secs: u64,
    pub bind_addr: SocketAddr,
    pub static_dir: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let tfl_app_key = get("TFL_APP_KEY").unwrap_or_else(|| {
            warn!("TFL_APP_KEY not set. TfL API calls will fail.");
            String::new()
        });

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError {
                name: "REQUEST_TIMEOUT_SECS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            tfl_app_key,
            tfl_base_url: get("TFL_BASE_URL").unwrap_or_else(|| DEFAULT_TFL_BASE_URL.to_string()),
            nominatim_base_url: get("NOMINATIM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NOMINATIM_BASE_URL.to_string()),
            timeout_secs,
            bind_addr,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        })
    }

    pub fn tfl(&self) -> TflConfig {
        TflConfig::new(&self.tfl_app_key)
            .with_base_url(&self.tfl_base_url)
            .with_timeout(self.timeout_secs)
    }

    pub fn nominatim(&self) -> NominatimConfig {
        NominatimConfig::new()
            .with_base_url(&self.nominatim_base_url)
            .with_timeout(self.timeout_secs)
    }
}
