//! Nominatim search client.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Coordinates, Place, PlaceKind};

use super::Geocoder;
use super::error::GeocodeError;

/// Default base URL for Nominatim.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying User-Agent.
const USER_AGENT: &str = "London-Journey-Planner";

/// Appended to every query so results stay in London.
const REGION_SUFFIX: &str = ", London, UK";

/// Longest display name kept from a result.
const MAX_DISPLAY_CHARS: usize = 100;

/// Raw Nominatim search result. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// Configuration for the Nominatim client.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NominatimConfig {
    /// Create a config pointing at the public Nominatim instance.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for Nominatim's `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Create a new Nominatim client.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Geocoder for NominatimClient {
    async fn geocode(&self, address: &str) -> Result<Option<Place>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/search", self.base_url);
        debug!(%address, "Geocoding address");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", format!("{address}{REGION_SUFFIX}")),
                ("format", "json".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let results: Vec<NominatimResult> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        Ok(results.into_iter().next().and_then(|r| to_place(address, r)))
    }
}

fn to_place(address: &str, result: NominatimResult) -> Option<Place> {
    let lat: f64 = result.lat.parse().ok()?;
    let lon: f64 = result.lon.parse().ok()?;
    let display: String = result
        .display_name
        .as_deref()
        .unwrap_or(address)
        .chars()
        .take(MAX_DISPLAY_CHARS)
        .collect();
    Some(Place::at(address, Coordinates { lat, lon }, PlaceKind::Address).with_display(display))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlaceId;

    #[test]
    fn config_defaults() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn result_to_place() {
        let json = r#"[{"lat": "51.5033", "lon": "-0.1196", "display_name": "London Eye, Westminster"}]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(json).unwrap();
        let place = to_place("London Eye", results.into_iter().next().unwrap()).unwrap();

        assert_eq!(place.name, "London Eye");
        assert_eq!(place.display_name, "London Eye, Westminster");
        assert_eq!(place.kind, PlaceKind::Address);
        assert_eq!(
            place.identifier,
            PlaceId::Coordinates(Coordinates {
                lat: 51.5033,
                lon: -0.1196
            })
        );
    }

    #[test]
    fn long_display_names_are_truncated() {
        let result = NominatimResult {
            lat: "51.5".into(),
            lon: "-0.1".into(),
            display_name: Some("x".repeat(300)),
        };
        let place = to_place("somewhere", result).unwrap();
        assert_eq!(place.display_name.chars().count(), MAX_DISPLAY_CHARS);
    }

    #[test]
    fn unparseable_coordinates_are_dropped() {
        let result = NominatimResult {
            lat: "north".into(),
            lon: "-0.1".into(),
            display_name: None,
        };
        assert!(to_place("somewhere", result).is_none());
    }
}
