//! TfL Unified API HTTP client.
//!
//! Provides async methods for place autocomplete and journey planning.
//! Every call carries the `app_key` credential as a query parameter.
//! There is no retry: a failure is reported once, as it happened.

use std::time::Duration;

use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{JourneyOption, Place};
use crate::query::JourneyQuery;

use super::TransitApi;
use super::convert::{convert_journeys, convert_place, convert_stop_point};
use super::error::TflError;
use super::types::{ApiErrorDto, JourneyResultsDto, PlaceDto, StopPointSearchDto};

/// Default base URL for the TfL Unified API.
const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How many autocomplete candidates to ask for per endpoint.
const DEFAULT_MAX_RESULTS: u8 = 10;

/// Message used when TfL answers 404 without a readable body.
const NO_JOURNEY_MESSAGE: &str = "No journey found for your inputs.";
const AMBIGUOUS_MESSAGE: &str =
    "No journey found: a location matched several places. Please pick one of the suggestions.";

/// How much of an unparseable body to keep for diagnostics.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the TfL client.
#[derive(Debug, Clone)]
pub struct TflConfig {
    /// Application key sent as `app_key`
    pub app_key: String,
    /// Base URL for the API (defaults to production TfL)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// `maxResults` for autocomplete searches
    pub max_results: u8,
}

impl TflConfig {
    /// Create a new config with the given application key.
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_results: DEFAULT_MAX_RESULTS,
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

    /// Set the number of autocomplete candidates per endpoint.
    pub fn with_max_results(mut self, n: u8) -> Self {
        self.max_results = n;
        self
    }
}

/// TfL Unified API client.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    base_url: String,
    app_key: String,
    max_results: u8,
}

impl TflClient {
    /// Create a new TfL client with the given configuration.
    pub fn new(config: TflConfig) -> Result<Self, TflError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_key: config.app_key,
            max_results: config.max_results,
        })
    }

    /// Issue a GET and return the response only if it succeeded.
    ///
    /// Non-success statuses become `TflError::Api` carrying TfL's own
    /// message, or `TflError::NotFound` for 404. A 300 is TfL's
    /// disambiguation listing and is reported as `NotFound` without its body.
    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<Response, TflError> {
        let url_path = url.path().to_string();
        debug!(path = %url_path, "TfL request");

        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("app_key", self.app_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::MULTIPLE_CHOICES {
            debug!(path = %url_path, "TfL returned disambiguation");
            return Err(TflError::NotFound {
                message: AMBIGUOUS_MESSAGE.to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        if status == StatusCode::NOT_FOUND {
            return Err(TflError::NotFound {
                message: message.unwrap_or_else(|| NO_JOURNEY_MESSAGE.to_string()),
            });
        }
        Err(TflError::Api {
            status: status.as_u16(),
            message: message.unwrap_or(body),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TflError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| TflError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Autocomplete against `/Place/Search`.
    ///
    /// A 404 means "no candidates" and yields an empty list.
    pub async fn search_places(&self, query: &str) -> Result<Vec<Place>, TflError> {
        let url = self.endpoint("/Place/Search")?;
        let params = [
            ("query", query.to_string()),
            ("maxResults", self.max_results.to_string()),
        ];
        let dtos: Vec<PlaceDto> = match self.get(url, &params).await {
            Ok(response) => parse_json(response).await?,
            Err(TflError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(dtos.into_iter().filter_map(convert_place).collect())
    }

    /// Autocomplete against `/StopPoint/Search`.
    ///
    /// A 404 means "no candidates" and yields an empty list.
    pub async fn search_stop_points(&self, query: &str) -> Result<Vec<Place>, TflError> {
        let url = self.endpoint("/StopPoint/Search")?;
        let params = [
            ("query", query.to_string()),
            ("maxResults", self.max_results.to_string()),
        ];
        let dto: StopPointSearchDto = match self.get(url, &params).await {
            Ok(response) => parse_json(response).await?,
            Err(TflError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(dto
            .matches
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_stop_point)
            .collect())
    }

    /// Plan journeys for a query, in TfL's ranking order.
    pub async fn journey_results(
        &self,
        query: &JourneyQuery,
    ) -> Result<Vec<JourneyOption>, TflError> {
        let mut url = self.endpoint("/Journey/JourneyResults")?;
        url.path_segments_mut()
            .map_err(|_| TflError::InvalidUrl(self.base_url.clone()))?
            .push(&query.from)
            .push("to")
            .push(&query.to);

        let response = self.get(url, &query.params).await?;
        let dto: JourneyResultsDto = parse_json(response).await?;
        Ok(convert_journeys(dto.journeys.unwrap_or_default())?)
    }
}

impl TransitApi for TflClient {
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, TflError> {
        TflClient::search_places(self, query).await
    }

    async fn search_stop_points(&self, query: &str) -> Result<Vec<Place>, TflError> {
        TflClient::search_stop_points(self, query).await
    }

    async fn journey_results(&self, query: &JourneyQuery) -> Result<Vec<JourneyOption>, TflError> {
        TflClient::journey_results(self, query).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, TflError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| TflError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
    })
}

/// TfL's `message` field from an error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorDto>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
}
