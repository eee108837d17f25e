//! Geocoding error types.

/// Errors that can occur when talking to Nominatim.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Nominatim asked us to slow down (HTTP 429)
    #[error("geocoding rate limit exceeded")]
    RateLimited,

    /// API returned an error status
    #[error("API error {status}")]
    Api { status: u16 },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
