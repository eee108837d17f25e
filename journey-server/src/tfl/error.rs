//! TfL client error types.

use super::convert::ConvertError;

/// Errors from the TfL HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum TflError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response parsed but a required field was missing or malformed
    #[error("unexpected response: {0}")]
    Convert(#[from] ConvertError),

    /// TfL found no journey for the given inputs (HTTP 404)
    #[error("{message}")]
    NotFound { message: String },

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The configured base URL cannot carry path segments
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl TflError {
    /// Whether the failure was the client giving up waiting.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TflError::Http(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TflError::Api {
            status: 400,
            message: "The following modes are not valid: hovercraft".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error 400: The following modes are not valid: hovercraft"
        );

        let err = TflError::NotFound {
            message: "No journey found for your inputs.".into(),
        };
        assert_eq!(err.to_string(), "No journey found for your inputs.");

        let err = TflError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value (body: <html>)");

        let err = TflError::Json {
            message: "expected value".into(),
            body: None,
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");
    }

    #[test]
    fn convert_errors_wrap() {
        let err: TflError = ConvertError::MissingField {
            entity: "journey",
            index: 2,
            field: "duration",
        }
        .into();
        assert!(err.to_string().contains("journey 2"));
        assert!(!err.is_timeout());
    }
}
