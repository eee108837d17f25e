//! Resolved journey endpoints.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// UK postcode shape, e.g. "NW1 2JH" or "EC2M7PP".
static POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]?\s?[0-9][A-Z]{2}$").expect("postcode pattern is valid")
});

/// Whether `text` looks like a UK postcode.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Examples
///
/// ```
/// use journey_server::domain::is_postcode;
///
/// assert!(is_postcode("NW1 2JH"));
/// assert!(is_postcode(" ec2m7pp "));
/// assert!(!is_postcode("Euston"));
/// ```
pub fn is_postcode(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && POSTCODE.is_match(&text.to_uppercase())
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// How TfL should identify a journey endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaceId {
    /// Opaque token understood by TfL (a NaPTAN id or a place name).
    Token { value: String },
    /// Latitude/longitude pair.
    Coordinates(Coordinates),
    /// Uppercased UK postcode.
    Postcode { value: String },
}

impl PlaceId {
    /// The string placed in the journey URL path for this endpoint.
    pub fn path_token(&self) -> String {
        match self {
            PlaceId::Token { value } => value.clone(),
            PlaceId::Coordinates(c) => c.to_string(),
            PlaceId::Postcode { value } => value.clone(),
        }
    }
}

/// Where a place suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Postcode,
    Place,
    Stop,
    Address,
}

impl PlaceKind {
    /// Form value, matching the serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Postcode => "postcode",
            PlaceKind::Place => "place",
            PlaceKind::Stop => "stop",
            PlaceKind::Address => "address",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaceKind::Postcode => "Postcode",
            PlaceKind::Place => "Place",
            PlaceKind::Stop => "Stop",
            PlaceKind::Address => "Address",
        }
    }
}

/// A resolved, uniquely identified location usable as a journey endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Short name, e.g. "King's Cross St. Pancras".
    pub name: String,
    /// Text shown in suggestion lists, e.g. "King's Cross St. Pancras [tube]".
    pub display_name: String,
    pub identifier: PlaceId,
    pub kind: PlaceKind,
}

impl Place {
    /// A place identified by a TfL token.
    pub fn token(name: impl Into<String>, id: impl Into<String>, kind: PlaceKind) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            identifier: PlaceId::Token { value: id.into() },
            kind,
        }
    }

    /// A place identified by its coordinates.
    pub fn at(name: impl Into<String>, coords: Coordinates, kind: PlaceKind) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            identifier: PlaceId::Coordinates(coords),
            kind,
        }
    }

    /// A place identified by postcode. The postcode is normalised to uppercase.
    pub fn postcode(text: &str) -> Self {
        let value = text.trim().to_uppercase();
        Self {
            name: value.clone(),
            display_name: value.clone(),
            identifier: PlaceId::Postcode { value },
            kind: PlaceKind::Postcode,
        }
    }

    /// Replace the display text.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display_name = display.into();
        self
    }

    /// Two places denote the same endpoint when TfL would see the same token.
    pub fn same_endpoint(&self, other: &Place) -> bool {
        self.identifier.path_token() == other.identifier.path_token()
    }
}
