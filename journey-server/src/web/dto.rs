//! Data transfer objects for web requests and responses.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccessibilityPreference, Coordinates, Mode, Place, PlaceKind, UnknownTag, is_postcode,
};
use crate::format::FormattedResults;
use crate::plan::{Field, FieldError, PlanForm};
use crate::query::{Preferences, TimeIs};

/// Request to search for places.
#[derive(Debug, Deserialize)]
pub struct PlaceSearchRequest {
    /// Partial text typed by the user
    #[serde(default)]
    pub q: String,
}

/// Response from place search.
#[derive(Debug, Serialize)]
pub struct PlaceSearchResponse {
    pub places: Vec<PlaceResult>,
}

/// A place suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceResult {
    /// Short name, used as the form text
    pub name: String,

    /// Longer text for the suggestion list
    pub display_name: String,

    /// Where the suggestion came from
    pub kind: PlaceKind,

    /// Token to submit back as `origin_id` / `destination_id`
    pub id: String,
}

impl PlaceResult {
    pub fn from_place(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            display_name: place.display_name.clone(),
            kind: place.kind,
            id: place.identifier.path_token(),
        }
    }
}

/// Journey planner response for programmatic clients.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanJourneyResponse {
    Found {
        results: FormattedResults,
        notices: Vec<&'static str>,
    },
    NoJourneys {
        relaxed: bool,
        message: String,
    },
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Per-field input problems
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// The journey form could not be read.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid time: {0} (expected HH:MM)")]
    InvalidTime(String),

    #[error("{date} {time} does not exist in London (clocks go forward)")]
    SkippedTime { date: String, time: String },

    #[error("invalid choice for {field}: {value}")]
    InvalidChoice { field: &'static str, value: String },

    #[error(transparent)]
    Unknown(#[from] UnknownTag),
}

/// The journey form as submitted.
///
/// Built from raw query pairs because `mode` and `accessibility` repeat,
/// once per ticked checkbox.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanJourneyRequest {
    pub origin: String,
    pub origin_id: Option<String>,
    pub origin_kind: Option<String>,
    /// The text the suggestion filled in when it was picked
    pub origin_name: Option<String>,
    pub destination: String,
    pub destination_id: Option<String>,
    pub destination_kind: Option<String>,
    pub destination_name: Option<String>,
    /// `now`, `depart` or `arrive`
    pub when: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub modes: Vec<String>,
    pub accessibility: Vec<String>,
}

impl PlanJourneyRequest {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut req = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "origin" => req.origin = value,
                "origin_id" => req.origin_id = non_blank(value),
                "origin_kind" => req.origin_kind = non_blank(value),
                "origin_name" => req.origin_name = non_blank(value),
                "destination" => req.destination = value,
                "destination_id" => req.destination_id = non_blank(value),
                "destination_kind" => req.destination_kind = non_blank(value),
                "destination_name" => req.destination_name = non_blank(value),
                "when" => req.when = non_blank(value),
                "date" => req.date = non_blank(value),
                "time" => req.time = non_blank(value),
                "mode" => req.modes.push(value),
                "accessibility" => req.accessibility.push(value),
                _ => {}
            }
        }
        req
    }

    /// Query pairs as the form submits them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("origin", self.origin.clone())];
        let optional = [
            ("origin_id", &self.origin_id),
            ("origin_kind", &self.origin_kind),
            ("origin_name", &self.origin_name),
        ];
        pairs.extend(optional.into_iter().filter_map(|(k, v)| Some((k, v.clone()?))));
        pairs.push(("destination", self.destination.clone()));
        let optional = [
            ("destination_id", &self.destination_id),
            ("destination_kind", &self.destination_kind),
            ("destination_name", &self.destination_name),
            ("when", &self.when),
            ("date", &self.date),
            ("time", &self.time),
        ];
        pairs.extend(optional.into_iter().filter_map(|(k, v)| Some((k, v.clone()?))));
        pairs.extend(self.modes.iter().map(|m| ("mode", m.clone())));
        pairs.extend(self.accessibility.iter().map(|a| ("accessibility", a.clone())));
        pairs
    }

    /// The same submission with `place` picked for `field`.
    pub fn with_selection(&self, field: Field, place: &PlaceResult) -> Self {
        let mut req = self.clone();
        let (text, id, kind, name) = match field {
            Field::Origin => (
                &mut req.origin,
                &mut req.origin_id,
                &mut req.origin_kind,
                &mut req.origin_name,
            ),
            Field::Destination => (
                &mut req.destination,
                &mut req.destination_id,
                &mut req.destination_kind,
                &mut req.destination_name,
            ),
        };
        *text = place.name.clone();
        *id = Some(place.id.clone());
        *kind = Some(place.kind.as_str().to_string());
        *name = Some(place.name.clone());
        req
    }

    /// The suggestion picked for `field`, unless its text was edited since.
    ///
    /// Without a recorded name the id is trusted as is.
    pub fn selection(&self, field: Field) -> Option<Selection<'_>> {
        let (text, id, kind, name) = match field {
            Field::Origin => (
                &self.origin,
                &self.origin_id,
                &self.origin_kind,
                &self.origin_name,
            ),
            Field::Destination => (
                &self.destination,
                &self.destination_id,
                &self.destination_kind,
                &self.destination_name,
            ),
        };
        let id = id.as_deref()?.trim();
        if name.as_deref().is_some_and(|n| n.trim() != text.trim()) {
            return None;
        }
        Some(Selection {
            text: text.trim(),
            id,
            kind: kind.as_deref(),
        })
    }

    /// Convert to a planner form. `now` fills in a missing date or time.
    pub fn to_form(&self, now: DateTime<Tz>) -> Result<PlanForm, FormError> {
        let modes: BTreeSet<Mode> = self
            .modes
            .iter()
            .map(|m| m.parse())
            .collect::<Result<_, UnknownTag>>()?;
        let accessibility: BTreeSet<AccessibilityPreference> = self
            .accessibility
            .iter()
            .map(|a| a.parse())
            .collect::<Result<_, UnknownTag>>()?;

        let time_is = match self.when.as_deref().unwrap_or("now") {
            "now" => None,
            "depart" => Some(TimeIs::Departing),
            "arrive" => Some(TimeIs::Arriving),
            other => {
                return Err(FormError::InvalidChoice {
                    field: "when",
                    value: other.to_string(),
                });
            }
        };
        let time = match time_is {
            Some(_) => Some(self.requested_time(now)?),
            None => None,
        };

        Ok(PlanForm {
            origin_text: self.origin.trim().to_string(),
            origin: self.selection(Field::Origin).map(Selection::place),
            destination_text: self.destination.trim().to_string(),
            destination: self.selection(Field::Destination).map(Selection::place),
            prefs: Preferences {
                time,
                time_is: time_is.unwrap_or_default(),
                modes,
                accessibility,
            },
        })
    }

    fn requested_time(&self, now: DateTime<Tz>) -> Result<DateTime<Tz>, FormError> {
        let date = match self.date.as_deref() {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| FormError::InvalidDate(raw.to_string()))?,
            None => now.date_naive(),
        };
        let time = match self.time.as_deref() {
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .map_err(|_| FormError::InvalidTime(raw.to_string()))?,
            None => now.time().with_second(0).unwrap_or(now.time()),
        };
        date.and_time(time)
            .and_local_timezone(now.timezone())
            .earliest()
            .ok_or_else(|| FormError::SkippedTime {
                date: date.to_string(),
                time: time.format("%H:%M").to_string(),
            })
    }
}

fn non_blank(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

/// A suggestion carried by the form's hidden inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub text: &'a str,
    pub id: &'a str,
    pub kind: Option<&'a str>,
}

impl Selection<'_> {
    /// Rebuild the place the user picked.
    pub fn place(self) -> Place {
        let name = if self.text.is_empty() { self.id } else { self.text };
        let kind = match self.kind {
            Some("postcode") => PlaceKind::Postcode,
            Some("stop") => PlaceKind::Stop,
            Some("address") => PlaceKind::Address,
            _ => PlaceKind::Place,
        };

        if kind == PlaceKind::Postcode && is_postcode(self.id) {
            return Place::postcode(self.id);
        }
        match parse_coordinates(self.id) {
            Some(coords) => Place::at(name, coords, kind),
            None => Place::token(name, self.id, kind),
        }
    }
}

/// "lat,lon" as produced for coordinate places.
fn parse_coordinates(s: &str) -> Option<Coordinates> {
    let (lat, lon) = s.split_once(',')?;
    Some(Coordinates {
        lat: lat.trim().parse().ok()?,
        lon: lon.trim().parse().ok()?,
    })
}
