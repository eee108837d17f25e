//! Journey query construction.
//!
//! Turns two resolved places and the user's preferences into a single
//! outbound `JourneyResults` query. Only the endpoints are validated here;
//! everything else (mode combinations, time ranges) is left to TfL.

use std::collections::BTreeSet;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::domain::{AccessibilityPreference, Mode, Place};

/// Whether the requested time is a departure or arrival time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeIs {
    #[default]
    Departing,
    Arriving,
}

impl TimeIs {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeIs::Departing => "departing",
            TimeIs::Arriving => "arriving",
        }
    }
}

/// Why a journey request could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("please choose where you are travelling from")]
    MissingOrigin,

    #[error("please choose where you are travelling to")]
    MissingDestination,

    #[error("origin and destination are the same place")]
    SameEndpoints,
}

/// Everything the user chose besides the endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    /// `None` means "leave now".
    pub time: Option<DateTime<Tz>>,
    pub time_is: TimeIs,
    pub modes: BTreeSet<Mode>,
    pub accessibility: BTreeSet<AccessibilityPreference>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            time: None,
            time_is: TimeIs::Departing,
            modes: Mode::DEFAULT.into_iter().collect(),
            accessibility: BTreeSet::new(),
        }
    }
}

/// A validated journey request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyRequest {
    origin: Place,
    destination: Place,
    prefs: Preferences,
}

impl JourneyRequest {
    /// Build a request, checking the endpoints are present and distinct.
    pub fn new(
        origin: Option<Place>,
        destination: Option<Place>,
        prefs: Preferences,
    ) -> Result<Self, QueryError> {
        let origin = origin.ok_or(QueryError::MissingOrigin)?;
        let destination = destination.ok_or(QueryError::MissingDestination)?;
        if origin.same_endpoint(&destination) {
            return Err(QueryError::SameEndpoints);
        }
        Ok(Self {
            origin,
            destination,
            prefs,
        })
    }

    pub fn origin(&self) -> &Place {
        &self.origin
    }

    pub fn destination(&self) -> &Place {
        &self.destination
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Whether the user asked for an accessible route.
    pub fn accessible(&self) -> bool {
        self.prefs
            .accessibility
            .iter()
            .any(AccessibilityPreference::is_requirement)
    }

    /// The outbound query for this request.
    pub fn to_query(&self) -> JourneyQuery {
        let modes: Vec<Mode> = if self.prefs.modes.is_empty() {
            Mode::FALLBACK.to_vec()
        } else {
            self.prefs.modes.iter().copied().collect()
        };
        let mut params = vec![("mode", join(modes.iter().map(Mode::as_str)))];

        if let Some(time) = self.prefs.time {
            params.push(("timeIs", self.prefs.time_is.as_str().to_string()));
            params.push(("date", time.format("%Y%m%d").to_string()));
            params.push(("time", time.format("%H%M").to_string()));
            params.push(("calcOneDirection", "true".to_string()));
        }

        if !self.prefs.accessibility.is_empty() {
            params.push((
                "accessibilityPreference",
                join(self.prefs.accessibility.iter().map(|p| p.as_str())),
            ));
        }

        JourneyQuery {
            from: self.origin.identifier.path_token(),
            to: self.destination.identifier.path_token(),
            params,
        }
    }
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(",")
}

/// An outbound `GET /Journey/JourneyResults/{from}/to/{to}` query.
///
/// Path tokens are unencoded here; the client encodes each as one segment.
/// The credential is added by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyQuery {
    pub from: String,
    pub to: String,
    pub params: Vec<(&'static str, String)>,
}

impl JourneyQuery {
    /// Look up a parameter value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_accessibility(&self) -> bool {
        self.param("accessibilityPreference").is_some()
    }

    /// The same query without accessibility filters.
    pub fn without_accessibility(&self) -> JourneyQuery {
        JourneyQuery {
            from: self.from.clone(),
            to: self.to.clone(),
            params: self
                .params
                .iter()
                .filter(|(k, _)| *k != "accessibilityPreference")
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, PlaceKind};
    use chrono::TimeZone;
    use chrono_tz::Europe::London;

    fn euston() -> Place {
        Place::token("Euston", "940GZZLUEUS", PlaceKind::Stop)
    }

    fn brixton() -> Place {
        Place::token("Brixton", "940GZZLUBXN", PlaceKind::Stop)
    }

    #[test]
    fn rejects_missing_endpoints() {
        assert_eq!(
            JourneyRequest::new(None, Some(brixton()), Preferences::default()),
            Err(QueryError::MissingOrigin)
        );
        assert_eq!(
            JourneyRequest::new(Some(euston()), None, Preferences::default()),
            Err(QueryError::MissingDestination)
        );
    }

    #[test]
    fn rejects_same_endpoint() {
        let other_name = Place::token("Euston Station", "940GZZLUEUS", PlaceKind::Place);
        assert_eq!(
            JourneyRequest::new(Some(euston()), Some(other_name), Preferences::default()),
            Err(QueryError::SameEndpoints)
        );
    }

    #[test]
    fn leave_now_query() {
        let req = JourneyRequest::new(Some(euston()), Some(brixton()), Preferences::default())
            .unwrap();
        let query = req.to_query();
        assert_eq!(query.from, "940GZZLUEUS");
        assert_eq!(query.to, "940GZZLUBXN");
        assert_eq!(query.param("mode"), Some("tube,bus,walking"));
        assert_eq!(query.param("timeIs"), None);
        assert_eq!(query.param("date"), None);
        assert!(!query.has_accessibility());
        assert!(!req.accessible());
    }

    #[test]
    fn empty_modes_fall_back() {
        let prefs = Preferences {
            modes: BTreeSet::new(),
            ..Preferences::default()
        };
        let req = JourneyRequest::new(Some(euston()), Some(brixton()), prefs).unwrap();
        assert_eq!(req.to_query().param("mode"), Some("tube,walking"));
    }

    #[test]
    fn arrive_by_query() {
        let prefs = Preferences {
            time: Some(London.with_ymd_and_hms(2024, 3, 15, 8, 5, 0).unwrap()),
            time_is: TimeIs::Arriving,
            ..Preferences::default()
        };
        let req = JourneyRequest::new(Some(euston()), Some(brixton()), prefs).unwrap();
        let query = req.to_query();
        assert_eq!(query.param("timeIs"), Some("arriving"));
        assert_eq!(query.param("date"), Some("20240315"));
        assert_eq!(query.param("time"), Some("0805"));
        assert_eq!(query.param("calcOneDirection"), Some("true"));
    }

    #[test]
    fn accessibility_preferences_joined() {
        let prefs = Preferences {
            accessibility: [
                AccessibilityPreference::StepFreeToPlatform,
                AccessibilityPreference::NoSolidStairs,
            ]
            .into_iter()
            .collect(),
            ..Preferences::default()
        };
        let req = JourneyRequest::new(Some(euston()), Some(brixton()), prefs).unwrap();
        assert!(req.accessible());

        let query = req.to_query();
        assert_eq!(
            query.param("accessibilityPreference"),
            Some("NoSolidStairs,StepFreeToPlatform")
        );

        let relaxed = query.without_accessibility();
        assert!(!relaxed.has_accessibility());
        assert_eq!(relaxed.param("mode"), query.param("mode"));
    }

    #[test]
    fn no_requirements_is_not_accessible() {
        let prefs = Preferences {
            accessibility: [AccessibilityPreference::NoRequirements]
                .into_iter()
                .collect(),
            ..Preferences::default()
        };
        let req = JourneyRequest::new(Some(euston()), Some(brixton()), prefs).unwrap();
        assert!(!req.accessible());
        assert!(req.to_query().has_accessibility());
    }

    #[test]
    fn coordinate_endpoints() {
        let home = Place::at(
            "10 Downing Street",
            Coordinates {
                lat: 51.5034,
                lon: -0.1276,
            },
            PlaceKind::Address,
        );
        let req = JourneyRequest::new(Some(home), Some(brixton()), Preferences::default()).unwrap();
        assert_eq!(req.to_query().from, "51.5034,-0.1276");
    }
}
