//! TfL Unified API response DTOs.
//!
//! These types map directly to the TfL JSON responses. Everything is
//! `Option` because TfL omits fields freely; `convert` decides which of them
//! are actually required. TfL's `$type` discriminators are ignored.

use serde::Deserialize;

/// An entry from `GET /Place/Search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub id: Option<String>,
    pub name: Option<String>,
    /// e.g. "StopPoint", "OnStreetCarPark", "BikePoint".
    pub place_type: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Response from `GET /StopPoint/Search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPointSearchDto {
    pub matches: Option<Vec<StopPointMatchDto>>,
}

/// A single stop point match.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPointMatchDto {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Mode ids served, e.g. `["tube", "national-rail"]`.
    pub modes: Option<Vec<String>>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Response from `GET /Journey/JourneyResults/{from}/to/{to}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResultsDto {
    pub journeys: Option<Vec<JourneyDto>>,
}

/// One itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyDto {
    /// Local London time, usually without an offset ("2024-03-15T10:00:00").
    pub start_date_time: Option<String>,
    pub arrival_date_time: Option<String>,
    /// Minutes.
    pub duration: Option<i64>,
    pub legs: Option<Vec<LegDto>>,
    pub fare: Option<FareDto>,
}

/// Fare summary for an itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareDto {
    /// Pence.
    pub total_cost: Option<i64>,
}

/// One leg of an itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegDto {
    /// Minutes.
    pub duration: Option<i64>,
    pub instruction: Option<InstructionDto>,
    pub departure_point: Option<PointDto>,
    pub arrival_point: Option<PointDto>,
    pub mode: Option<ModeDto>,
    pub obstacles: Option<Vec<ObstacleDto>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionDto {
    pub summary: Option<String>,
    pub detailed: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDto {
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDto {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleDto {
    /// "STAIRS", "ESCALATOR", "LIFT", "WALKWAY".
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Error body TfL sends with non-success responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDto {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journey_response_ignores_type_tags() {
        let json = r#"{
            "$type": "Tfl.Api.Presentation.Entities.JourneyPlanner.ItineraryResult",
            "journeys": [{
                "$type": "Tfl.Api.Presentation.Entities.JourneyPlanner.Journey",
                "startDateTime": "2024-03-15T10:00:00",
                "duration": 12,
                "arrivalDateTime": "2024-03-15T10:12:00",
                "legs": [{
                    "duration": 12,
                    "instruction": {"summary": "Victoria line to Oxford Circus"},
                    "obstacles": [{"type": "STAIRS", "position": "IDEST"}],
                    "mode": {"id": "tube", "name": "tube"}
                }]
            }]
        }"#;
        let parsed: JourneyResultsDto = serde_json::from_str(json).unwrap();
        let journeys = parsed.journeys.unwrap();
        assert_eq!(journeys.len(), 1);
        let legs = journeys[0].legs.as_ref().unwrap();
        assert_eq!(legs[0].obstacles.as_ref().unwrap()[0].kind.as_deref(), Some("STAIRS"));
        assert!(journeys[0].fare.is_none());
    }

    #[test]
    fn stop_point_search_without_matches() {
        let json = r#"{"query": "zzz", "total": 0}"#;
        let parsed: StopPointSearchDto = serde_json::from_str(json).unwrap();
        assert!(parsed.matches.is_none());
    }
}
