//! Conversion from TfL DTOs to domain types.
//!
//! Fields the planner cannot do without (durations, timestamps, leg modes)
//! produce a `ConvertError` when absent. Presentation-only fields stay
//! optional and are rendered explicitly by the formatter.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Europe::London;
use chrono_tz::Tz;

use crate::domain::{Coordinates, JourneyOption, Leg, Obstacle, Place, PlaceKind};

use super::types::{JourneyDto, LegDto, PlaceDto, StopPointMatchDto};

/// A TfL response that parsed as JSON but broke the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("{entity} {index} is missing required field `{field}`")]
    MissingField {
        entity: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{entity} {index} has invalid `{field}`: {value}")]
    InvalidField {
        entity: &'static str,
        index: usize,
        field: &'static str,
        value: String,
    },
}

/// Convert a journey response, keeping TfL's order.
pub fn convert_journeys(journeys: Vec<JourneyDto>) -> Result<Vec<JourneyOption>, ConvertError> {
    journeys
        .into_iter()
        .enumerate()
        .map(|(i, j)| convert_journey(j, i))
        .collect()
}

fn convert_journey(dto: JourneyDto, index: usize) -> Result<JourneyOption, ConvertError> {
    let missing = |field| ConvertError::MissingField {
        entity: "journey",
        index,
        field,
    };

    let duration = dto.duration.ok_or_else(|| missing("duration"))?;
    let duration_mins = minutes(duration, "journey", index, "duration")?;

    let start_raw = dto.start_date_time.ok_or_else(|| missing("startDateTime"))?;
    let start = parse_tfl_datetime(&start_raw).ok_or_else(|| ConvertError::InvalidField {
        entity: "journey",
        index,
        field: "startDateTime",
        value: start_raw.clone(),
    })?;

    let arrival_raw = dto
        .arrival_date_time
        .ok_or_else(|| missing("arrivalDateTime"))?;
    let arrival = parse_tfl_datetime(&arrival_raw).ok_or_else(|| ConvertError::InvalidField {
        entity: "journey",
        index,
        field: "arrivalDateTime",
        value: arrival_raw.clone(),
    })?;

    let legs = dto
        .legs
        .ok_or_else(|| missing("legs"))?
        .into_iter()
        .enumerate()
        .map(|(i, l)| convert_leg(l, i))
        .collect::<Result<Vec<_>, _>>()?;

    // Free journeys report 0; negative totals are treated as unpriced.
    let fare_pence = dto
        .fare
        .and_then(|f| f.total_cost)
        .and_then(|c| u32::try_from(c).ok());

    Ok(JourneyOption {
        duration_mins,
        start,
        arrival,
        fare_pence,
        legs,
    })
}

fn convert_leg(dto: LegDto, index: usize) -> Result<Leg, ConvertError> {
    let duration = dto.duration.ok_or(ConvertError::MissingField {
        entity: "leg",
        index,
        field: "duration",
    })?;
    let duration_mins = minutes(duration, "leg", index, "duration")?;

    let mode = dto.mode.ok_or(ConvertError::MissingField {
        entity: "leg",
        index,
        field: "mode",
    })?;
    let mode_id = mode.id.filter(|s| !s.is_empty()).ok_or(ConvertError::MissingField {
        entity: "leg",
        index,
        field: "mode.id",
    })?;
    let mode_name = mode.name.unwrap_or_else(|| mode_id.clone());

    let instruction = dto
        .instruction
        .and_then(|i| i.summary.or(i.detailed))
        .unwrap_or_default();

    let obstacles = dto
        .obstacles
        .unwrap_or_default()
        .into_iter()
        .filter_map(|o| o.kind)
        .map(|k| Obstacle::from_tfl(&k))
        .collect();

    Ok(Leg {
        mode: mode_id,
        mode_name,
        instruction,
        duration_mins,
        departure_point: dto.departure_point.and_then(|p| p.common_name),
        arrival_point: dto.arrival_point.and_then(|p| p.common_name),
        obstacles,
    })
}

fn minutes(
    value: i64,
    entity: &'static str,
    index: usize,
    field: &'static str,
) -> Result<u32, ConvertError> {
    u32::try_from(value).map_err(|_| ConvertError::InvalidField {
        entity,
        index,
        field,
        value: value.to_string(),
    })
}

/// Parse a TfL timestamp into London time.
///
/// TfL normally sends local London time without an offset. Timestamps that
/// do carry an offset (or `Z`) are converted. Returns `None` for anything
/// else, including local times skipped by a DST change.
pub fn parse_tfl_datetime(s: &str) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&London));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()?;
    naive.and_local_timezone(London).earliest()
}

/// Convert a `/Place/Search` entry. Entries without a name are dropped.
pub fn convert_place(dto: PlaceDto) -> Option<Place> {
    let name = dto.name.filter(|n| !n.is_empty())?;
    let display = match dto.place_type.as_deref() {
        Some(t) if !t.is_empty() => format!("{name} ({t})"),
        _ => name.clone(),
    };
    let place = match coordinates(dto.lat, dto.lon) {
        Some(c) => Place::at(name, c, PlaceKind::Place),
        None => {
            let id = dto.id.filter(|s| !s.is_empty()).unwrap_or_else(|| name.clone());
            Place::token(name, id, PlaceKind::Place)
        }
    };
    Some(place.with_display(display))
}

/// Convert a `/StopPoint/Search` match. Matches without a name are dropped.
///
/// Stop points are identified by their NaPTAN id when TfL gives one, since
/// that is what the journey planner resolves most reliably.
pub fn convert_stop_point(dto: StopPointMatchDto) -> Option<Place> {
    let name = dto.name.filter(|n| !n.is_empty())?;
    let modes = dto.modes.unwrap_or_default().join(", ");
    let display = if modes.is_empty() {
        name.clone()
    } else {
        format!("{name} [{modes}]")
    };
    let place = match (dto.id.filter(|s| !s.is_empty()), coordinates(dto.lat, dto.lon)) {
        (Some(id), _) => Place::token(name, id, PlaceKind::Stop),
        (None, Some(c)) => Place::at(name, c, PlaceKind::Stop),
        (None, None) => {
            let id = name.clone();
            Place::token(name, id, PlaceKind::Stop)
        }
    };
    Some(place.with_display(display))
}

/// TfL uses 0/0 for "unknown location".
fn coordinates(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinates> {
    match (lat, lon) {
        (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some(Coordinates { lat, lon }),
        _ => None,
    }
}
