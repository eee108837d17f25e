//! Journey options returned by the planner.
//!
//! These are validated, typed forms of the TfL journey response. A
//! `JourneyOption` is one complete proposed route; its `Leg`s are
//! mode-homogeneous segments in travel order.

use chrono::DateTime;
use chrono_tz::Tz;

/// TfL mode id for walking legs.
pub const WALKING: &str = "walking";

/// An access obstacle TfL reports on a leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obstacle {
    Stairs,
    Escalator,
    Lift,
    Walkway,
    Other(String),
}

impl Obstacle {
    /// Parse a TfL obstacle `type`. Matching is case-insensitive.
    pub fn from_tfl(kind: &str) -> Self {
        match kind.to_ascii_uppercase().as_str() {
            "STAIRS" => Obstacle::Stairs,
            "ESCALATOR" => Obstacle::Escalator,
            "LIFT" | "ELEVATOR" => Obstacle::Lift,
            "WALKWAY" => Obstacle::Walkway,
            _ => Obstacle::Other(kind.to_string()),
        }
    }

    /// Whether the obstacle rules out step-free travel.
    pub fn blocks_step_free(&self) -> bool {
        matches!(self, Obstacle::Stairs | Obstacle::Escalator)
    }
}

/// One mode-homogeneous segment of a journey.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    /// TfL mode id, e.g. "tube".
    pub mode: String,
    /// TfL mode display name, e.g. "tube" or "national-rail".
    pub mode_name: String,
    /// Instruction summary; empty when TfL sends none.
    pub instruction: String,
    pub duration_mins: u32,
    pub departure_point: Option<String>,
    pub arrival_point: Option<String>,
    pub obstacles: Vec<Obstacle>,
}

impl Leg {
    pub fn is_walking(&self) -> bool {
        self.mode == WALKING
    }

    /// A leg is step-free when none of its obstacles needs stairs or escalators.
    pub fn is_step_free(&self) -> bool {
        !self.obstacles.iter().any(Obstacle::blocks_step_free)
    }
}

/// One complete proposed route between two places.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyOption {
    pub duration_mins: u32,
    pub start: DateTime<Tz>,
    pub arrival: DateTime<Tz>,
    /// Total adult fare in pence, when TfL can price the journey.
    pub fare_pence: Option<u32>,
    pub legs: Vec<Leg>,
}

impl JourneyOption {
    /// Number of changes between legs.
    pub fn changes(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }

    /// Total minutes spent on walking legs.
    pub fn walking_mins(&self) -> u32 {
        self.legs
            .iter()
            .filter(|l| l.is_walking())
            .map(|l| l.duration_mins)
            .sum()
    }

    /// Whether every leg of the route is step-free.
    pub fn is_step_free(&self) -> bool {
        self.legs.iter().all(Leg::is_step_free)
    }
}
