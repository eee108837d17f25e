//! Domain types for the journey planner.
//!
//! Places, transport mode tags, and the journey options built from TfL
//! responses. Nothing here outlives a single request.

mod journey;
mod mode;
mod place;

#[cfg(test)]
pub(crate) use journey::test_support;
pub use journey::{JourneyOption, Leg, Obstacle, WALKING};
pub use mode::{AccessibilityPreference, Mode, UnknownTag, mode_icon};
pub use place::{Coordinates, Place, PlaceId, PlaceKind, is_postcode};
