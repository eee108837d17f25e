//! Transport mode and accessibility preference tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownTag {
    kind: &'static str,
    value: String,
}

/// A TfL transport mode the user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Tube,
    Bus,
    Dlr,
    Overground,
    ElizabethLine,
    NationalRail,
    Walking,
}

impl Mode {
    /// All selectable modes, in form display order.
    pub const ALL: [Mode; 7] = [
        Mode::Tube,
        Mode::Bus,
        Mode::Dlr,
        Mode::Overground,
        Mode::ElizabethLine,
        Mode::NationalRail,
        Mode::Walking,
    ];

    /// Modes ticked when the form is first shown.
    pub const DEFAULT: [Mode; 3] = [Mode::Tube, Mode::Bus, Mode::Walking];

    /// Sent when the user deselects every mode.
    pub const FALLBACK: [Mode; 2] = [Mode::Tube, Mode::Walking];

    /// The TfL mode id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Tube => "tube",
            Mode::Bus => "bus",
            Mode::Dlr => "dlr",
            Mode::Overground => "overground",
            Mode::ElizabethLine => "elizabeth-line",
            Mode::NationalRail => "national-rail",
            Mode::Walking => "walking",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownTag {
                kind: "mode",
                value: s.to_string(),
            })
    }
}

/// Icon shown next to a leg, keyed by TfL mode id.
///
/// Unknown modes (e.g. `cable-car`, `river-bus`) get a generic station icon.
pub fn mode_icon(mode_id: &str) -> &'static str {
    match mode_id {
        "tube" => "🚇",
        "bus" => "🚌",
        "walking" => "🚶",
        "dlr" => "🚊",
        "overground" => "🚈",
        "elizabeth-line" => "🚆",
        "national-rail" => "🚂",
        _ => "🚉",
    }
}

/// A TfL `accessibilityPreference` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessibilityPreference {
    NoRequirements,
    NoSolidStairs,
    NoEscalators,
    NoElevators,
    StepFreeToVehicle,
    StepFreeToPlatform,
}

impl AccessibilityPreference {
    pub const ALL: [AccessibilityPreference; 6] = [
        AccessibilityPreference::NoRequirements,
        AccessibilityPreference::NoSolidStairs,
        AccessibilityPreference::NoEscalators,
        AccessibilityPreference::NoElevators,
        AccessibilityPreference::StepFreeToVehicle,
        AccessibilityPreference::StepFreeToPlatform,
    ];

    /// The value TfL expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessibilityPreference::NoRequirements => "NoRequirements",
            AccessibilityPreference::NoSolidStairs => "NoSolidStairs",
            AccessibilityPreference::NoEscalators => "NoEscalators",
            AccessibilityPreference::NoElevators => "NoElevators",
            AccessibilityPreference::StepFreeToVehicle => "StepFreeToVehicle",
            AccessibilityPreference::StepFreeToPlatform => "StepFreeToPlatform",
        }
    }

    /// Human-readable label for the form.
    pub fn label(&self) -> &'static str {
        match self {
            AccessibilityPreference::NoRequirements => "No Requirements",
            AccessibilityPreference::NoSolidStairs => "No Solid Stairs",
            AccessibilityPreference::NoEscalators => "No Escalators",
            AccessibilityPreference::NoElevators => "No Elevators",
            AccessibilityPreference::StepFreeToVehicle => "Step-free to Vehicle",
            AccessibilityPreference::StepFreeToPlatform => "Step-free to Platform",
        }
    }

    /// Whether this preference asks for an accessible route at all.
    pub fn is_requirement(&self) -> bool {
        !matches!(self, AccessibilityPreference::NoRequirements)
    }
}

impl fmt::Display for AccessibilityPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessibilityPreference {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessibilityPreference::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownTag {
                kind: "accessibility preference",
                value: s.to_string(),
            })
    }
}
