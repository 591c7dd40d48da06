//! Record types for the galaxy dump and the star classification that decides
//! which systems supercharge the FSD and which can refuel a scooping ship.
//!
//! The dump itself is parsed by the caller (the CLI streams it from a
//! compressed JSON array); the library only consumes [`SystemRecord`] values.

use serde::{Deserialize, Serialize};

use crate::geom::Position;

/// Stars farther than this from the arrival point are not worth the detour.
pub const MAX_STAR_DISTANCE_LS: f64 = 1000.0;

/// Spectral classes a fuel scoop works on (the KGBFOAM set).
pub const SCOOPABLE_CLASSES: [&str; 14] = [
    "A (Blue-White super giant) Star",
    "A (Blue-White) Star",
    "B (Blue-White super giant) Star",
    "B (Blue-White) Star",
    "F (White super giant) Star",
    "F (White) Star",
    "G (White-Yellow super giant) Star",
    "G (White-Yellow) Star",
    "K (Yellow-Orange giant) Star",
    "K (Yellow-Orange) Star",
    "M (Red dwarf) Star",
    "M (Red giant) Star",
    "M (Red super giant) Star",
    "O (Blue-White) Star",
];

/// One system as it appears in the galaxy dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id64: u64,
    pub name: String,
    pub coords: Position,
    #[serde(default)]
    pub bodies: Vec<Body>,
}

/// One body within a system in the galaxy dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub id64: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "subType", default)]
    pub sub_type: String,
    #[serde(rename = "distanceToArrival", default)]
    pub distance_to_arrival: f64,
}

impl SystemRecord {
    /// True when the system has a neutron star close enough to supercharge
    /// the FSD on the way through. White dwarfs also supercharge but the
    /// weaker boost is not worth the detour, so they are not checked.
    pub fn has_neutron_in_range(&self) -> bool {
        self.bodies.iter().any(|body| {
            body.kind == "Star"
                && body.sub_type == "Neutron Star"
                && body.distance_to_arrival <= MAX_STAR_DISTANCE_LS
        })
    }

    /// True when the system has a scoopable star close enough to refuel at.
    pub fn has_scoopable_in_range(&self) -> bool {
        self.bodies.iter().any(|body| {
            body.kind == "Star"
                && SCOOPABLE_CLASSES.contains(&body.sub_type.as_str())
                && body.distance_to_arrival <= MAX_STAR_DISTANCE_LS
        })
    }
}
