use crate::C;
use serde::Serialize;
use std::fmt;

/// Distances at or above this many meters are reported in kilometers.
const KM_THRESHOLD_M: C = 1000.0;

/// The result of a completed measurement action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measurement {
    Distance { meters: C },
    Area { acres: C },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Meters,
    Kilometers,
}

impl DistanceUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
        }
    }

    /// Picks the presentation unit for `meters` and returns the value
    /// expressed in that unit.
    pub fn for_meters(meters: C) -> (C, Self) {
        if meters >= KM_THRESHOLD_M {
            (meters / 1000.0, Self::Kilometers)
        } else {
            (meters, Self::Meters)
        }
    }
}

impl Measurement {
    /// Value and unit symbol as shown to the user.
    pub fn display_value(&self) -> (C, &'static str) {
        match *self {
            Self::Distance { meters } => {
                let (value, unit) = DistanceUnit::for_meters(meters);
                (value, unit.symbol())
            }
            Self::Area { acres } => (acres, "acres"),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = self.display_value();
        write!(f, "{value:.2} {unit}")
    }
}
