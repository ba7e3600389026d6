mod area;
mod haversine;

pub use {
    area::{area_acres, SphericalArea},
    haversine::distance_m,
};

use crate::C;
use std::f64::consts::PI;

/// Degrees to radians, multiplying before dividing so results match
/// the dashboard bit for bit.
fn radians(deg: C) -> C {
    (deg * PI) / 180.0
}
