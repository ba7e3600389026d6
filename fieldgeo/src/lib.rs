//! # Field Geometry
//!
//! `fieldgeo` turns coordinates gathered from map interactions into
//! real-world measurements: polygon area in acres and great-circle
//! distance in meters, both on a spherical earth.

mod constants;
mod error;
mod health;
pub mod layer;
mod math;
mod measure;
pub mod report;
mod tool;

pub use crate::{
    constants::{ACRES_PER_SQ_METER, EQUATORIAL_EARTH_RADIUS, MEAN_EARTH_RADIUS},
    error::FieldGeoError,
    health::VegetationHealth,
    layer::{CustomLayer, LayerKind},
    math::{area_acres, distance_m, SphericalArea},
    measure::{DistanceUnit, Measurement},
    report::{FieldRecord, FieldReport},
    tool::{MeasureMode, MeasureTool},
};
pub use geo;

/// Base floating point type used for all coordinates and measurements.
///
/// Stored acreage is compared against values produced by the web
/// dashboard, so everything is computed in `f64` to stay bit-compatible.
pub type C = f64;
