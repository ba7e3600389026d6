use crate::C;

/// WGS-84 equatorial radius (meters), used as a sphere for area.
pub const EQUATORIAL_EARTH_RADIUS: C = 6_378_137.0;

/// Mean earth radius (meters), used for haversine distance.
///
/// Intentionally different from [`EQUATORIAL_EARTH_RADIUS`]. Previously
/// stored measurements depend on each formula keeping its own radius.
pub const MEAN_EARTH_RADIUS: C = 6_371_000.0;

/// Square meters to acres.
pub const ACRES_PER_SQ_METER: C = 0.000_247_105;
