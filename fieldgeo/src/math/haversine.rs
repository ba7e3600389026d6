use crate::{constants::MEAN_EARTH_RADIUS, math::radians, C};
use geo::geometry::Coord;

/// Returns the great-circle distance, in meters, between `p1` and `p2`.
pub fn distance_m(p1: Coord<C>, p2: Coord<C>) -> C {
    let lat1 = radians(p1.y);
    let lat2 = radians(p2.y);
    let delta_lat = radians(p2.y - p1.y);
    let delta_lng = radians(p2.x - p1.x);

    let half_lat_sin = (delta_lat / 2.0).sin();
    let half_lng_sin = (delta_lng / 2.0).sin();
    let a = half_lat_sin * half_lat_sin + lat1.cos() * lat2.cos() * half_lng_sin * half_lng_sin;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    MEAN_EARTH_RADIUS * c
}
