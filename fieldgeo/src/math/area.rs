//! Spherical excess polygon area.

use crate::{
    constants::{ACRES_PER_SQ_METER, EQUATORIAL_EARTH_RADIUS},
    math::radians,
    C,
};
use geo::geometry::{Coord, LineString, Polygon};

/// Returns the area, in acres rounded to two decimal places, of the
/// ring described by `ring`.
///
/// The ring is implicitly closed: the last point connects back to
/// the first. Rings with fewer than three points have no area and
/// return `0.0`. Vertex order only affects the sign of the
/// intermediate sum, which is discarded.
///
/// This is an approximation for small to regional extents and should
/// not be "corrected" to an ellipsoidal formula; acreage already
/// stored by callers was produced with exactly this arithmetic.
pub fn area_acres(ring: &[Coord<C>]) -> C {
    if ring.len() < 3 {
        return 0.0;
    }

    let excess: C = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(p1, p2)| {
            let lat1 = radians(p1.y);
            let lat2 = radians(p2.y);
            let lng1 = radians(p1.x);
            let lng2 = radians(p2.x);
            (lng2 - lng1) * (2.0 + lat1.sin() + lat2.sin())
        })
        .sum();

    let area_m2 = ((excess * EQUATORIAL_EARTH_RADIUS * EQUATORIAL_EARTH_RADIUS) / 2.0).abs();
    let acres = area_m2 * ACRES_PER_SQ_METER;
    (acres * 100.0).round() / 100.0
}

/// Acreage of geo types.
pub trait SphericalArea {
    /// Area in acres, rounded to two decimal places.
    fn spherical_acres(&self) -> C;
}

impl SphericalArea for [Coord<C>] {
    fn spherical_acres(&self) -> C {
        area_acres(self)
    }
}

impl SphericalArea for LineString<C> {
    fn spherical_acres(&self) -> C {
        // A closed LineString repeats its first coord. Drop it so the
        // point count check sees the true number of vertices.
        let coords = match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) if self.0.len() > 1 && first == last => {
                &self.0[..self.0.len() - 1]
            }
            _ => &self.0[..],
        };
        area_acres(coords)
    }
}

impl SphericalArea for Polygon<C> {
    /// Exterior ring only; interior rings are ignored.
    fn spherical_acres(&self) -> C {
        self.exterior().spherical_acres()
    }
}
