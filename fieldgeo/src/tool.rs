//! Click-driven measurement tool.

use crate::{
    math::{area_acres, distance_m},
    measure::Measurement,
    C,
};
use geo::geometry::Coord;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureMode {
    /// Clicks are ignored.
    #[default]
    Inactive,

    /// Every pair of clicks yields one distance.
    Distance,

    /// Clicks grow a polygon whose area is previewed live.
    Area,
}

/// Accumulates clicked points and emits measurements.
///
/// Distance mode resets after each pair so a third click starts a new
/// pair rather than extending a polyline. Area mode keeps growing its
/// ring until [`MeasureTool::finish`]; the click after that starts a
/// fresh ring.
#[derive(Debug, Clone, Default)]
pub struct MeasureTool {
    mode: MeasureMode,
    points: Vec<Coord<C>>,
    closed: bool,
}

impl MeasureTool {
    pub fn new(mode: MeasureMode) -> Self {
        Self {
            mode,
            points: Vec::new(),
            closed: false,
        }
    }

    pub fn mode(&self) -> MeasureMode {
        self.mode
    }

    /// Points collected for the measurement in progress.
    pub fn points(&self) -> &[Coord<C>] {
        &self.points
    }

    /// Switches mode, discarding any measurement in progress.
    pub fn set_mode(&mut self, mode: MeasureMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// Records a click, returning a measurement if the click completes
    /// one (distance) or updates the live preview (area).
    pub fn click(&mut self, coord: Coord<C>) -> Option<Measurement> {
        match self.mode {
            MeasureMode::Inactive => None,
            MeasureMode::Distance => {
                self.points.push(coord);
                if self.points.len() == 2 {
                    let (p1, p2) = (self.points[0], self.points[1]);
                    self.points.clear();
                    let meters = distance_m(p1, p2);
                    trace!("distance; {meters} m");
                    Some(Measurement::Distance { meters })
                } else {
                    None
                }
            }
            MeasureMode::Area => {
                if self.closed {
                    self.reset();
                }
                self.points.push(coord);
                self.area()
            }
        }
    }

    /// Closes the polygon in progress (double-click).
    ///
    /// Returns the final area if in area mode with at least three
    /// points; otherwise nothing happens.
    pub fn finish(&mut self) -> Option<Measurement> {
        if self.mode != MeasureMode::Area {
            return None;
        }
        let area = self.area()?;
        self.closed = true;
        Some(area)
    }

    fn area(&self) -> Option<Measurement> {
        (self.points.len() >= 3).then(|| Measurement::Area {
            acres: area_acres(&self.points),
        })
    }
}
