//! Position providers.
//!
//! The engine never holds a global "current position". Callers hand in
//! a provider per call, so concurrent queries with different reference
//! points stay independent, and whether the position comes from a live
//! sensor or a fixed value is invisible to the engine.

use crate::error::Result;
use geo::Point;

/// Source of the caller's current coordinate.
pub trait PositionProvider {
    fn current_position(&self) -> Result<Point>;
}

/// A provider that always reports the same coordinate.
///
/// Useful for tests, simulations, and clients without a location
/// sensor.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Point);

impl FixedPosition {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self(Point::new(lon, lat))
    }
}

impl PositionProvider for FixedPosition {
    fn current_position(&self) -> Result<Point> {
        Ok(self.0)
    }
}
