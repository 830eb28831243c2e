//! Great-circle distance and coordinate validation.
//!
//! Distances use the haversine formula on a spherical Earth. The error
//! against an ellipsoidal model stays well under 0.5% at the radii the
//! engine works with, which the exact-distance filter tolerates.

use crate::error::{GeonearError, Result};
use geo::Point;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometers.
///
/// Symmetric, and zero for identical points.
///
/// # Examples
///
/// ```rust
/// use geonear::{Point, spatial::distance_km};
///
/// let paris = Point::new(2.3522, 48.8566);
/// let london = Point::new(-0.1278, 51.5074);
///
/// let dist = distance_km(&paris, &london);
/// assert!(dist > 340.0 && dist < 350.0); // ~344 km
/// ```
pub fn distance_km(a: &Point, b: &Point) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h fractionally past 1.0 for near-antipodal
    // points, which would make (1 - h).sqrt() NaN
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Validates that a point carries a usable geographic coordinate.
///
/// Longitude: [-180.0, 180.0], latitude: [-90.0, 90.0], both finite.
///
/// # Examples
///
/// ```rust
/// use geonear::{Point, spatial::validate_coordinate};
///
/// assert!(validate_coordinate(&Point::new(2.3522, 48.8566)).is_ok());
/// assert!(validate_coordinate(&Point::new(200.0, 40.0)).is_err());
/// assert!(validate_coordinate(&Point::new(2.0, f64::NAN)).is_err());
/// ```
pub fn validate_coordinate(point: &Point) -> Result<()> {
    let (lon, lat) = (point.x(), point.y());

    if !lon.is_finite() {
        return Err(GeonearError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lon
        )));
    }

    if !lat.is_finite() {
        return Err(GeonearError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(GeonearError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeonearError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    Ok(())
}

/// Validates a search radius: finite and non-negative.
pub fn validate_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(GeonearError::InvalidInput(format!(
            "Search radius must be a finite non-negative number of kilometers, got: {}",
            radius_km
        )));
    }
    Ok(())
}
