//! Geohash codec: encode, decode, neighbor cells, and prefix levels.
//!
//! Thin wrapper over the `geohash` crate that pins the precision range
//! the index works with. A geohash is a base-32 string naming a
//! rectangular region; longer strings refine shorter ones, and every
//! prefix of a geohash is the geohash of the enclosing coarser cell.

use crate::error::{GeonearError, Result};
use geo::Point;

/// Finest precision the index stores. Nine characters resolves to
/// roughly 5 m x 5 m cells.
pub const MAX_PRECISION: usize = 9;

/// Coarsest precision the index stores (continental cells).
pub const MIN_PRECISION: usize = 1;

fn check_precision(precision: usize) -> Result<()> {
    if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        return Err(GeonearError::InvalidInput(format!(
            "Geohash precision must be between {} and {}, got: {}",
            MIN_PRECISION, MAX_PRECISION, precision
        )));
    }
    Ok(())
}

/// Encode a point to a geohash of the given precision.
///
/// Deterministic: the same point and precision always produce the same
/// string, and a higher-precision encoding of the same point is an
/// extension of the lower-precision one.
///
/// # Examples
///
/// ```rust
/// use geonear::{Point, cell};
///
/// let paris = Point::new(2.3522, 48.8566);
/// let hash = cell::encode(&paris, 6).unwrap();
/// assert_eq!(hash.len(), 6);
///
/// let finer = cell::encode(&paris, 9).unwrap();
/// assert!(finer.starts_with(&hash));
/// ```
pub fn encode(point: &Point, precision: usize) -> Result<String> {
    check_precision(precision)?;
    crate::spatial::validate_coordinate(point)?;

    let coord = geohash::Coord {
        x: point.x(),
        y: point.y(),
    };
    Ok(geohash::encode(coord, precision)?)
}

/// Decode a geohash to its representative point (the cell center).
///
/// The round trip through `encode` is lossy: the decoded point falls
/// inside the cell's bounding box but is generally not the original
/// coordinate.
pub fn decode(hash: &str) -> Result<Point> {
    let (coord, _lon_err, _lat_err) = geohash::decode(hash)?;
    Ok(Point::new(coord.x, coord.y))
}

/// The eight same-precision cells adjacent to a geohash, in compass
/// order N, NE, E, SE, S, SW, W, NW.
///
/// Longitude wraps across the antimeridian. Cells touching a pole have
/// no well-defined neighbor set in every direction; the underlying
/// library reports that as an error rather than panicking, and ring
/// expansion treats it as "no cells in that direction".
pub fn neighbors(hash: &str) -> Result<[String; 8]> {
    let nb = geohash::neighbors(hash)?;
    Ok([nb.n, nb.ne, nb.e, nb.se, nb.s, nb.sw, nb.w, nb.nw])
}

/// All prefix truncations of a full-precision geohash, coarsest first.
///
/// This is the record batch the index stores per entity: one geohash
/// per precision level 1..=9, all prefixes of the same full hash.
pub fn prefix_levels(full: &str) -> impl Iterator<Item = &str> {
    (MIN_PRECISION..=full.len().min(MAX_PRECISION)).map(move |p| &full[..p])
}
