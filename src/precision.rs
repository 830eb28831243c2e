//! Radius-to-precision selection.
//!
//! Maps a search radius to the geohash precision whose cells are large
//! enough to cover it with the center-plus-neighbors cell set. The
//! mapping is a step function, monotonically non-increasing in the
//! radius: a wider search means coarser, shorter geohashes.

use crate::types::SearchMode;

/// Pick the geohash precision for a search radius in kilometers.
///
/// Extended mode selects one level coarser than standard at every
/// threshold above 5 km, widening cell coverage at the cost of more
/// false positives for the exact-distance filter to discard.
///
/// # Examples
///
/// ```rust
/// use geonear::{SearchMode, precision::precision_for_radius};
///
/// assert_eq!(precision_for_radius(3.0, SearchMode::Standard), 9);
/// assert_eq!(precision_for_radius(10.0, SearchMode::Standard), 6);
/// assert_eq!(precision_for_radius(10.0, SearchMode::Extended), 5);
/// assert_eq!(precision_for_radius(5000.0, SearchMode::Extended), 1);
/// ```
pub fn precision_for_radius(radius_km: f64, mode: SearchMode) -> usize {
    match mode {
        SearchMode::Standard => {
            if radius_km <= 5.0 {
                9
            } else if radius_km <= 20.0 {
                6
            } else if radius_km <= 100.0 {
                5
            } else if radius_km <= 500.0 {
                4
            } else if radius_km <= 2000.0 {
                3
            } else {
                2
            }
        }
        SearchMode::Extended => {
            if radius_km <= 5.0 {
                9
            } else if radius_km <= 20.0 {
                5
            } else if radius_km <= 100.0 {
                4
            } else if radius_km <= 500.0 {
                3
            } else if radius_km <= 2000.0 {
                2
            } else {
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        assert_eq!(precision_for_radius(0.0, SearchMode::Standard), 9);
        assert_eq!(precision_for_radius(5.0, SearchMode::Standard), 9);
        assert_eq!(precision_for_radius(5.1, SearchMode::Standard), 6);
        assert_eq!(precision_for_radius(20.0, SearchMode::Standard), 6);
        assert_eq!(precision_for_radius(100.0, SearchMode::Standard), 5);
        assert_eq!(precision_for_radius(500.0, SearchMode::Standard), 4);
        assert_eq!(precision_for_radius(2000.0, SearchMode::Standard), 3);
        assert_eq!(precision_for_radius(2000.1, SearchMode::Standard), 2);
    }

    #[test]
    fn test_extended_table() {
        assert_eq!(precision_for_radius(5.0, SearchMode::Extended), 9);
        assert_eq!(precision_for_radius(20.0, SearchMode::Extended), 5);
        assert_eq!(precision_for_radius(100.0, SearchMode::Extended), 4);
        assert_eq!(precision_for_radius(500.0, SearchMode::Extended), 3);
        assert_eq!(precision_for_radius(2000.0, SearchMode::Extended), 2);
        assert_eq!(precision_for_radius(9000.0, SearchMode::Extended), 1);
    }

    #[test]
    fn test_monotonically_non_increasing() {
        for mode in [SearchMode::Standard, SearchMode::Extended] {
            let mut previous = usize::MAX;
            for step in 0..10_000 {
                let radius = step as f64 * 0.5;
                let precision = precision_for_radius(radius, mode);
                assert!(
                    precision <= previous,
                    "precision increased at radius {} km ({:?})",
                    radius,
                    mode
                );
                previous = precision;
            }
        }
    }

    #[test]
    fn test_extended_never_finer_than_standard() {
        for step in 0..10_000 {
            let radius = step as f64 * 0.5;
            assert!(
                precision_for_radius(radius, SearchMode::Extended)
                    <= precision_for_radius(radius, SearchMode::Standard)
            );
        }
    }
}
