//! Candidate cell expansion around the query center.
//!
//! The indexed search only sees entities whose cell is in the candidate
//! set, so coverage here bounds recall. The center cell and its eight
//! neighbors are always searched; extended-mode queries past the
//! configured radius threshold add the neighbors of each of those nine
//! cells as well. The second ring covers reference points sitting near
//! a cell edge, where the truly nearest cells can be two steps away.

use crate::cell;
use crate::types::{Config, SearchMode};
use std::collections::HashSet;

/// Compute the deduplicated set of geohash cells to search.
///
/// Always contains the center; at most 9 cells in standard mode and 81
/// before dedup when the second ring applies. Neighbor lookup failures
/// near the poles shrink the set instead of failing the query.
///
/// # Examples
///
/// ```rust
/// use geonear::{Config, Point, SearchMode, cell, expand::candidate_cells};
///
/// let center = cell::encode(&Point::new(2.3522, 48.8566), 6).unwrap();
/// let cells = candidate_cells(&center, SearchMode::Standard, 10.0, &Config::default());
/// assert_eq!(cells.len(), 9);
/// assert!(cells.contains(&center));
/// ```
pub fn candidate_cells(
    center: &str,
    mode: SearchMode,
    radius_km: f64,
    config: &Config,
) -> HashSet<String> {
    let mut cells = HashSet::new();
    cells.insert(center.to_string());

    let Ok(ring1) = cell::neighbors(center) else {
        return cells;
    };

    let second_ring =
        mode == SearchMode::Extended && radius_km > config.extended_ring_threshold_km;

    if second_ring {
        // Neighbors of the center's neighbors, plus the center's own
        // second ring via itself being in the seed set.
        for seed in ring1.iter().map(String::as_str).chain([center]) {
            if let Ok(ring2) = cell::neighbors(seed) {
                cells.extend(ring2);
            }
        }
    }

    cells.extend(ring1);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn center_at(lon: f64, lat: f64, precision: usize) -> String {
        cell::encode(&Point::new(lon, lat), precision).unwrap()
    }

    #[test]
    fn test_standard_is_center_plus_ring1() {
        let center = center_at(2.3522, 48.8566, 6);
        let cells = candidate_cells(&center, SearchMode::Standard, 500.0, &Config::default());

        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&center));
        for nb in cell::neighbors(&center).unwrap() {
            assert!(cells.contains(&nb));
        }
    }

    #[test]
    fn test_extended_below_threshold_is_ring1() {
        let center = center_at(2.3522, 48.8566, 9);
        let cells = candidate_cells(&center, SearchMode::Extended, 5.0, &Config::default());
        assert_eq!(cells.len(), 9);
    }

    #[test]
    fn test_extended_above_threshold_adds_second_ring() {
        let center = center_at(2.3522, 48.8566, 5);
        let cells = candidate_cells(&center, SearchMode::Extended, 20.0, &Config::default());

        // A full two-ring block is a 5x5 grid of cells
        assert_eq!(cells.len(), 25);
        assert!(cells.contains(&center));

        // Every ring-1 neighbor's own neighbors are present
        for nb in cell::neighbors(&center).unwrap() {
            for nb2 in cell::neighbors(&nb).unwrap() {
                assert!(cells.contains(&nb2));
            }
        }
    }

    #[test]
    fn test_threshold_is_configurable() {
        let center = center_at(2.3522, 48.8566, 5);
        let config = Config::default().with_extended_ring_threshold_km(50.0);

        let cells = candidate_cells(&center, SearchMode::Extended, 20.0, &config);
        assert_eq!(cells.len(), 9);

        let cells = candidate_cells(&center, SearchMode::Extended, 60.0, &config);
        assert_eq!(cells.len(), 25);
    }

    #[test]
    fn test_cells_share_center_precision() {
        let center = center_at(-74.0060, 40.7128, 4);
        let cells = candidate_cells(&center, SearchMode::Extended, 200.0, &Config::default());
        for c in &cells {
            assert_eq!(c.len(), center.len());
        }
    }

    #[test]
    fn test_antimeridian_center_still_expands() {
        let center = center_at(179.99, 0.0, 5);
        let cells = candidate_cells(&center, SearchMode::Standard, 20.0, &Config::default());
        assert_eq!(cells.len(), 9);
    }
}
