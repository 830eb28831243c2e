//! Core types: configuration, search requests, entities, and results.

use crate::error::{GeonearError, Result};
use crate::store::Document;
use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map carried by entity documents (name, bio, and whatever
/// else callers store). Opaque to the engine.
pub type Attributes = Map<String, Value>;

/// Precision/coverage trade-off policy for proximity queries.
///
/// `Standard` picks the finest precision that still covers the radius,
/// which keeps candidate sets small but can miss entities sitting just
/// across a cell boundary. `Extended` drops one precision level at every
/// radius threshold and may add a second neighbor ring, trading false
/// positives (filtered later by exact distance) for better recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Standard,
    Extended,
}

/// Engine configuration.
///
/// Serializable so deployments can load it from JSON alongside the rest
/// of their settings.
///
/// # Example
///
/// ```rust
/// use geonear::Config;
///
/// let config = Config::default();
/// assert_eq!(config.extended_ring_threshold_km, 10.0);
///
/// let json = r#"{ "extended_ring_threshold_km": 25.0 }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.extended_ring_threshold_km, 25.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Radius (km) above which extended-mode queries add a second ring
    /// of neighbor cells. Inherited tuning constant with no derivation
    /// behind it; exposed here so operators can adjust it instead of
    /// relying on a buried literal.
    #[serde(default = "Config::default_extended_ring_threshold_km")]
    pub extended_ring_threshold_km: f64,
}

impl Config {
    const fn default_extended_ring_threshold_km() -> f64 {
        10.0
    }

    /// Adjust the radius threshold for second-ring expansion.
    pub fn with_extended_ring_threshold_km(mut self, threshold_km: f64) -> Self {
        assert!(
            threshold_km.is_finite() && threshold_km >= 0.0,
            "Ring threshold must be a finite non-negative radius"
        );
        self.extended_ring_threshold_km = threshold_km;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extended_ring_threshold_km: Self::default_extended_ring_threshold_km(),
        }
    }
}

/// A proximity search request.
///
/// # Example
///
/// ```rust
/// use geonear::{Point, SearchMode, SearchRequest};
///
/// let paris = Point::new(2.3522, 48.8566);
/// let request = SearchRequest::new(paris, 10.0)
///     .with_mode(SearchMode::Extended)
///     .excluding("the-caller-id")
///     .with_limit(20);
/// ```
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Reference coordinate the radius is measured from.
    pub origin: Point,
    /// Search radius in kilometers.
    pub radius_km: f64,
    /// Precision/coverage policy.
    pub mode: SearchMode,
    /// Entity id omitted from results, typically the querying entity.
    pub exclude: Option<String>,
    /// Maximum number of results, applied after sorting by distance.
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Create a standard-mode request with no exclusion or limit.
    pub fn new(origin: Point, radius_km: f64) -> Self {
        Self {
            origin,
            radius_km,
            mode: SearchMode::default(),
            exclude: None,
            limit: None,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Omit the given entity from results.
    pub fn excluding<S: Into<String>>(mut self, entity_id: S) -> Self {
        self.exclude = Some(entity_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An entity as read back from the `entities` collection.
///
/// The engine only interprets the id and the coordinates; every other
/// field rides along in `attributes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Store-assigned identifier, opaque to the engine.
    pub id: String,
    /// Location (x = longitude, y = latitude).
    pub location: Point,
    /// Remaining document fields (name, bio, ...).
    pub attributes: Attributes,
}

impl Entity {
    /// Parse an entity out of a raw store document.
    ///
    /// Rejects documents with missing, non-numeric, non-finite, or
    /// out-of-range coordinates so malformed records can never leak NaN
    /// distances into a ranking.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let lat = coordinate_field(doc, "lat")?;
        let lon = coordinate_field(doc, "long")?;

        let location = Point::new(lon, lat);
        crate::spatial::validate_coordinate(&location).map_err(|e| {
            GeonearError::MalformedEntity {
                id: doc.id.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut attributes = doc.fields.clone();
        attributes.remove("lat");
        attributes.remove("long");

        Ok(Self {
            id: doc.id.clone(),
            location,
            attributes,
        })
    }
}

fn coordinate_field(doc: &Document, field: &str) -> Result<f64> {
    match doc.fields.get(field) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| GeonearError::MalformedEntity {
                id: doc.id.clone(),
                reason: format!("field '{}' is not numeric: {}", field, value),
            }),
        None => Err(GeonearError::MalformedEntity {
            id: doc.id.clone(),
            reason: format!("missing field '{}'", field),
        }),
    }
}

/// One level of an entity's multi-precision geohash batch.
///
/// Precision is implicit: it equals `geohash.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeohashRecord {
    pub entity_id: String,
    pub geohash: String,
}

impl GeohashRecord {
    pub fn precision(&self) -> usize {
        self.geohash.len()
    }
}

/// A single ranked search result.
#[derive(Debug, Clone)]
pub struct NearbyEntity {
    pub entity: Entity,
    /// Great-circle distance from the request origin, in kilometers.
    pub distance_km: f64,
    /// The geohash cell the entity resolved into at the query precision.
    /// Diagnostic only; useful when investigating border misses.
    pub cell: String,
}

/// The outcome of a proximity query.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matches within the radius, ascending by distance. Ties keep
    /// their fetch order (the sort is stable).
    pub items: Vec<NearbyEntity>,
    /// Number of candidate documents dropped because their coordinates
    /// were unusable. Non-zero values indicate store corruption.
    pub skipped: usize,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Ids of all matched entities, in ranked order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|n| n.entity.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_config_default_and_builder() {
        let config = Config::default();
        assert_eq!(config.extended_ring_threshold_km, 10.0);

        let config = config.with_extended_ring_threshold_km(25.0);
        assert_eq!(config.extended_ring_threshold_km, 25.0);
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.extended_ring_threshold_km, 10.0);
    }

    #[test]
    #[should_panic]
    fn test_config_rejects_negative_threshold() {
        let _ = Config::default().with_extended_ring_threshold_km(-1.0);
    }

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new(Point::new(2.3522, 48.8566), 10.0)
            .with_mode(SearchMode::Extended)
            .excluding("me")
            .with_limit(5);

        assert_eq!(request.mode, SearchMode::Extended);
        assert_eq!(request.exclude.as_deref(), Some("me"));
        assert_eq!(request.limit, Some(5));
    }

    #[test]
    fn test_entity_from_document() {
        let document = doc(
            "u1",
            json!({ "lat": 48.8566, "long": 2.3522, "name": "Camille" }),
        );

        let entity = Entity::from_document(&document).unwrap();
        assert_eq!(entity.id, "u1");
        assert_eq!(entity.location.y(), 48.8566);
        assert_eq!(entity.location.x(), 2.3522);
        assert_eq!(entity.attributes.get("name"), Some(&json!("Camille")));
        assert!(!entity.attributes.contains_key("lat"));
    }

    #[test]
    fn test_entity_missing_coordinates() {
        let document = doc("u2", json!({ "name": "Jean" }));
        assert!(Entity::from_document(&document).is_err());
    }

    #[test]
    fn test_entity_non_numeric_coordinates() {
        let document = doc("u3", json!({ "lat": "north", "long": 2.0 }));
        assert!(Entity::from_document(&document).is_err());
    }

    #[test]
    fn test_entity_out_of_range_coordinates() {
        let document = doc("u4", json!({ "lat": 95.0, "long": 2.0 }));
        assert!(Entity::from_document(&document).is_err());
    }

    #[test]
    fn test_geohash_record_precision() {
        let record = GeohashRecord {
            entity_id: "u1".to_string(),
            geohash: "u09tvw".to_string(),
        };
        assert_eq!(record.precision(), 6);
    }
}
