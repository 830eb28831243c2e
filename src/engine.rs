//! The proximity query engine and entity lifecycle operations.

use crate::error::Result;
use crate::expand;
use crate::index::GeohashIndex;
use crate::position::PositionProvider;
use crate::precision::precision_for_radius;
use crate::store::{DocumentStore, ENTITIES, Filter};
use crate::types::{
    Attributes, Config, Entity, NearbyEntity, SearchMode, SearchRequest, SearchResults,
};
use crate::{cell, spatial};
use geo::Point;
use serde_json::Value;
use std::sync::Arc;

/// Geohash-backed proximity search over a document store.
///
/// The engine answers "which entities are within radius R of point P"
/// without scanning every record: it derives a candidate cell set from
/// the radius, looks up entity ids by cell, and only then fetches and
/// distance-filters the candidates. It also owns the write path that
/// keeps each entity's geohash record batch in step with its location.
///
/// # Example
///
/// ```rust
/// use geonear::{Engine, MemoryStore, Point, SearchRequest};
/// use serde_json::Map;
///
/// # fn main() -> Result<(), geonear::GeonearError> {
/// let engine = Engine::new(MemoryStore::new());
///
/// let paris = Point::new(2.3522, 48.8566);
/// let nearby_point = Point::new(2.3542, 48.8586);
/// engine.create_entity(&nearby_point, Map::new())?;
///
/// let results = engine.query(&SearchRequest::new(paris, 10.0))?;
/// assert_eq!(results.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Engine<S> {
    pub(crate) store: Arc<S>,
    pub(crate) index: GeohashIndex<S>,
    pub(crate) config: Config,
}

impl<S: DocumentStore> Engine<S> {
    /// Create an engine with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, Config::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(store: S, config: Config) -> Self {
        let store = Arc::new(store);
        Self {
            index: GeohashIndex::new(store.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The backing document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a proximity query.
    ///
    /// Pipeline: pick a precision from the radius and mode, encode the
    /// origin at that precision, expand to the candidate cell set, look
    /// up entity ids by cell, fetch the candidate entities, then
    /// distance-filter and sort. If no candidate cell matches, the
    /// entity fetch is skipped entirely and the result is empty.
    ///
    /// Store failures abort the query and propagate unchanged; there is
    /// no retry and never a partial result. Candidate documents with
    /// unusable coordinates are skipped and counted in
    /// [`SearchResults::skipped`] instead of poisoning the ranking.
    pub fn query(&self, request: &SearchRequest) -> Result<SearchResults> {
        spatial::validate_radius(request.radius_km)?;
        spatial::validate_coordinate(&request.origin)?;

        let precision = precision_for_radius(request.radius_km, request.mode);
        let center = cell::encode(&request.origin, precision)?;
        let cells = expand::candidate_cells(&center, request.mode, request.radius_km, &self.config);

        log::debug!(
            "Query at '{}' (precision {}, {:?}, {} km): searching {} cells",
            center,
            precision,
            request.mode,
            request.radius_km,
            cells.len()
        );

        let candidate_ids = self.index.entities_in_cells(&cells)?;
        if candidate_ids.is_empty() {
            return Ok(SearchResults::default());
        }

        let filter = Filter::any_of("id", candidate_ids.iter().cloned());
        let docs = self.store.list_records(ENTITIES, &[filter])?;

        let mut skipped = 0;
        let mut items = Vec::with_capacity(docs.len());
        for doc in &docs {
            if request.exclude.as_deref() == Some(doc.id.as_str()) {
                continue;
            }

            let entity = match Entity::from_document(doc) {
                Ok(entity) => entity,
                Err(e) => {
                    log::warn!("Skipping unrankable entity document: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            let distance_km = spatial::distance_km(&request.origin, &entity.location);
            if distance_km > request.radius_km {
                continue;
            }

            let resolved = cell::encode(&entity.location, precision)?;
            items.push(NearbyEntity {
                entity,
                distance_km,
                cell: resolved,
            });
        }

        // Stable sort: equal distances keep their fetch order
        items.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(limit) = request.limit {
            items.truncate(limit);
        }

        Ok(SearchResults { items, skipped })
    }

    /// Run a proximity query from a caller-supplied position source.
    pub fn query_near(
        &self,
        provider: &dyn PositionProvider,
        radius_km: f64,
        mode: SearchMode,
        exclude: Option<&str>,
    ) -> Result<SearchResults> {
        let origin = provider.current_position()?;
        let mut request = SearchRequest::new(origin, radius_km).with_mode(mode);
        if let Some(id) = exclude {
            request = request.excluding(id);
        }
        self.query(&request)
    }

    /// Create an entity at a location and index it.
    ///
    /// The store assigns the id. The geohash record batch is written
    /// immediately after the entity document.
    pub fn create_entity(&self, location: &Point, attributes: Attributes) -> Result<Entity> {
        spatial::validate_coordinate(location)?;

        let mut fields = attributes.clone();
        fields.insert("lat".to_string(), Value::from(location.y()));
        fields.insert("long".to_string(), Value::from(location.x()));

        let doc = self.store.create_record(ENTITIES, fields)?;
        self.index.put(&doc.id, location)?;

        Ok(Entity {
            id: doc.id,
            location: *location,
            attributes,
        })
    }

    /// Move an entity, regenerating its geohash record batch.
    ///
    /// The stale batch is discarded before the new one is written, so
    /// an entity never accumulates more than one set of records.
    pub fn update_location(&self, entity_id: &str, location: &Point) -> Result<()> {
        spatial::validate_coordinate(location)?;

        let mut fields = Attributes::new();
        fields.insert("lat".to_string(), Value::from(location.y()));
        fields.insert("long".to_string(), Value::from(location.x()));
        self.store.update_record(ENTITIES, entity_id, fields)?;

        self.index.put(entity_id, location)
    }

    /// Delete an entity and its geohash records.
    pub fn remove_entity(&self, entity_id: &str) -> Result<()> {
        self.index.remove(entity_id)?;
        self.store.delete_record(ENTITIES, entity_id)
    }

    /// Fetch a single entity by id.
    pub fn entity(&self, entity_id: &str) -> Result<Option<Entity>> {
        let filter = Filter::equal("id", entity_id);
        let docs = self.store.list_records(ENTITIES, &[filter])?;
        docs.first().map(Entity::from_document).transpose()
    }

    /// Fetch every stored entity, skipping unparseable documents.
    ///
    /// Returns the entities and the count of documents skipped.
    pub fn entities(&self) -> Result<(Vec<Entity>, usize)> {
        let docs = self.store.list_records(ENTITIES, &[])?;

        let mut skipped = 0;
        let mut entities = Vec::with_capacity(docs.len());
        for doc in &docs {
            match Entity::from_document(doc) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    log::warn!("Skipping unparseable entity document: {}", e);
                    skipped += 1;
                }
            }
        }
        Ok((entities, skipped))
    }
}
