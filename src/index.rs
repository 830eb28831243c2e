//! Multi-precision geohash index over the document store.
//!
//! Every indexed entity owns exactly one batch of nine geohash records,
//! one per precision level 1..=9, all prefixes of the same full
//! nine-character geohash. Queries look entities up by cell at a single
//! precision; relocations replace the whole batch.

use crate::cell;
use crate::error::Result;
use crate::store::{DocumentStore, Filter, GEOHASH_RECORDS};
use crate::types::GeohashRecord;
use geo::Point;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::sync::Arc;

/// Per-entity geohash record maintenance and cell lookups.
pub struct GeohashIndex<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> GeohashIndex<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Index an entity's location, replacing any prior record batch.
    ///
    /// The stale batch is deleted first, best-effort: a failure there is
    /// logged as a consistency warning and the new batch is written
    /// anyway, leaving at worst a bounded window where a reader matches
    /// the entity at an extra stale cell. Re-running with the same
    /// coordinates converges on the same nine records, so retries are
    /// safe.
    pub fn put(&self, entity_id: &str, location: &Point) -> Result<()> {
        if let Err(e) = self.delete_batch(entity_id) {
            log::warn!(
                "Failed to clear stale geohash records for entity '{}': {}. \
                 Writing the new batch anyway; readers may briefly over-match.",
                entity_id,
                e
            );
        }

        let full = cell::encode(location, cell::MAX_PRECISION)?;
        let batch: SmallVec<[GeohashRecord; 9]> = cell::prefix_levels(&full)
            .map(|prefix| GeohashRecord {
                entity_id: entity_id.to_string(),
                geohash: prefix.to_string(),
            })
            .collect();

        for record in &batch {
            let mut fields = Map::new();
            fields.insert("entity_id".to_string(), Value::from(record.entity_id.clone()));
            fields.insert("geohash".to_string(), Value::from(record.geohash.clone()));
            self.store.create_record(GEOHASH_RECORDS, fields)?;
        }

        log::debug!(
            "Indexed entity '{}' at geohash '{}' across {} precision levels",
            entity_id,
            full,
            batch.len()
        );
        Ok(())
    }

    /// Ids of all entities whose stored geohash equals one of the given
    /// cells. The cells are expected to share a single precision (the
    /// query precision); the lookup is one OR-filtered listing call.
    pub fn entities_in_cells(&self, cells: &HashSet<String>) -> Result<HashSet<String>> {
        if cells.is_empty() {
            return Ok(HashSet::new());
        }

        let filter = Filter::any_of("geohash", cells.iter().cloned());
        let docs = self.store.list_records(GEOHASH_RECORDS, &[filter])?;

        Ok(docs
            .iter()
            .filter_map(|doc| doc.str_field("entity_id"))
            .map(str::to_string)
            .collect())
    }

    /// The stored record batch for an entity, coarsest level first.
    pub fn records_for(&self, entity_id: &str) -> Result<Vec<GeohashRecord>> {
        let filter = Filter::equal("entity_id", entity_id);
        let docs = self.store.list_records(GEOHASH_RECORDS, &[filter])?;

        let mut records: Vec<GeohashRecord> = docs
            .iter()
            .filter_map(|doc| {
                Some(GeohashRecord {
                    entity_id: doc.str_field("entity_id")?.to_string(),
                    geohash: doc.str_field("geohash")?.to_string(),
                })
            })
            .collect();
        records.sort_by_key(|r| r.precision());
        Ok(records)
    }

    /// Remove all geohash records for an entity. Unlike the best-effort
    /// cleanup inside `put`, failures here propagate.
    pub fn remove(&self, entity_id: &str) -> Result<()> {
        self.delete_batch(entity_id)
    }

    fn delete_batch(&self, entity_id: &str) -> Result<()> {
        let filter = Filter::equal("entity_id", entity_id);
        let stale = self.store.list_records(GEOHASH_RECORDS, &[filter])?;
        for doc in stale {
            self.store.delete_record(GEOHASH_RECORDS, &doc.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn index() -> (Arc<MemoryStore>, GeohashIndex<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), GeohashIndex::new(store))
    }

    #[test]
    fn test_put_writes_nine_prefix_records() {
        let (_, index) = index();
        let paris = Point::new(2.3522, 48.8566);

        index.put("u1", &paris).unwrap();

        let records = index.records_for("u1").unwrap();
        assert_eq!(records.len(), 9);

        let full = cell::encode(&paris, cell::MAX_PRECISION).unwrap();
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.precision(), i + 1);
            assert!(full.starts_with(&record.geohash));
        }
    }

    #[test]
    fn test_put_is_idempotent() {
        let (store, index) = index();
        let paris = Point::new(2.3522, 48.8566);

        index.put("u1", &paris).unwrap();
        index.put("u1", &paris).unwrap();

        assert_eq!(store.count(GEOHASH_RECORDS), 9);
        let records = index.records_for("u1").unwrap();
        assert_eq!(records.len(), 9);
    }

    #[test]
    fn test_put_replaces_batch_on_relocation() {
        let (store, index) = index();

        index.put("u1", &Point::new(2.3522, 48.8566)).unwrap();
        let tokyo = Point::new(139.6917, 35.6895);
        index.put("u1", &tokyo).unwrap();

        assert_eq!(store.count(GEOHASH_RECORDS), 9);
        let full = cell::encode(&tokyo, cell::MAX_PRECISION).unwrap();
        for record in index.records_for("u1").unwrap() {
            assert!(full.starts_with(&record.geohash));
        }
    }

    #[test]
    fn test_put_leaves_other_entities_alone() {
        let (store, index) = index();

        index.put("u1", &Point::new(2.3522, 48.8566)).unwrap();
        index.put("u2", &Point::new(2.3622, 48.8666)).unwrap();
        index.put("u1", &Point::new(139.6917, 35.6895)).unwrap();

        assert_eq!(store.count(GEOHASH_RECORDS), 18);
        assert_eq!(index.records_for("u2").unwrap().len(), 9);
    }

    #[test]
    fn test_entities_in_cells() {
        let (_, index) = index();
        let paris = Point::new(2.3522, 48.8566);
        let tokyo = Point::new(139.6917, 35.6895);

        index.put("u1", &paris).unwrap();
        index.put("u2", &tokyo).unwrap();

        let paris_cell = cell::encode(&paris, 6).unwrap();
        let cells: HashSet<String> = [paris_cell].into();

        let ids = index.entities_in_cells(&cells).unwrap();
        assert!(ids.contains("u1"));
        assert!(!ids.contains("u2"));
    }

    #[test]
    fn test_entities_in_cells_deduplicates() {
        let (_, index) = index();
        let paris = Point::new(2.3522, 48.8566);
        index.put("u1", &paris).unwrap();

        // Same entity reachable through its own cell at one precision;
        // a set of sibling cells still yields the id once
        let cells: HashSet<String> = [cell::encode(&paris, 3).unwrap()].into();
        let ids = index.entities_in_cells(&cells).unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_entities_in_cells_empty_input() {
        let (_, index) = index();
        index.put("u1", &Point::new(2.3522, 48.8566)).unwrap();

        let ids = index.entities_in_cells(&HashSet::new()).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_remove() {
        let (store, index) = index();
        index.put("u1", &Point::new(2.3522, 48.8566)).unwrap();

        index.remove("u1").unwrap();
        assert_eq!(store.count(GEOHASH_RECORDS), 0);
    }
}
