//! Document store abstraction.
//!
//! The engine talks to a remote document store through this narrow
//! trait, so any hosted or embedded backend can be swapped in. The
//! in-memory implementation backs the test suite and small deployments.

use crate::error::{GeonearError, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Collection holding entity documents (`lat`, `long`, plus arbitrary
/// attributes).
pub const ENTITIES: &str = "entities";

/// Collection holding per-entity geohash records (`entity_id`,
/// `geohash`; precision is the string length).
pub const GEOHASH_RECORDS: &str = "geohash_records";

/// A stored document: a store-assigned id plus a JSON field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    /// String view of a field, if present and textual.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Equality filter over a document field.
///
/// The pseudo-field `"id"` matches the document id itself, so callers
/// can fetch documents by identifier through the same listing call.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals a single value.
    Equal { field: String, value: Value },
    /// Field equals any of the given values (logical OR).
    AnyOf { field: String, values: Vec<Value> },
}

impl Filter {
    pub fn equal<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Self {
        Filter::Equal {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn any_of<F, I, V>(field: F, values: I) -> Self
    where
        F: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::AnyOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a document satisfies this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Equal { field, value } => field_matches(doc, field, value),
            Filter::AnyOf { field, values } => {
                values.iter().any(|v| field_matches(doc, field, v))
            }
        }
    }
}

fn field_matches(doc: &Document, field: &str, value: &Value) -> bool {
    if field == "id" {
        return value.as_str() == Some(doc.id.as_str());
    }
    doc.fields.get(field) == Some(value)
}

/// Trait for document store backends.
///
/// Calls are assumed to be I/O-bound and may fail; failures propagate
/// to the caller unchanged, with no retries inside the engine. All
/// methods take `&self` so one handle can serve concurrent readers.
pub trait DocumentStore: Send + Sync {
    /// Create a document with a fresh store-assigned id and return it.
    fn create_record(&self, collection: &str, fields: Map<String, Value>) -> Result<Document>;

    /// List documents matching all the given filters, in insertion
    /// order. An empty filter slice lists the whole collection.
    fn list_records(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>>;

    /// Merge the given fields into an existing document.
    fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document>;

    /// Delete a document by id.
    fn delete_record(&self, collection: &str, id: &str) -> Result<()>;
}

/// In-memory document store.
///
/// Keeps insertion order per collection and assigns UUID v4 ids.
/// Intended for tests and single-process use; it satisfies the same
/// contract a hosted store would.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<FxHashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }
}

impl DocumentStore for MemoryStore {
    fn create_record(&self, collection: &str, fields: Map<String, Value>) -> Result<Document> {
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            fields,
        };

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        Ok(doc)
    }

    fn list_records(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|doc| filters.iter().all(|f| f.matches(doc)))
            .cloned()
            .collect())
    }

    fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document> {
        let mut collections = self.collections.write();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| GeonearError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| GeonearError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in fields {
            doc.fields.insert(key, value);
        }

        Ok(doc.clone())
    }

    fn delete_record(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.write();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| GeonearError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(GeonearError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
