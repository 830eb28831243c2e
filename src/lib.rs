//! Geohash-backed proximity search over a pluggable document store.
//!
//! ```rust
//! use geonear::{Engine, MemoryStore, Point, SearchRequest};
//! use serde_json::Map;
//!
//! let engine = Engine::new(MemoryStore::new());
//!
//! let spot = Point::new(2.3542, 48.8586);
//! engine.create_entity(&spot, Map::new())?;
//!
//! let paris = Point::new(2.3522, 48.8566);
//! let nearby = engine.query(&SearchRequest::new(paris, 10.0))?;
//! assert_eq!(nearby.len(), 1);
//! # Ok::<(), geonear::GeonearError>(())
//! ```

pub mod audit;
pub mod builder;
pub mod cell;
pub mod engine;
pub mod error;
pub mod expand;
pub mod index;
pub mod position;
pub mod precision;
pub mod spatial;
pub mod store;
pub mod types;

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::{GeonearError, Result};

pub use geo::Point;

pub use audit::ReconciliationReport;

pub use index::GeohashIndex;

pub use position::{FixedPosition, PositionProvider};

pub use store::{Document, DocumentStore, Filter, MemoryStore};

pub use types::{
    Attributes, Config, Entity, GeohashRecord, NearbyEntity, SearchMode, SearchRequest,
    SearchResults,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Engine, EngineBuilder, GeonearError, Result};

    pub use geo::Point;

    pub use crate::spatial::distance_km;

    pub use crate::{Config, SearchMode, SearchRequest, SearchResults};

    pub use crate::{Document, DocumentStore, Filter, MemoryStore};

    pub use crate::{FixedPosition, PositionProvider};
}
