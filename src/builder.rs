//! Engine builder for flexible configuration.

use crate::engine::Engine;
use crate::store::DocumentStore;
use crate::types::Config;

/// Builder for [`Engine`] configuration.
///
/// # Example
///
/// ```rust
/// use geonear::{EngineBuilder, MemoryStore};
///
/// let engine = EngineBuilder::new()
///     .extended_ring_threshold_km(25.0)
///     .build(MemoryStore::new());
/// assert_eq!(engine.config().extended_ring_threshold_km, 25.0);
/// ```
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: Config,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Radius above which extended-mode queries add a second neighbor
    /// ring.
    pub fn extended_ring_threshold_km(mut self, threshold_km: f64) -> Self {
        self.config = self.config.with_extended_ring_threshold_km(threshold_km);
        self
    }

    /// Build the engine over the given document store.
    pub fn build<S: DocumentStore>(self, store: S) -> Engine<S> {
        Engine::with_config(store, self.config)
    }
}
