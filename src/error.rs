//! Error types for geonear.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeonearError>;

/// Errors returned by the proximity engine and its collaborators.
#[derive(Debug, Error)]
pub enum GeonearError {
    /// Input validation failure (coordinates, radius, precision).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geohash encoding or decoding failure.
    #[error("Geohash error: {0}")]
    Geohash(#[from] geohash::GeohashError),

    /// The backing document store failed. Propagated unchanged to the
    /// caller; the engine performs no retries and returns no partial
    /// results.
    #[error("Document store error: {0}")]
    Store(String),

    /// A record addressed by id does not exist in the given collection.
    #[error("Record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    /// A stored entity document could not be interpreted.
    #[error("Malformed entity document '{id}': {reason}")]
    MalformedEntity { id: String, reason: String },
}

impl GeonearError {
    /// Shorthand for a store failure with context.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        GeonearError::Store(msg.into())
    }
}
