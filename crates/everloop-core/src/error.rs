//! Domain error types.

use thiserror::Error;

/// Top-level error type for progression operations.
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// An entity is missing or not owned by the caller.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: &'static str,
        /// The key that failed to resolve.
        key: String,
    },

    /// A discoverable entity was already discovered.
    #[error("{entity} already discovered: {key}")]
    Duplicate {
        /// The kind of entity that was rediscovered.
        entity: &'static str,
        /// The natural key of the existing record.
        key: String,
    },

    /// A domain rule was violated.
    #[error("validation error: {0}")]
    Validation(String),

    /// The narrative generator call failed or returned unusable data.
    #[error("narrative generator error: {0}")]
    ExternalService(String),

    /// A store or transport failure outside domain control.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
