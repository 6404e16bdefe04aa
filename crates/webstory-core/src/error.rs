//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No snapshot was stored under the requested key.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// A snapshot belongs to a different asset type than the one restoring it.
    #[error("snapshot type mismatch: expected {expected}, found {found}")]
    SnapshotTypeMismatch {
        /// The asset type of the restoring asset.
        expected: String,
        /// The asset type recorded in the snapshot.
        found: String,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
