use thiserror::Error;
use uuid::Uuid;

use crate::repo::EntityKind;

/// Errors reported by an [`crate::EntityStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has not been opened (or could not be).
    #[error("store is not ready")]
    Unavailable,

    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("entity could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A post or story was saved before its owning user.
    #[error("{kind} {id} references missing user {owner}")]
    MissingOwner {
        kind: EntityKind,
        id: Uuid,
        owner: Uuid,
    },

    /// Failure reported by some other backend.
    #[error("{0}")]
    Backend(String),
}
